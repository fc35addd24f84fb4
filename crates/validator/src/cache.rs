//! Compiled rule cache.
//!
//! Struct rules are compiled once per type and inline rule expressions once
//! per distinct string. Compilation runs outside any lock; when two threads
//! compile the same entry concurrently, the first one stored wins and the
//! other result is dropped, so every caller sees the same compiled rules.

use std::any::{Any, TypeId};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tracing::debug;

use crate::chain::{self, Chain};
use crate::error::ConfigError;
use crate::registry::Registry;
use crate::tag;
use crate::value::Struct;

/// Rules for one struct type.
#[derive(Debug)]
pub(crate) struct CompiledStruct {
    pub(crate) type_name: &'static str,
    /// Fields in declaration order. Skipped fields are left out.
    pub(crate) fields: Vec<CompiledField>,
}

#[derive(Debug)]
pub(crate) struct CompiledField {
    pub(crate) index: usize,
    pub(crate) name: &'static str,
    pub(crate) display: &'static str,
    pub(crate) chain: Chain,
}

/// Snapshot of cache occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    /// Struct types with compiled rules.
    pub structs: usize,
    /// Distinct inline rule expressions compiled.
    pub expressions: usize,
    /// Total rule expressions parsed since the validator was created.
    /// Fields without rules or marked `-` are not parsed.
    pub parses: u64,
}

#[derive(Debug, Default)]
pub(crate) struct RuleCache {
    structs: DashMap<TypeId, Arc<CompiledStruct>>,
    expressions: DashMap<Box<str>, Option<Arc<Chain>>>,
    parses: AtomicU64,
}

impl RuleCache {
    /// Compiled rules for the concrete type of `value`.
    pub(crate) fn struct_rules(
        &self,
        value: &dyn Struct,
        registry: &Registry,
    ) -> Result<Arc<CompiledStruct>, ConfigError> {
        let type_id = (value as &dyn Any).type_id();
        if let Some(hit) = self.structs.get(&type_id) {
            return Ok(Arc::clone(hit.value()));
        }

        let compiled = Arc::new(self.compile_struct(value, registry)?);
        debug!(
            type_name = compiled.type_name,
            fields = compiled.fields.len(),
            "compiled struct rules"
        );
        Ok(Arc::clone(self.structs.entry(type_id).or_insert(compiled).value()))
    }

    /// Compiled chain for an inline rule expression. `None` for `-`.
    pub(crate) fn expression(
        &self,
        expression: &str,
        registry: &Registry,
    ) -> Result<Option<Arc<Chain>>, ConfigError> {
        if let Some(hit) = self.expressions.get(expression) {
            return Ok(hit.value().clone());
        }

        let compiled = self.compile(expression, registry)?.map(Arc::new);
        debug!(expression, "compiled rule expression");
        Ok(self
            .expressions
            .entry(expression.into())
            .or_insert(compiled)
            .value()
            .clone())
    }

    pub(crate) fn stats(&self) -> CacheStats {
        CacheStats {
            structs: self.structs.len(),
            expressions: self.expressions.len(),
            parses: self.parses.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn clear(&self) {
        self.structs.clear();
        self.expressions.clear();
    }

    fn compile(&self, expression: &str, registry: &Registry) -> Result<Option<Chain>, ConfigError> {
        self.parses.fetch_add(1, Ordering::Relaxed);
        chain::compile(expression, registry)
    }

    fn compile_struct(
        &self,
        value: &dyn Struct,
        registry: &Registry,
    ) -> Result<CompiledStruct, ConfigError> {
        let type_name = value.type_name();
        let mut fields = Vec::with_capacity(value.schema().len());

        for (index, schema) in value.schema().iter().enumerate() {
            let chain = match schema.rules {
                None | Some("") => Some(Chain::default()),
                Some(tag::SKIP) => None,
                Some(rules) => self.compile(rules, registry).map_err(|source| ConfigError::Field {
                    type_name,
                    field: schema.name,
                    source: Box::new(source),
                })?,
            };
            if let Some(chain) = chain {
                fields.push(CompiledField {
                    index,
                    name: schema.name,
                    display: schema.display,
                    chain,
                });
            }
        }

        Ok(CompiledStruct { type_name, fields })
    }
}
