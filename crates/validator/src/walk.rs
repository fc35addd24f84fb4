//! Traversal of reflected values.
//!
//! The walker visits struct fields in declaration order, runs each field's
//! chain, descends into nested structs and collection elements, and collects
//! a [`FieldError`] for every failed check. Namespaces are built in two
//! reusable buffers that grow on descent and are truncated on return.

use std::any::{Any, TypeId};

use tracing::{trace, warn};

use crate::chain::{Chain, Check, Dive, Step};
use crate::error::ConfigError;
use crate::level::{FieldLevel, StructLevel};
use crate::registry::RefScope;
use crate::report::{FieldError, ValidationErrors, snapshot};
use crate::tag;
use crate::validator::Validator;
use crate::value::{Reflect, Struct, Value, render_key};

/// Which fields a struct walk visits, by declared-name namespace.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Mode<'m> {
    All,
    /// Only these fields, their ancestors and their descendants.
    Include(&'m [&'m str]),
    /// Everything except these fields and their descendants.
    Exclude(&'m [&'m str]),
}

impl Mode<'_> {
    fn selects(&self, path: &str) -> bool {
        match self {
            Self::All => true,
            Self::Include(paths) => paths
                .iter()
                .any(|p| path == *p || is_within(path, p) || is_within(p, path)),
            Self::Exclude(paths) => !paths.iter().any(|p| path == *p || is_within(path, p)),
        }
    }
}

/// `inner` lies strictly below `outer`.
fn is_within(inner: &str, outer: &str) -> bool {
    inner.len() > outer.len()
        && inner.starts_with(outer)
        && matches!(inner.as_bytes()[outer.len()], b'.' | b'[')
}

/// Names of the value currently being checked.
#[derive(Clone, Copy)]
struct Names<'n> {
    field: &'n str,
    struct_field: &'n str,
}

pub(crate) struct Walker<'v, 'a> {
    validator: &'v Validator,
    mode: Mode<'v>,
    root: Option<&'a dyn Reflect>,
    errors: Vec<FieldError>,
    ns: String,
    struct_ns: String,
    /// Structs on the current descent path, by type and address.
    active: Vec<(TypeId, usize)>,
}

impl<'v, 'a> Walker<'v, 'a> {
    pub(crate) fn new(validator: &'v Validator, mode: Mode<'v>, root: Option<&'a dyn Reflect>) -> Self {
        Self {
            validator,
            mode,
            root,
            errors: Vec::new(),
            ns: String::new(),
            struct_ns: String::new(),
            active: Vec::new(),
        }
    }

    pub(crate) fn run_struct(mut self, value: &'a dyn Struct) -> Result<ValidationErrors, ConfigError> {
        self.walk_struct(value, false, false, 0)?;
        Ok(self.errors.into())
    }

    pub(crate) fn run_value(
        mut self,
        value: &'a dyn Reflect,
        chain: &Chain,
        parent: Option<&'a dyn Reflect>,
    ) -> Result<ValidationErrors, ConfigError> {
        let names = Names {
            field: "",
            struct_field: "",
        };
        self.walk_field(value, chain, names, parent, 0)?;
        Ok(self.errors.into())
    }

    fn walk_struct(
        &mut self,
        value: &'a dyn Struct,
        struct_only: bool,
        no_struct_level: bool,
        depth: usize,
    ) -> Result<(), ConfigError> {
        let type_id = (value as &dyn Any).type_id();
        let identity = (type_id, std::ptr::from_ref(value).cast::<()>().addr());

        if self.active.contains(&identity) {
            trace!(
                type_name = value.type_name(),
                namespace = %self.ns,
                "struct already on the descent path, not revisiting"
            );
            return Ok(());
        }
        if depth >= self.validator.config().max_depth {
            warn!(
                type_name = value.type_name(),
                namespace = %self.ns,
                max_depth = self.validator.config().max_depth,
                "maximum struct depth reached, not descending"
            );
            return Ok(());
        }

        let compiled = self.validator.struct_rules(value)?;
        self.active.push(identity);

        if !struct_only {
            for field in &compiled.fields {
                let mark = self.mark();
                push_segment(&mut self.ns, field.display);
                push_segment(&mut self.struct_ns, field.name);

                if self.mode.selects(&self.struct_ns) {
                    if let Some(raw) = value.field(field.index) {
                        let names = Names {
                            field: field.display,
                            struct_field: field.name,
                        };
                        self.walk_field(raw, &field.chain, names, Some(value), depth)?;
                    }
                }
                self.reset(mark);
            }
        }

        if !no_struct_level {
            if let Some(hook) = self.validator.registry().struct_hook(type_id) {
                let mut level = StructLevel {
                    validator: self.validator,
                    current: value,
                    root: self.root,
                    namespace: &self.ns,
                    struct_namespace: &self.struct_ns,
                    errors: &mut self.errors,
                };
                hook.run(&mut level, value);
            }
        }

        self.active.pop();
        Ok(())
    }

    fn walk_field(
        &mut self,
        raw: &'a dyn Reflect,
        chain: &Chain,
        names: Names<'_>,
        parent: Option<&'a dyn Reflect>,
        depth: usize,
    ) -> Result<(), ConfigError> {
        let value = self.validator.extract(raw);

        if value.is_nil() {
            if chain.required {
                self.fail(raw, &value, names, tag::REQUIRED, tag::REQUIRED, "");
                return Ok(());
            }
            if chain.omit_empty {
                return Ok(());
            }
            if !chain.has_nil_aware_step() {
                if let Some(step) = chain.steps.first() {
                    self.fail(raw, &value, names, step.tag(), step.actual_tag(), step.param());
                }
                return Ok(());
            }
        } else {
            if chain.required && !value.has_value() {
                self.fail(raw, &value, names, tag::REQUIRED, tag::REQUIRED, "");
                return Ok(());
            }
            if chain.omit_empty && value.is_zero() {
                return Ok(());
            }
        }

        let fail_fast = self.validator.config().first_error_per_field;
        for step in &chain.steps {
            if value.is_nil() && !step.is_nil_aware() {
                continue;
            }
            if !self.run_step(step, &value, names.field, parent) {
                self.fail(raw, &value, names, step.tag(), step.actual_tag(), step.param());
                if fail_fast {
                    return Ok(());
                }
            }
        }

        if value.is_nil() {
            return Ok(());
        }
        if let Some(dive) = &chain.dive {
            return self.dive(raw, value, dive, names, parent, depth);
        }
        if let Value::Struct(nested) = value {
            self.walk_struct(nested, chain.struct_only, chain.no_struct_level, depth + 1)?;
        }
        Ok(())
    }

    fn dive(
        &mut self,
        raw: &'a dyn Reflect,
        value: Value<'a>,
        dive: &Dive,
        names: Names<'_>,
        parent: Option<&'a dyn Reflect>,
        depth: usize,
    ) -> Result<(), ConfigError> {
        match value {
            Value::Seq(_) if dive.keys.is_some() => {
                self.fail(raw, &value, names, tag::KEYS, tag::KEYS, "");
            }
            Value::Seq(seq) => {
                for (index, element) in seq.iter().enumerate() {
                    let suffix = format!("[{index}]");
                    self.walk_element(element, None, &suffix, dive, names, parent, depth)?;
                }
            }
            Value::Map(map) => {
                for (key, element) in map.entries() {
                    let suffix = format!("[{}]", render_key(&self.validator.extract(key)));
                    self.walk_element(element, Some(key), &suffix, dive, names, parent, depth)?;
                }
            }
            other => self.fail(raw, &other, names, tag::DIVE, tag::DIVE, ""),
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn walk_element(
        &mut self,
        element: &'a dyn Reflect,
        key: Option<&'a dyn Reflect>,
        suffix: &str,
        dive: &Dive,
        names: Names<'_>,
        parent: Option<&'a dyn Reflect>,
        depth: usize,
    ) -> Result<(), ConfigError> {
        let mark = self.mark();
        self.ns.push_str(suffix);
        self.struct_ns.push_str(suffix);

        let field = format!("{}{suffix}", names.field);
        let struct_field = format!("{}{suffix}", names.struct_field);
        let names = Names {
            field: &field,
            struct_field: &struct_field,
        };

        if let (Some(key), Some(keys)) = (key, &dive.keys) {
            self.walk_field(key, keys, names, parent, depth)?;
        }
        self.walk_field(element, &dive.elements, names, parent, depth)?;

        self.reset(mark);
        Ok(())
    }

    fn run_step(&self, step: &Step, value: &Value<'a>, field: &str, parent: Option<&'a dyn Reflect>) -> bool {
        match step {
            Step::Check(check) => self.run_check(check, value, field, parent),
            Step::Any { checks, .. } => checks
                .iter()
                .any(|check| self.run_check(check, value, field, parent)),
        }
    }

    fn run_check(&self, check: &Check, value: &Value<'a>, field: &str, parent: Option<&'a dyn Reflect>) -> bool {
        let level = FieldLevel {
            validator: self.validator,
            value,
            param: &check.param,
            field,
            parent,
            root: self.root,
            refs: &check.refs,
            scope: check.predicate.options.field_refs.unwrap_or(RefScope::Parent),
        };
        (check.predicate.func)(&level)
    }

    fn fail(
        &mut self,
        raw: &dyn Reflect,
        value: &Value<'_>,
        names: Names<'_>,
        tag: &str,
        actual_tag: &str,
        param: &str,
    ) {
        let config = self.validator.config();
        let captured = if config.capture_values {
            snapshot(value, config.value_snapshot_depth)
        } else {
            serde_json::Value::Null
        };

        self.errors.push(FieldError {
            namespace: self.ns.clone(),
            struct_namespace: self.struct_ns.clone(),
            field: names.field.to_owned(),
            struct_field: names.struct_field.to_owned(),
            tag: tag.to_owned(),
            actual_tag: actual_tag.to_owned(),
            param: param.to_owned(),
            kind: value.kind(),
            type_name: raw.type_name(),
            value: captured,
        });
    }

    const fn mark(&self) -> (usize, usize) {
        (self.ns.len(), self.struct_ns.len())
    }

    fn reset(&mut self, (ns, struct_ns): (usize, usize)) {
        self.ns.truncate(ns);
        self.struct_ns.truncate(struct_ns);
    }
}

fn push_segment(buffer: &mut String, name: &str) {
    if !buffer.is_empty() {
        buffer.push('.');
    }
    buffer.push_str(name);
}
