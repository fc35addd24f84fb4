//! Named predicates, aliases, custom type extractors and struct hooks.
//!
//! The registry is owned by a [`Validator`](crate::Validator) and only
//! mutated through `&mut` registration methods, so lookups during validation
//! need no locking.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::ConfigError;
use crate::level::{FieldLevel, StructLevel};
use crate::tag;
use crate::value::Value;

/// Signature of a field predicate.
pub type PredicateFn = dyn Fn(&FieldLevel<'_, '_>) -> bool + Send + Sync;

/// Where a predicate's field references are resolved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefScope {
    /// The struct that declares the field (`eqfield`, `required_with`).
    Parent,
    /// The value passed to the validation call (`eqcsfield`).
    Root,
}

/// How the engine calls a predicate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PredicateOptions {
    /// Also call the predicate when the value is nil.
    pub call_when_nil: bool,
    /// Reject the directive at compile time when it has no parameter.
    pub requires_param: bool,
    /// The parameter is a space-separated list of field paths, resolved from
    /// this scope. An empty parameter refers to the scope origin itself.
    pub field_refs: Option<RefScope>,
}

impl PredicateOptions {
    /// Default options: skipped on nil, parameter optional, no references.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            call_when_nil: false,
            requires_param: false,
            field_refs: None,
        }
    }

    /// Call the predicate for nil values too.
    #[must_use]
    pub const fn call_when_nil(self) -> Self {
        Self {
            call_when_nil: true,
            ..self
        }
    }

    /// Require a parameter.
    #[must_use]
    pub const fn requires_param(self) -> Self {
        Self {
            requires_param: true,
            ..self
        }
    }

    /// Treat the parameter as field references.
    #[must_use]
    pub const fn field_refs(self, scope: RefScope) -> Self {
        Self {
            field_refs: Some(scope),
            ..self
        }
    }
}

/// A registered predicate.
pub(crate) struct Predicate {
    pub(crate) name: Arc<str>,
    pub(crate) func: Arc<PredicateFn>,
    pub(crate) options: PredicateOptions,
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate")
            .field("name", &self.name)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// TYPE-ERASED CALLBACKS
// ============================================================================

/// Maps a value of one concrete type to the value the engine validates.
pub(crate) trait CustomType: Send + Sync {
    fn extract<'a>(&self, value: &'a dyn Any) -> Value<'a>;
}

pub(crate) struct TypedCustomType<T, F> {
    func: F,
    _marker: PhantomData<fn(&T)>,
}

impl<T, F> TypedCustomType<T, F>
where
    F: for<'a> Fn(&'a T) -> Value<'a>,
{
    pub(crate) const fn new(func: F) -> Self {
        Self {
            func,
            _marker: PhantomData,
        }
    }
}

impl<T, F> CustomType for TypedCustomType<T, F>
where
    T: Any,
    F: for<'a> Fn(&'a T) -> Value<'a> + Send + Sync,
{
    fn extract<'a>(&self, value: &'a dyn Any) -> Value<'a> {
        value.downcast_ref::<T>().map_or(Value::Nil, |value| (self.func)(value))
    }
}

/// Whole-struct check for one concrete type.
pub(crate) trait StructHook: Send + Sync {
    fn run(&self, level: &mut StructLevel<'_, '_>, value: &dyn Any);
}

pub(crate) struct TypedStructHook<T, F> {
    func: F,
    _marker: PhantomData<fn(&T)>,
}

impl<T, F> TypedStructHook<T, F>
where
    F: Fn(&mut StructLevel<'_, '_>, &T),
{
    pub(crate) const fn new(func: F) -> Self {
        Self {
            func,
            _marker: PhantomData,
        }
    }
}

impl<T, F> StructHook for TypedStructHook<T, F>
where
    T: Any,
    F: Fn(&mut StructLevel<'_, '_>, &T) + Send + Sync,
{
    fn run(&self, level: &mut StructLevel<'_, '_>, value: &dyn Any) {
        if let Some(value) = value.downcast_ref::<T>() {
            (self.func)(level, value);
        }
    }
}

// ============================================================================
// REGISTRY
// ============================================================================

#[derive(Default)]
pub(crate) struct Registry {
    predicates: HashMap<String, Arc<Predicate>>,
    aliases: HashMap<String, Arc<str>>,
    custom_types: HashMap<TypeId, Arc<dyn CustomType>>,
    struct_hooks: HashMap<TypeId, Arc<dyn StructHook>>,
}

impl Registry {
    /// Registers a predicate. If one with the same name exists, it is replaced.
    pub(crate) fn insert_predicate(
        &mut self,
        name: &str,
        options: PredicateOptions,
        func: Arc<PredicateFn>,
    ) {
        let predicate = Predicate {
            name: name.into(),
            func,
            options,
        };
        self.predicates.insert(name.to_owned(), Arc::new(predicate));
    }

    pub(crate) fn predicate(&self, name: &str) -> Option<&Arc<Predicate>> {
        self.predicates.get(name)
    }

    pub(crate) fn insert_alias(&mut self, alias: &str, expression: &str) {
        self.aliases.insert(alias.to_owned(), expression.into());
    }

    pub(crate) fn alias(&self, name: &str) -> Option<&str> {
        self.aliases.get(name).map(AsRef::as_ref)
    }

    pub(crate) fn insert_custom_type(&mut self, type_id: TypeId, extractor: Arc<dyn CustomType>) {
        self.custom_types.insert(type_id, extractor);
    }

    pub(crate) fn custom_type(&self, type_id: TypeId) -> Option<&dyn CustomType> {
        self.custom_types.get(&type_id).map(AsRef::as_ref)
    }

    pub(crate) fn has_custom_types(&self) -> bool {
        !self.custom_types.is_empty()
    }

    pub(crate) fn insert_struct_hook(&mut self, type_id: TypeId, hook: Arc<dyn StructHook>) {
        self.struct_hooks.insert(type_id, hook);
    }

    pub(crate) fn struct_hook(&self, type_id: TypeId) -> Option<&dyn StructHook> {
        self.struct_hooks.get(&type_id).map(AsRef::as_ref)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("predicates", &self.predicates.len())
            .field("aliases", &self.aliases.len())
            .field("custom_types", &self.custom_types.len())
            .field("struct_hooks", &self.struct_hooks.len())
            .finish()
    }
}

/// Checks that `name` can be used as a predicate or alias name.
pub(crate) fn check_name(name: &str) -> Result<(), ConfigError> {
    let reason = if name.is_empty() {
        "name is empty"
    } else if tag::is_control(name) {
        "name is reserved for a control directive"
    } else if name.contains([',', '|', '=']) || name.chars().any(char::is_whitespace) {
        "name contains a separator character"
    } else {
        return Ok(());
    };
    Err(ConfigError::InvalidName {
        name: name.to_owned(),
        reason,
    })
}

/// Checks that an alias body parses and contains no structural directives.
pub(crate) fn check_alias(alias: &str, expression: &str) -> Result<(), ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidAlias {
        alias: alias.to_owned(),
        reason,
    };

    let directives = tag::parse(expression).map_err(|e| invalid(e.to_string()))?;
    if directives.is_empty() {
        return Err(invalid("alias expands to nothing".to_owned()));
    }
    if let Some(control) = directives
        .iter()
        .find(|d| matches!(d.name.as_str(), tag::SKIP | tag::DIVE | tag::KEYS | tag::ENDKEYS))
    {
        return Err(invalid(format!("`{}` is not allowed in an alias", control.name)));
    }
    if directives.iter().any(|d| d.name == alias) {
        return Err(invalid("alias refers to itself".to_owned()));
    }
    Ok(())
}
