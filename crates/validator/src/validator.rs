//! The validator: registrations, cache and entry points.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::builtins;
use crate::cache::{CacheStats, CompiledStruct, RuleCache};
use crate::config::ValidatorConfig;
use crate::error::ConfigError;
use crate::level::{FieldLevel, StructLevel};
use crate::registry::{self, PredicateOptions, Registry, TypedCustomType, TypedStructHook};
use crate::report::ValidationErrors;
use crate::value::{Reflect, Struct, Value};
use crate::walk::{Mode, Walker};

/// Upper bound on wrapper levels followed for one value.
pub(crate) const MAX_INDIRECTION: usize = 64;

/// Validates values against declarative rule expressions.
///
/// Build one validator, register custom predicates, aliases, extractors and
/// hooks through `&mut self`, then share it: validation only needs `&self`
/// and the validator is `Send + Sync`. Compiled rules are cached per struct
/// type and per inline expression.
///
/// # Examples
///
/// ```
/// use tagval::Validator;
///
/// #[derive(tagval::Validate)]
/// struct Signup {
///     #[validate("required,email")]
///     email: String,
///     #[validate("gte=13,lte=130")]
///     age: u8,
/// }
///
/// let validator = Validator::new();
/// let errors = validator
///     .validate_struct(&Signup { email: "nope".into(), age: 9 })
///     .unwrap();
///
/// assert_eq!(errors.len(), 2);
/// assert_eq!(errors.errors()[0].tag, "email");
/// assert_eq!(errors.errors()[1].namespace, "age");
/// ```
pub struct Validator {
    registry: Registry,
    cache: RuleCache,
    config: ValidatorConfig,
}

impl Validator {
    /// Creates a validator with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ValidatorConfig::default())
    }

    /// Creates a validator with `config`.
    #[must_use]
    pub fn with_config(config: ValidatorConfig) -> Self {
        let mut registry = Registry::default();
        if config.include_builtins {
            builtins::install(&mut registry);
        }
        Self {
            registry,
            cache: RuleCache::default(),
            config,
        }
    }

    /// The configuration this validator was built with.
    #[must_use]
    pub const fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    // ========================================================================
    // REGISTRATION
    // ========================================================================

    /// Registers a predicate under `name`, replacing any existing one.
    ///
    /// The predicate is skipped for nil values and takes an optional
    /// parameter; see [`register_validation_with`](Self::register_validation_with)
    /// for other behaviour.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidName`] for empty or reserved names and
    /// names containing separator characters.
    pub fn register_validation<F>(&mut self, name: &str, func: F) -> Result<(), ConfigError>
    where
        F: Fn(&FieldLevel<'_, '_>) -> bool + Send + Sync + 'static,
    {
        self.register_validation_with(name, func, PredicateOptions::new())
    }

    /// Registers a predicate with explicit [`PredicateOptions`].
    ///
    /// # Errors
    ///
    /// Same as [`register_validation`](Self::register_validation).
    pub fn register_validation_with<F>(
        &mut self,
        name: &str,
        func: F,
        options: PredicateOptions,
    ) -> Result<(), ConfigError>
    where
        F: Fn(&FieldLevel<'_, '_>) -> bool + Send + Sync + 'static,
    {
        registry::check_name(name)?;
        self.registry.insert_predicate(name, options, Arc::new(func));
        self.cache.clear();
        debug!(name, ?options, "registered validation");
        Ok(())
    }

    /// Registers `alias` as shorthand for `expression`.
    ///
    /// Errors in expanded directives report the alias as their `tag` and the
    /// underlying directive as `actual_tag`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidName`] for a bad alias name and
    /// [`ConfigError::InvalidAlias`] when `expression` does not parse or
    /// contains `-`, `dive`, `keys` or `endkeys`.
    pub fn register_alias(&mut self, alias: &str, expression: &str) -> Result<(), ConfigError> {
        registry::check_name(alias)?;
        registry::check_alias(alias, expression)?;
        self.registry.insert_alias(alias, expression);
        self.cache.clear();
        debug!(alias, expression, "registered alias");
        Ok(())
    }

    /// Registers an extractor for values of type `T`.
    ///
    /// Whenever the engine meets a `T` (directly or behind a wrapper) it
    /// validates what `func` returns instead. Returning [`Value::Nil`] makes
    /// the value count as absent.
    pub fn register_custom_type_func<T, F>(&mut self, func: F)
    where
        T: Any,
        F: for<'a> Fn(&'a T) -> Value<'a> + Send + Sync + 'static,
    {
        self.registry
            .insert_custom_type(TypeId::of::<T>(), Arc::new(TypedCustomType::new(func)));
        self.cache.clear();
        debug!(type_name = std::any::type_name::<T>(), "registered custom type");
    }

    /// Registers a whole-struct check for `T`.
    ///
    /// The hook runs after the struct's fields have been checked, wherever a
    /// `T` is visited, and reports failures through
    /// [`StructLevel::report_error`].
    pub fn register_struct_validation<T, F>(&mut self, func: F)
    where
        T: Struct,
        F: Fn(&mut StructLevel<'_, '_>, &T) + Send + Sync + 'static,
    {
        self.registry
            .insert_struct_hook(TypeId::of::<T>(), Arc::new(TypedStructHook::new(func)));
        self.cache.clear();
        debug!(type_name = std::any::type_name::<T>(), "registered struct validation");
    }

    // ========================================================================
    // VALIDATION
    // ========================================================================

    /// Validates every field of a struct, recursively.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when `value` is not a struct (or is nil) or
    /// when any visited type has broken rules. Validation failures are not
    /// errors; they are in the returned [`ValidationErrors`].
    pub fn validate_struct<T: Reflect>(&self, value: &T) -> Result<ValidationErrors, ConfigError> {
        self.run_struct(value, Mode::All)
    }

    /// Validates only the named fields, given as declared-name namespaces
    /// such as `inner.start`.
    ///
    /// Ancestors of a named field are traversed (their own rules run too) and
    /// everything below a named field is validated.
    ///
    /// # Errors
    ///
    /// Same as [`validate_struct`](Self::validate_struct).
    pub fn validate_struct_partial<T, P>(&self, value: &T, fields: &[P]) -> Result<ValidationErrors, ConfigError>
    where
        T: Reflect,
        P: AsRef<str>,
    {
        let fields: Vec<&str> = fields.iter().map(AsRef::as_ref).collect();
        self.run_struct(value, Mode::Include(&fields))
    }

    /// Validates everything except the named fields and their descendants.
    ///
    /// # Errors
    ///
    /// Same as [`validate_struct`](Self::validate_struct).
    pub fn validate_struct_except<T, P>(&self, value: &T, fields: &[P]) -> Result<ValidationErrors, ConfigError>
    where
        T: Reflect,
        P: AsRef<str>,
    {
        let fields: Vec<&str> = fields.iter().map(AsRef::as_ref).collect();
        self.run_struct(value, Mode::Exclude(&fields))
    }

    /// Validates a standalone value against `rules`.
    ///
    /// Reported errors have empty namespaces and field names.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when `rules` does not compile.
    pub fn validate_value<T: Reflect>(&self, value: &T, rules: &str) -> Result<ValidationErrors, ConfigError> {
        self.run_value(value, None, rules)
    }

    /// Validates `value` against `rules`, with `other` as the comparison
    /// target of cross-field directives (`eqfield`, `gtfield`, ...) written
    /// without a parameter.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when `rules` does not compile.
    pub fn validate_value_with<T, U>(
        &self,
        value: &T,
        other: &U,
        rules: &str,
    ) -> Result<ValidationErrors, ConfigError>
    where
        T: Reflect,
        U: Reflect,
    {
        self.run_value(value, Some(other), rules)
    }

    // ========================================================================
    // INTROSPECTION
    // ========================================================================

    /// Unwraps `value` the way the engine does: custom type extractors first,
    /// then wrappers, until a non-indirect value remains.
    #[must_use]
    pub fn extract<'a>(&self, value: &'a dyn Reflect) -> Value<'a> {
        let mut current = value;
        for _ in 0..MAX_INDIRECTION {
            let extracted = if self.registry.has_custom_types() {
                match self.registry.custom_type((current as &dyn Any).type_id()) {
                    Some(custom) => custom.extract(current),
                    None => current.reflect(),
                }
            } else {
                current.reflect()
            };
            match extracted {
                Value::Indirect(inner) => current = inner,
                other => return other,
            }
        }
        Value::Opaque
    }

    /// Current cache occupancy.
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Drops every compiled rule. They are recompiled on next use.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub(crate) const fn registry(&self) -> &Registry {
        &self.registry
    }

    pub(crate) fn struct_rules(&self, value: &dyn Struct) -> Result<Arc<CompiledStruct>, ConfigError> {
        self.cache.struct_rules(value, &self.registry)
    }

    fn run_struct(&self, value: &dyn Reflect, mode: Mode<'_>) -> Result<ValidationErrors, ConfigError> {
        match self.extract(value) {
            Value::Struct(record) => Walker::new(self, mode, Some(value)).run_struct(record),
            _ => Err(ConfigError::NotAStruct {
                type_name: value.type_name(),
            }),
        }
    }

    fn run_value(
        &self,
        value: &dyn Reflect,
        other: Option<&dyn Reflect>,
        rules: &str,
    ) -> Result<ValidationErrors, ConfigError> {
        match self.cache.expression(rules, &self.registry)? {
            Some(chain) => Walker::new(self, Mode::All, Some(value)).run_value(value, &chain, other),
            None => Ok(ValidationErrors::new()),
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("registry", &self.registry)
            .field("cache", &self.cache.stats())
            .field("config", &self.config)
            .finish()
    }
}
