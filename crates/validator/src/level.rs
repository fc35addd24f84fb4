//! Contexts handed to predicates and struct-level hooks.

use crate::path::FieldPath;
use crate::registry::RefScope;
use crate::report::{FieldError, snapshot};
use crate::validator::Validator;
use crate::value::{Reflect, Struct, Value};

// ============================================================================
// FIELD LEVEL
// ============================================================================

/// What a predicate sees while checking one value.
pub struct FieldLevel<'v, 'a> {
    pub(crate) validator: &'v Validator,
    pub(crate) value: &'v Value<'a>,
    pub(crate) param: &'v str,
    pub(crate) field: &'v str,
    pub(crate) parent: Option<&'a dyn Reflect>,
    pub(crate) root: Option<&'a dyn Reflect>,
    pub(crate) refs: &'v [FieldPath],
    pub(crate) scope: RefScope,
}

impl<'v, 'a> FieldLevel<'v, 'a> {
    /// The value under test, already unwrapped.
    #[must_use]
    pub const fn value(&self) -> &Value<'a> {
        self.value
    }

    /// The directive parameter, empty when there is none.
    #[must_use]
    pub const fn param(&self) -> &str {
        self.param
    }

    /// Display name of the field, empty for standalone values.
    #[must_use]
    pub const fn field_name(&self) -> &str {
        self.field
    }

    /// The struct declaring the field, or the companion value in
    /// [`Validator::validate_value_with`].
    #[must_use]
    pub fn parent(&self) -> Option<&'a dyn Reflect> {
        self.parent
    }

    /// The value passed to the validation call.
    #[must_use]
    pub fn top(&self) -> Option<&'a dyn Reflect> {
        self.root
    }

    /// The validator running this check.
    #[must_use]
    pub const fn validator(&self) -> &'v Validator {
        self.validator
    }

    /// The first referenced value, for predicates registered with
    /// [`PredicateOptions::field_refs`](crate::PredicateOptions::field_refs).
    ///
    /// `None` when nothing is referenced or the path does not resolve.
    #[must_use]
    pub fn referenced(&self) -> Option<Value<'a>> {
        self.resolve(self.refs.first()?)
    }

    /// All referenced values, in parameter order.
    pub fn references(&self) -> impl Iterator<Item = Option<Value<'a>>> + '_ {
        self.refs.iter().map(|path| self.resolve(path))
    }

    fn resolve(&self, path: &FieldPath) -> Option<Value<'a>> {
        let origin = match self.scope {
            RefScope::Parent => self.parent?,
            RefScope::Root => self.root?,
        };
        path.resolve(self.validator, origin)
    }
}

// ============================================================================
// STRUCT LEVEL
// ============================================================================

/// What a struct-level hook sees.
///
/// Errors reported here join the field errors of the same validation call,
/// with namespaces relative to the struct being checked.
pub struct StructLevel<'v, 'a> {
    pub(crate) validator: &'v Validator,
    pub(crate) current: &'a dyn Struct,
    pub(crate) root: Option<&'a dyn Reflect>,
    pub(crate) namespace: &'v str,
    pub(crate) struct_namespace: &'v str,
    pub(crate) errors: &'v mut Vec<FieldError>,
}

impl<'v, 'a> StructLevel<'v, 'a> {
    /// The struct being checked.
    #[must_use]
    pub fn current(&self) -> &'a dyn Struct {
        self.current
    }

    /// The value passed to the validation call.
    #[must_use]
    pub fn top(&self) -> Option<&'a dyn Reflect> {
        self.root
    }

    /// The validator running this hook.
    #[must_use]
    pub const fn validator(&self) -> &'v Validator {
        self.validator
    }

    /// Display namespace of the struct, empty at the top level.
    #[must_use]
    pub const fn namespace(&self) -> &str {
        self.namespace
    }

    /// Records a failure for `field` of the current struct.
    ///
    /// `field` is the display name and `struct_field` the declared name; the
    /// reported namespaces are both joined onto the struct's own.
    pub fn report_error(
        &mut self,
        value: &dyn Reflect,
        field: &str,
        struct_field: &str,
        tag: &str,
        param: &str,
    ) {
        let extracted = self.validator.extract(value);
        let config = self.validator.config();
        let captured = if config.capture_values {
            snapshot(&extracted, config.value_snapshot_depth)
        } else {
            serde_json::Value::Null
        };

        self.errors.push(FieldError {
            namespace: join(self.namespace, field),
            struct_namespace: join(self.struct_namespace, struct_field),
            field: field.to_owned(),
            struct_field: struct_field.to_owned(),
            tag: tag.to_owned(),
            actual_tag: tag.to_owned(),
            param: param.to_owned(),
            kind: extracted.kind(),
            type_name: value.type_name(),
            value: captured,
        });
    }
}

fn join(namespace: &str, field: &str) -> String {
    if namespace.is_empty() {
        field.to_owned()
    } else if field.is_empty() {
        namespace.to_owned()
    } else {
        format!("{namespace}.{field}")
    }
}
