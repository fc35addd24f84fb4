//! Validation failure reports.
//!
//! Every failed check produces one [`FieldError`]; a validation call returns
//! them all, in traversal order, as [`ValidationErrors`].

use std::fmt;

use serde::Serialize;
use serde_json::Value as Json;

use crate::value::{Kind, Value, plain, render_key};

// ============================================================================
// FIELD ERROR
// ============================================================================

/// One failed check on one field.
///
/// `namespace` and `field` use display names (see `rename`), while
/// `struct_namespace` and `struct_field` use declared names. For standalone
/// value validation all four are empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    /// Dotted display path, e.g. `user.addresses[0].city`.
    pub namespace: String,

    /// Dotted declared-name path.
    pub struct_namespace: String,

    /// Display name of the failing field.
    pub field: String,

    /// Declared name of the failing field.
    pub struct_field: String,

    /// The directive as written in the rules (alias name when an alias was
    /// used, or the full `a|b` label for an alternative group).
    pub tag: String,

    /// The directive that actually ran.
    pub actual_tag: String,

    /// The directive parameter, empty when there is none.
    pub param: String,

    /// Kind of the value after unwrapping.
    pub kind: Kind,

    /// Rust type of the value as declared.
    pub type_name: &'static str,

    /// Snapshot of the failing value. `null` when capture is disabled.
    pub value: Json,
}

impl FieldError {
    /// Returns `true` if this error was produced by `tag`.
    #[must_use]
    pub fn is(&self, tag: &str) -> bool {
        self.tag == tag
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Key: '{}' Error: field validation for '{}' failed on the '{}' tag",
            self.namespace, self.field, self.tag
        )
    }
}

// ============================================================================
// VALIDATION ERRORS
// ============================================================================

/// All failures of one validation call, in traversal order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    /// Creates an empty collection.
    #[must_use]
    pub const fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Returns true if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns the number of errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns true if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns all errors.
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Iterates over the errors.
    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.errors.iter()
    }

    /// First error reported for `namespace`.
    #[must_use]
    pub fn get(&self, namespace: &str) -> Option<&FieldError> {
        self.errors.iter().find(|error| error.namespace == namespace)
    }

    /// Converts to a Result.
    #[must_use = "result must be used"]
    pub fn into_result<T>(self, ok_value: T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(ok_value)
        } else {
            Err(self)
        }
    }

    pub(crate) fn push(&mut self, error: FieldError) {
        self.errors.push(error);
    }
}

impl From<Vec<FieldError>> for ValidationErrors {
    fn from(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }
}

impl FromIterator<FieldError> for ValidationErrors {
    fn from_iter<I: IntoIterator<Item = FieldError>>(iter: I) -> Self {
        Self {
            errors: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for ValidationErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a FieldError;
    type IntoIter = std::slice::Iter<'a, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

// ============================================================================
// SNAPSHOT
// ============================================================================

/// Converts a value to JSON for error reports, descending at most `depth`
/// container levels.
pub(crate) fn snapshot(value: &Value<'_>, depth: usize) -> Json {
    match value {
        Value::Nil | Value::Opaque => Json::Null,
        Value::Bool(value) => Json::Bool(*value),
        Value::Int(value) => Json::from(*value),
        Value::Uint(value) => Json::from(*value),
        Value::Float(value) => serde_json::Number::from_f64(*value).map_or(Json::Null, Json::Number),
        Value::Str(value) => Json::String(value.to_string()),
        Value::Time(value) => Json::String(value.to_rfc3339()),
        Value::Indirect(inner) => snapshot(&plain(*inner), depth),
        _ if depth == 0 => Json::Null,
        Value::Seq(seq) => Json::Array(
            seq.iter()
                .map(|item| snapshot(&plain(item), depth - 1))
                .collect(),
        ),
        Value::Map(map) => Json::Object(
            map.entries()
                .map(|(key, item)| (render_key(&plain(key)), snapshot(&plain(item), depth - 1)))
                .collect(),
        ),
        Value::Struct(record) => Json::Object(
            record
                .schema()
                .iter()
                .enumerate()
                .filter_map(|(index, field)| {
                    record
                        .field(index)
                        .map(|item| (field.display.to_owned(), snapshot(&plain(item), depth - 1)))
                })
                .collect(),
        ),
    }
}

// ============================================================================
// TESTS
// ============================================================================
