//! Reflection model the engine walks over.
//!
//! Validation rules are attached to field *declarations*, but the engine only
//! ever sees values through the [`Reflect`] trait. Every value can describe
//! itself as a [`Value`], a borrowed view that tells the engine which
//! [`Kind`] it is dealing with and how to reach nested data.
//!
//! Structs opt in through `#[derive(Validate)]`, which implements both
//! [`Reflect`] and [`Struct`]. Types that the engine should treat as leaves
//! can use [`reflect_opaque!`](crate::reflect_opaque) and, if needed, a custom
//! type extractor registered on the validator.

use std::any::Any;
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;
use std::rc::Rc;
use std::sync::{Arc, OnceLock};
use std::time::SystemTime;

use chrono::{DateTime, FixedOffset, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// ============================================================================
// TRAITS
// ============================================================================

/// A value the engine can inspect.
pub trait Reflect: Any {
    /// Describes this value.
    ///
    /// Wrappers (boxes, shared pointers, options) return
    /// [`Value::Indirect`] so the engine can look through them one level at a
    /// time and give custom type extractors a chance at every level.
    fn reflect(&self) -> Value<'_>;

    /// Name of the concrete type, used in error reports.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Static description of one declared struct field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldSchema {
    /// Declared field name.
    pub name: &'static str,
    /// Name used in reported namespaces. Equals `name` unless renamed.
    pub display: &'static str,
    /// Rule expression attached to the field, if any.
    pub rules: Option<&'static str>,
}

impl FieldSchema {
    /// Creates a field without rules.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            display: name,
            rules: None,
        }
    }

    /// Sets the display name.
    #[must_use]
    pub const fn display(self, display: &'static str) -> Self {
        Self { display, ..self }
    }

    /// Sets the rule expression.
    #[must_use]
    pub const fn rules(self, rules: &'static str) -> Self {
        Self {
            rules: Some(rules),
            ..self
        }
    }
}

/// A record with declared, individually addressable fields.
pub trait Struct: Reflect {
    /// Field declarations, in declaration order.
    fn schema(&self) -> &'static [FieldSchema];

    /// Field value at `index` in [`schema`](Self::schema).
    fn field(&self, index: usize) -> Option<&dyn Reflect>;

    /// Field value by declared name.
    fn field_by_name(&self, name: &str) -> Option<&dyn Reflect> {
        let index = self.schema().iter().position(|field| field.name == name)?;
        self.field(index)
    }
}

/// An ordered collection.
pub trait Sequence {
    /// Number of elements.
    fn len(&self) -> usize;

    /// Returns `true` when there are no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Elements in order.
    fn iter(&self) -> Box<dyn Iterator<Item = &dyn Reflect> + '_>;
}

/// A keyed collection.
pub trait Mapping {
    /// Number of entries.
    fn len(&self) -> usize;

    /// Returns `true` when there are no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Key/value pairs in the map's own iteration order.
    fn entries(&self) -> Box<dyn Iterator<Item = (&dyn Reflect, &dyn Reflect)> + '_>;
}

// ============================================================================
// KIND
// ============================================================================

/// Coarse classification of a value, reported with every field error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum Kind {
    /// Absent value (`None`, JSON `null`).
    Invalid,
    Bool,
    Int,
    Uint,
    Float,
    String,
    Time,
    Slice,
    Map,
    Struct,
    /// A value the engine cannot look into.
    Opaque,
}

impl Kind {
    /// Lowercase name of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Invalid => "invalid",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Uint => "uint",
            Self::Float => "float",
            Self::String => "string",
            Self::Time => "time",
            Self::Slice => "slice",
            Self::Map => "map",
            Self::Struct => "struct",
            Self::Opaque => "opaque",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// VALUE
// ============================================================================

/// Borrowed view of a reflected value.
#[derive(Clone)]
pub enum Value<'a> {
    /// Absent value.
    Nil,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Str(Cow<'a, str>),
    Time(DateTime<Utc>),
    Seq(&'a dyn Sequence),
    Map(&'a dyn Mapping),
    Struct(&'a dyn Struct),
    /// One level of indirection: look at the inner value instead.
    Indirect(&'a dyn Reflect),
    /// A leaf the engine cannot look into.
    Opaque,
}

impl<'a> Value<'a> {
    /// Borrowed string value.
    #[must_use]
    pub const fn str(value: &'a str) -> Self {
        Self::Str(Cow::Borrowed(value))
    }

    /// Kind of this value. [`Value::Indirect`] reports [`Kind::Opaque`]
    /// because the engine always unwraps it before classifying.
    #[must_use]
    pub const fn kind(&self) -> Kind {
        match self {
            Self::Nil => Kind::Invalid,
            Self::Bool(_) => Kind::Bool,
            Self::Int(_) => Kind::Int,
            Self::Uint(_) => Kind::Uint,
            Self::Float(_) => Kind::Float,
            Self::Str(_) => Kind::String,
            Self::Time(_) => Kind::Time,
            Self::Seq(_) => Kind::Slice,
            Self::Map(_) => Kind::Map,
            Self::Struct(_) => Kind::Struct,
            Self::Indirect(_) | Self::Opaque => Kind::Opaque,
        }
    }

    /// Returns `true` for [`Value::Nil`].
    #[must_use]
    pub const fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    /// Returns `true` when this is the zero value of its kind.
    ///
    /// Structs and opaque values are never zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        match self {
            Self::Nil => true,
            Self::Bool(value) => !value,
            Self::Int(value) => *value == 0,
            Self::Uint(value) => *value == 0,
            Self::Float(value) => *value == 0.0,
            Self::Str(value) => value.is_empty(),
            Self::Time(value) => *value == DateTime::<Utc>::default(),
            Self::Seq(value) => value.is_empty(),
            Self::Map(value) => value.is_empty(),
            Self::Struct(_) | Self::Indirect(_) | Self::Opaque => false,
        }
    }

    /// Opposite of [`is_zero`](Self::is_zero).
    #[must_use]
    pub fn has_value(&self) -> bool {
        !self.is_zero()
    }

    /// String contents, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(value) => Some(value),
            _ => None,
        }
    }

    /// Numeric value widened to `f64`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(value) => Some(*value as f64),
            Self::Uint(value) => Some(*value as f64),
            Self::Float(value) => Some(*value),
            _ => None,
        }
    }

    /// Length of strings (in characters) and collections.
    #[must_use]
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::Str(value) => Some(value.chars().count()),
            Self::Seq(value) => Some(value.len()),
            Self::Map(value) => Some(value.len()),
            _ => None,
        }
    }
}

impl fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => f.write_str("Nil"),
            Self::Bool(value) => f.debug_tuple("Bool").field(value).finish(),
            Self::Int(value) => f.debug_tuple("Int").field(value).finish(),
            Self::Uint(value) => f.debug_tuple("Uint").field(value).finish(),
            Self::Float(value) => f.debug_tuple("Float").field(value).finish(),
            Self::Str(value) => f.debug_tuple("Str").field(value).finish(),
            Self::Time(value) => f.debug_tuple("Time").field(value).finish(),
            Self::Seq(value) => f.debug_struct("Seq").field("len", &value.len()).finish(),
            Self::Map(value) => f.debug_struct("Map").field("len", &value.len()).finish(),
            Self::Struct(value) => f.debug_tuple("Struct").field(&value.type_name()).finish(),
            Self::Indirect(value) => f.debug_tuple("Indirect").field(&value.type_name()).finish(),
            Self::Opaque => f.write_str("Opaque"),
        }
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(value: &'a str) -> Self {
        Self::str(value)
    }
}

impl From<String> for Value<'_> {
    fn from(value: String) -> Self {
        Self::Str(Cow::Owned(value))
    }
}

impl From<bool> for Value<'_> {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value<'_> {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u64> for Value<'_> {
    fn from(value: u64) -> Self {
        Self::Uint(value)
    }
}

impl From<f64> for Value<'_> {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<DateTime<Utc>> for Value<'_> {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Time(value)
    }
}

/// Renders a map key for namespaces and snapshots.
pub(crate) fn render_key(key: &Value<'_>) -> String {
    match key {
        Value::Str(value) => value.to_string(),
        Value::Bool(value) => value.to_string(),
        Value::Int(value) => value.to_string(),
        Value::Uint(value) => value.to_string(),
        Value::Float(value) => value.to_string(),
        Value::Time(value) => value.to_rfc3339(),
        Value::Nil => "<nil>".to_owned(),
        other => format!("<{}>", other.kind()),
    }
}

/// Follows [`Value::Indirect`] without consulting custom type extractors.
pub(crate) fn plain(value: &dyn Reflect) -> Value<'_> {
    let mut current = value.reflect();
    for _ in 0..crate::validator::MAX_INDIRECTION {
        match current {
            Value::Indirect(inner) => current = inner.reflect(),
            other => return other,
        }
    }
    Value::Opaque
}

// ============================================================================
// SCALAR IMPLS
// ============================================================================

macro_rules! reflect_scalar {
    ($($ty:ty => |$value:ident| $body:expr),* $(,)?) => {$(
        impl Reflect for $ty {
            fn reflect(&self) -> Value<'_> {
                let $value = self;
                $body
            }
        }
    )*};
}

reflect_scalar! {
    bool => |value| Value::Bool(*value),
    i8 => |value| Value::Int(i64::from(*value)),
    i16 => |value| Value::Int(i64::from(*value)),
    i32 => |value| Value::Int(i64::from(*value)),
    i64 => |value| Value::Int(*value),
    isize => |value| Value::Int(*value as i64),
    u8 => |value| Value::Uint(u64::from(*value)),
    u16 => |value| Value::Uint(u64::from(*value)),
    u32 => |value| Value::Uint(u64::from(*value)),
    u64 => |value| Value::Uint(*value),
    usize => |value| Value::Uint(*value as u64),
    f32 => |value| Value::Float(f64::from(*value)),
    f64 => |value| Value::Float(*value),
    char => |value| Value::Str(Cow::Owned(value.to_string())),
    String => |value| Value::str(value),
    &'static str => |value| Value::str(value),
    Box<str> => |value| Value::str(value),
    Arc<str> => |value| Value::str(value),
    Cow<'static, str> => |value| Value::str(value),
    DateTime<Utc> => |value| Value::Time(*value),
    DateTime<FixedOffset> => |value| Value::Time(value.with_timezone(&Utc)),
    SystemTime => |value| Value::Time(DateTime::<Utc>::from(*value)),
}

// ============================================================================
// WRAPPER IMPLS
// ============================================================================

impl<T: Reflect> Reflect for Option<T> {
    fn reflect(&self) -> Value<'_> {
        match self {
            Some(inner) => Value::Indirect(inner),
            None => Value::Nil,
        }
    }
}

impl<T: Reflect> Reflect for Box<T> {
    fn reflect(&self) -> Value<'_> {
        Value::Indirect(&**self)
    }
}

impl Reflect for Box<dyn Reflect> {
    fn reflect(&self) -> Value<'_> {
        Value::Indirect(&**self)
    }
}

impl<T: Reflect> Reflect for Arc<T> {
    fn reflect(&self) -> Value<'_> {
        Value::Indirect(&**self)
    }
}

impl<T: Reflect> Reflect for Rc<T> {
    fn reflect(&self) -> Value<'_> {
        Value::Indirect(&**self)
    }
}

/// An unset cell reads as nil. Useful for building reference cycles.
impl<T: Reflect> Reflect for OnceLock<T> {
    fn reflect(&self) -> Value<'_> {
        self.get().map_or(Value::Nil, |inner| Value::Indirect(inner))
    }
}

// ============================================================================
// COLLECTION IMPLS
// ============================================================================

macro_rules! reflect_sequence {
    ($([$($generics:tt)*] $ty:ty),* $(,)?) => {$(
        impl<$($generics)*> Sequence for $ty {
            fn len(&self) -> usize {
                <&$ty as IntoIterator>::into_iter(self).len()
            }

            fn iter(&self) -> Box<dyn Iterator<Item = &dyn Reflect> + '_> {
                Box::new(<&$ty as IntoIterator>::into_iter(self).map(|item| item as &dyn Reflect))
            }
        }

        impl<$($generics)*> Reflect for $ty {
            fn reflect(&self) -> Value<'_> {
                Value::Seq(self)
            }
        }
    )*};
}

reflect_sequence! {
    [T: Reflect] Vec<T>,
    [T: Reflect] VecDeque<T>,
    [T: Reflect] BTreeSet<T>,
    [T: Reflect, S: 'static] HashSet<T, S>,
    [T: Reflect, const N: usize] [T; N],
}

macro_rules! reflect_mapping {
    ($([$($generics:tt)*] $ty:ty),* $(,)?) => {$(
        impl<$($generics)*> Mapping for $ty {
            fn len(&self) -> usize {
                <&$ty as IntoIterator>::into_iter(self).len()
            }

            fn entries(&self) -> Box<dyn Iterator<Item = (&dyn Reflect, &dyn Reflect)> + '_> {
                Box::new(
                    <&$ty as IntoIterator>::into_iter(self)
                        .map(|(key, value)| (key as &dyn Reflect, value as &dyn Reflect)),
                )
            }
        }

        impl<$($generics)*> Reflect for $ty {
            fn reflect(&self) -> Value<'_> {
                Value::Map(self)
            }
        }
    )*};
}

reflect_mapping! {
    [K: Reflect, V: Reflect, S: 'static] HashMap<K, V, S>,
    [K: Reflect, V: Reflect] BTreeMap<K, V>,
    [K: Reflect, V: Reflect, S: 'static] IndexMap<K, V, S>,
    [] serde_json::Map<String, serde_json::Value>,
}

impl Reflect for serde_json::Value {
    fn reflect(&self) -> Value<'_> {
        use serde_json::Value as Json;

        match self {
            Json::Null => Value::Nil,
            Json::Bool(value) => Value::Bool(*value),
            Json::Number(number) => number
                .as_i64()
                .map(Value::Int)
                .or_else(|| number.as_u64().map(Value::Uint))
                .or_else(|| number.as_f64().map(Value::Float))
                .unwrap_or(Value::Opaque),
            Json::String(value) => Value::str(value),
            Json::Array(items) => Value::Seq(items),
            Json::Object(map) => Value::Map(map),
        }
    }
}

/// Implements [`Reflect`] for types the engine should treat as leaves.
///
/// Opaque values pass `required` and are never zero. Pair them with
/// [`Validator::register_custom_type_func`](crate::Validator::register_custom_type_func)
/// to validate what they carry.
///
/// ```
/// struct Secret(String);
/// tagval::reflect_opaque!(Secret);
/// ```
#[macro_export]
macro_rules! reflect_opaque {
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::Reflect for $ty {
            fn reflect(&self) -> $crate::Value<'_> {
                $crate::Value::Opaque
            }
        }
    )+};
}
