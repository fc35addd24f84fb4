//! Field reference paths used by cross-field checks.
//!
//! A path names a value relative to some origin: `end`, `inner.start`,
//! `items[0]`, `labels[primary]`. Segments are separated by `.`, index and
//! key segments are written in brackets.

use std::fmt;
use std::str::FromStr;

use smallvec::SmallVec;

use crate::error::ConfigError;
use crate::validator::Validator;
use crate::value::{Reflect, Value, render_key};

/// One step of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Declared struct field name.
    Field(Box<str>),
    /// Sequence position.
    Index(usize),
    /// Map key, compared against the rendered key.
    Key(Box<str>),
}

/// A parsed field reference.
///
/// The empty path refers to the origin itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath {
    raw: Box<str>,
    segments: SmallVec<[Segment; 4]>,
}

impl FieldPath {
    /// Parses a path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPath`] for empty segments, unbalanced
    /// brackets and stray characters after a bracket.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let mut segments = SmallVec::new();
        let mut pos = 0;

        while pos < raw.len() {
            let rest = &raw[pos..];
            let name_end = rest.find(['.', '[']).unwrap_or(rest.len());
            let name = &rest[..name_end];

            if name.is_empty() {
                if pos != 0 || !rest.starts_with('[') {
                    return Err(ConfigError::invalid_path(raw, "empty segment"));
                }
            } else if name.contains(']') {
                return Err(ConfigError::invalid_path(raw, "unbalanced `]`"));
            } else {
                segments.push(Segment::Field(name.into()));
            }
            pos += name_end;

            while raw[pos..].starts_with('[') {
                let close = raw[pos..]
                    .find(']')
                    .ok_or_else(|| ConfigError::invalid_path(raw, "unclosed `[`"))?;
                let inner = &raw[pos + 1..pos + close];
                if inner.is_empty() {
                    return Err(ConfigError::invalid_path(raw, "empty brackets"));
                }
                segments.push(if inner.bytes().all(|b| b.is_ascii_digit()) {
                    let index = inner
                        .parse()
                        .map_err(|_| ConfigError::invalid_path(raw, "index out of range"))?;
                    Segment::Index(index)
                } else {
                    Segment::Key(inner.into())
                });
                pos += close + 1;
            }

            if pos < raw.len() {
                if !raw[pos..].starts_with('.') {
                    return Err(ConfigError::invalid_path(raw, "expected `.` or `[`"));
                }
                pos += 1;
                if pos == raw.len() {
                    return Err(ConfigError::invalid_path(raw, "trailing `.`"));
                }
            }
        }

        Ok(Self {
            raw: raw.into(),
            segments,
        })
    }

    /// The path as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Parsed segments.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns `true` for the empty path.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Walks the path from `origin`.
    ///
    /// Returns `None` when a segment does not exist or an intermediate value
    /// is nil. The final value itself may be [`Value::Nil`].
    #[must_use]
    pub fn resolve<'a>(&self, validator: &Validator, origin: &'a dyn Reflect) -> Option<Value<'a>> {
        let mut current = validator.extract(origin);

        for segment in &self.segments {
            let next: &'a dyn Reflect = match (segment, current) {
                (Segment::Field(name), Value::Struct(record)) => record.field_by_name(name)?,
                (Segment::Index(index), Value::Seq(seq)) => seq.iter().nth(*index)?,
                (Segment::Index(index), Value::Map(map)) => {
                    let key = index.to_string();
                    lookup(validator, map.entries(), &key)?
                }
                (Segment::Key(key), Value::Map(map)) => lookup(validator, map.entries(), key)?,
                _ => return None,
            };
            current = validator.extract(next);
        }

        Some(current)
    }
}

fn lookup<'a>(
    validator: &Validator,
    mut entries: impl Iterator<Item = (&'a dyn Reflect, &'a dyn Reflect)>,
    key: &str,
) -> Option<&'a dyn Reflect> {
    entries
        .find(|(candidate, _)| render_key(&validator.extract(*candidate)) == key)
        .map(|(_, value)| value)
}

impl FromStr for FieldPath {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
