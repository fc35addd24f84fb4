//! Configuration error types.
//!
//! A [`ConfigError`] means the *rules* are wrong: a malformed expression, an
//! unknown directive, a bad registration. It is never produced because a value
//! failed validation; those failures are collected in
//! [`ValidationErrors`](crate::ValidationErrors).

use crate::report::ValidationErrors;

/// Errors in rule expressions, registrations or validator inputs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A rule expression could not be parsed.
    #[error("invalid rule expression `{expression}` at `{fragment}`: {reason}")]
    TagSyntax {
        /// The full expression.
        expression: String,
        /// The offending part of the expression.
        fragment: String,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// A directive name is not registered.
    #[error("undefined validation `{name}` in rule expression `{expression}`")]
    UnknownDirective {
        /// The unknown directive name.
        name: String,
        /// The expression it appeared in.
        expression: String,
    },

    /// A directive that needs a parameter was used without one.
    #[error("validation `{name}` requires a parameter in rule expression `{expression}`")]
    MissingParam {
        /// The directive name.
        name: String,
        /// The expression it appeared in.
        expression: String,
    },

    /// A field reference path is malformed.
    #[error("invalid field path `{path}`: {reason}")]
    InvalidPath {
        /// The path as written.
        path: String,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// A predicate or alias name cannot be registered.
    #[error("invalid validation name `{name}`: {reason}")]
    InvalidName {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// An alias body cannot be used.
    #[error("invalid alias `{alias}`: {reason}")]
    InvalidAlias {
        /// The alias name.
        alias: String,
        /// Why its body was rejected.
        reason: String,
    },

    /// A struct-level entry point was given something that is not a struct.
    #[error("expected a struct, got `{type_name}`")]
    NotAStruct {
        /// The type that was passed in.
        type_name: &'static str,
    },

    /// A field's rules failed to compile.
    #[error("invalid rules on field `{field}` of `{type_name}`: {source}")]
    Field {
        /// The declaring type.
        type_name: &'static str,
        /// The declared field name.
        field: &'static str,
        /// The underlying compile error.
        #[source]
        source: Box<ConfigError>,
    },
}

impl ConfigError {
    pub(crate) fn syntax(expression: &str, fragment: &str, reason: &'static str) -> Self {
        Self::TagSyntax {
            expression: expression.to_owned(),
            fragment: fragment.to_owned(),
            reason,
        }
    }

    pub(crate) fn invalid_path(path: &str, reason: &'static str) -> Self {
        Self::InvalidPath {
            path: path.to_owned(),
            reason,
        }
    }

    /// The innermost error, looking through [`ConfigError::Field`].
    #[must_use]
    pub fn root_cause(&self) -> &Self {
        match self {
            Self::Field { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Either a configuration problem or a set of validation failures.
///
/// Convenient for callers that fold both outcomes into one `Result`, see
/// [`ValidationErrors::into_result`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The rules themselves are broken.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The value failed validation.
    #[error(transparent)]
    Invalid(#[from] ValidationErrors),
}
