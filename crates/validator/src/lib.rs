//! # tagval
//!
//! Declarative validation driven by rule expressions attached to struct
//! fields, in the spirit of `required,min=3,max=20`.
//!
//! ## Quick Start
//!
//! ```
//! use tagval::{Validate, Validator};
//!
//! #[derive(Validate)]
//! struct Address {
//!     #[validate("required")]
//!     city: String,
//! }
//!
//! #[derive(Validate)]
//! struct User {
//!     #[validate("required,min=2")]
//!     name: String,
//!     #[validate("omitempty,email")]
//!     email: String,
//!     #[validate("required,dive")]
//!     addresses: Vec<Address>,
//! }
//!
//! let validator = Validator::new();
//! let user = User {
//!     name: "J".into(),
//!     email: String::new(),
//!     addresses: vec![Address { city: String::new() }],
//! };
//!
//! let errors = validator.validate_struct(&user).unwrap();
//! let namespaces: Vec<_> = errors.iter().map(|e| e.namespace.as_str()).collect();
//! assert_eq!(namespaces, ["name", "addresses[0].city"]);
//! ```
//!
//! ## Rule Expressions
//!
//! Directives are separated by `,`; `a|b` passes when either passes. Control
//! directives (`required`, `omitempty`, `dive`, `keys`/`endkeys`,
//! `structonly`, `nostructlevel`, `-`) steer traversal, everything else names
//! a predicate in the validator's registry. See [`tag`] for the grammar.
//!
//! ## Extending
//!
//! - [`Validator::register_validation`] adds a named predicate.
//! - [`Validator::register_alias`] adds shorthand for an expression.
//! - [`Validator::register_custom_type_func`] validates a type through the
//!   value it wraps.
//! - [`Validator::register_struct_validation`] adds a whole-struct check.
//!
//! ## Errors
//!
//! Broken rules surface as [`ConfigError`]. Failed checks are collected as
//! [`FieldError`]s in [`ValidationErrors`], in traversal order.

// Lets `#[derive(Validate)]` output, which names `::tagval`, compile inside
// this crate's own tests.
extern crate self as tagval;

mod builtins;
mod cache;
mod chain;
pub mod config;
pub mod error;
mod level;
pub mod path;
pub mod prelude;
mod registry;
pub mod report;
pub mod tag;
mod validator;
pub mod value;
mod walk;

pub use cache::CacheStats;
pub use config::ValidatorConfig;
pub use error::{ConfigError, Error};
pub use level::{FieldLevel, StructLevel};
pub use path::{FieldPath, Segment};
pub use registry::{PredicateFn, PredicateOptions, RefScope};
pub use report::{FieldError, ValidationErrors};
pub use validator::Validator;
pub use value::{FieldSchema, Kind, Mapping, Reflect, Sequence, Struct, Value};

/// Derives [`Reflect`] and [`Struct`] for a struct with named fields.
///
/// Field attributes:
///
/// - `#[validate("rules")]` or `#[validate(rules = "rules")]` attaches a rule
///   expression.
/// - `#[validate(rename = "Name")]` sets the name used in error namespaces.
/// - `#[validate(skip)]` leaves the field out of validation.
#[cfg(feature = "derive")]
pub use tagval_macros::Validate;
