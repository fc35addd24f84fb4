//! Prelude module for convenient imports.
//!
//! ```
//! use tagval::prelude::*;
//!
//! let validator = Validator::new();
//! assert!(validator.validate_value(&"abc", "len=3").unwrap().is_empty());
//! ```

pub use crate::{
    ConfigError, FieldError, FieldLevel, Kind, PredicateOptions, Reflect, RefScope, Struct,
    StructLevel, ValidationErrors, Validator, ValidatorConfig, Value,
};

#[cfg(feature = "derive")]
pub use crate::Validate;
