//! Validator configuration.

use serde::{Deserialize, Serialize};

/// Validator configuration.
///
/// Every field has a default, so partial documents deserialize:
///
/// ```
/// let config: tagval::ValidatorConfig =
///     serde_json::from_str(r#"{ "max_depth": 8 }"#).unwrap();
/// assert_eq!(config.max_depth, 8);
/// assert!(config.include_builtins);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Maximum struct nesting depth. Deeper structs are not visited.
    pub max_depth: usize,

    /// Stop checking a field after its first failing directive.
    ///
    /// Off by default: every directive of a field runs and each failure is
    /// reported.
    pub first_error_per_field: bool,

    /// Install the built-in predicates and aliases.
    pub include_builtins: bool,

    /// Attach a JSON snapshot of the failing value to each error.
    pub capture_values: bool,

    /// How many container levels a value snapshot descends.
    pub value_snapshot_depth: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_depth: 64,
            first_error_per_field: false,
            include_builtins: true,
            capture_values: true,
            value_snapshot_depth: 3,
        }
    }
}
