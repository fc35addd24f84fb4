//! # tagval-macros
//!
//! Derive macro for [`tagval`](https://docs.rs/tagval).
//!
//! | Macro | Description |
//! |-------|-------------|
//! | [`Validate`](derive@Validate) | Implements `tagval::Reflect` and `tagval::Struct` |

#![forbid(unsafe_code)]
#![warn(missing_docs)]

extern crate proc_macro;

use proc_macro::TokenStream;

mod support;
mod validate;

/// Derive macro exposing a struct's fields and rule expressions to the
/// `tagval` engine.
///
/// # Attributes
///
/// ## Field attributes (`#[validate(...)]` on a field)
///
/// - `"rules"` or `rules = "..."` - Rule expression for the field
/// - `rename = "..."` - Name used in error namespaces (default: the field name)
/// - `skip` - Leaves the field out of validation
///
/// Fields without rules are still traversed, so nested structs are
/// validated through them.
///
/// # Example
///
/// ```ignore
/// #[derive(Validate)]
/// pub struct Signup {
///     #[validate("required,email")]
///     email: String,
///
///     #[validate(rules = "gte=13", rename = "Age")]
///     age: u8,
///
///     #[validate(skip)]
///     session: SessionHandle,
/// }
/// ```
#[proc_macro_derive(Validate, attributes(validate))]
pub fn derive_validate(input: TokenStream) -> TokenStream {
    validate::derive(input)
}
