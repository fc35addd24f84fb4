use syn::spanned::Spanned;
use syn::{Data, DeriveInput, Fields, GenericParam};

use super::diag;

/// Return named fields of a struct; otherwise error.
pub fn require_named_fields(input: &DeriveInput) -> syn::Result<&syn::FieldsNamed> {
    let fields = match &input.data {
        Data::Struct(s) => &s.fields,
        _ => {
            return Err(syn::Error::new(
                input.ident.span(),
                "Validate can only be derived for structs",
            ));
        }
    };
    match fields {
        Fields::Named(named) => Ok(named),
        Fields::Unnamed(_) => Err(syn::Error::new(
            fields.span(),
            "Validate requires a struct with named fields (e.g. `struct X { ... }`)",
        )),
        Fields::Unit => Err(syn::Error::new(
            fields.span(),
            "Validate requires a non-unit struct with fields",
        )),
    }
}

/// Reject lifetime parameters: reflected values must be `'static`.
pub fn reject_lifetimes(input: &DeriveInput) -> syn::Result<()> {
    match input
        .generics
        .params
        .iter()
        .find(|param| matches!(param, GenericParam::Lifetime(_)))
    {
        Some(lifetime) => Err(diag::error_spanned(
            lifetime,
            "Validate cannot be derived for structs with lifetime parameters",
        )),
        None => Ok(()),
    }
}
