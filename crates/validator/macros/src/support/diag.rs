use proc_macro::TokenStream;

/// Turns a failed `#[derive(Validate)]` expansion into `compile_error!`
/// output pointing at the offending attribute or field.
pub fn to_compile_error(err: syn::Error) -> TokenStream {
    err.to_compile_error().into()
}

/// Error spanned to a `#[validate(...)]` argument, field or generic param.
pub fn error_spanned<T: quote::ToTokens>(tokens: &T, msg: impl Into<String>) -> syn::Error {
    syn::Error::new_spanned(tokens, msg.into())
}
