use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{quote, quote_spanned};
use syn::spanned::Spanned;
use syn::{Attribute, DeriveInput, LitStr, parse_macro_input, parse_quote};

use crate::support::{diag, utils};

pub fn derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand(input) {
        Ok(ts) => ts.into(),
        Err(e) => diag::to_compile_error(e),
    }
}

/// Parsed `#[validate(...)]` attributes of one field.
#[derive(Default)]
struct FieldAttrs {
    rules: Option<LitStr>,
    rename: Option<LitStr>,
    skip: bool,
}

impl FieldAttrs {
    fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();

        for attr in attrs.iter().filter(|attr| attr.path().is_ident("validate")) {
            // Shorthand: #[validate("required,min=1")]
            if let Ok(rules) = attr.parse_args::<LitStr>() {
                out.set_rules(rules)?;
                continue;
            }

            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rules") {
                    out.set_rules(meta.value()?.parse()?)
                } else if meta.path.is_ident("rename") {
                    if out.rename.is_some() {
                        return Err(meta.error("duplicate `rename`"));
                    }
                    out.rename = Some(meta.value()?.parse()?);
                    Ok(())
                } else if meta.path.is_ident("skip") {
                    out.skip = true;
                    Ok(())
                } else {
                    Err(meta.error(
                        "unsupported validate attribute; expected a rule string, \
                         `rules = \"...\"`, `rename = \"...\"` or `skip`",
                    ))
                }
            })?;
        }

        if let (true, Some(rules)) = (out.skip, &out.rules) {
            return Err(diag::error_spanned(
                rules,
                "a skipped field cannot have rules",
            ));
        }
        Ok(out)
    }

    fn set_rules(&mut self, rules: LitStr) -> syn::Result<()> {
        if self.rules.is_some() {
            return Err(diag::error_spanned(
                &rules,
                "rules are already set for this field",
            ));
        }
        self.rules = Some(rules);
        Ok(())
    }
}

fn expand(input: DeriveInput) -> syn::Result<TokenStream2> {
    utils::reject_lifetimes(&input)?;
    let fields = utils::require_named_fields(&input)?;
    let struct_name = &input.ident;

    let mut schema = Vec::with_capacity(fields.named.len());
    let mut arms = Vec::with_capacity(fields.named.len());

    for (index, field) in fields.named.iter().enumerate() {
        let Some(ident) = field.ident.as_ref() else {
            return Err(diag::error_spanned(field, "expected a named field"));
        };
        let attrs = FieldAttrs::parse(&field.attrs)?;

        let name = ident.to_string();
        let name = name.strip_prefix("r#").unwrap_or(&name);

        let mut entry = quote!(::tagval::FieldSchema::new(#name));
        if let Some(rename) = &attrs.rename {
            entry = quote!(#entry.display(#rename));
        }
        if attrs.skip {
            entry = quote!(#entry.rules("-"));
        } else {
            if let Some(rules) = &attrs.rules {
                entry = quote!(#entry.rules(#rules));
            }
            // Skipped fields are never read, so they need no `Reflect` impl.
            let ty = &field.ty;
            arms.push(quote_spanned! {ty.span()=>
                #index => ::core::option::Option::Some(&self.#ident as &dyn ::tagval::Reflect),
            });
        }
        schema.push(entry);
    }

    let mut generics = input.generics.clone();
    let type_params: Vec<_> = generics.type_params().map(|p| p.ident.clone()).collect();
    let where_clause = generics.make_where_clause();
    for param in type_params {
        where_clause
            .predicates
            .push(parse_quote!(#param: ::tagval::Reflect));
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::tagval::Reflect for #struct_name #ty_generics #where_clause {
            fn reflect(&self) -> ::tagval::Value<'_> {
                ::tagval::Value::Struct(self)
            }
        }

        impl #impl_generics ::tagval::Struct for #struct_name #ty_generics #where_clause {
            fn schema(&self) -> &'static [::tagval::FieldSchema] {
                const SCHEMA: &[::tagval::FieldSchema] = &[#(#schema),*];
                SCHEMA
            }

            fn field(&self, index: usize) -> ::core::option::Option<&dyn ::tagval::Reflect> {
                #[allow(clippy::match_single_binding)]
                match index {
                    #(#arms)*
                    _ => ::core::option::Option::None,
                }
            }
        }
    })
}
