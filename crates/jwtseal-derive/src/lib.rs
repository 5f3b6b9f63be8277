//! jwtseal Macros
//!
//! This crate provides `#[derive(ClaimsRecord)]`.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Data, DataStruct, DeriveInput, Fields, LitStr};

/// Implements `jwtseal::ClaimsRecord` for a struct with named fields.
///
/// Every field type must implement `jwtseal::FromClaimValue` and the struct
/// must implement `Default`.
///
/// Field attributes:
/// - `#[claim(rename = "name")]`: JSON member name (defaults to the field name)
/// - `#[claim(required)]`: strict decoding fails when the member is absent or
///   holds a zero value
/// - `#[claim(skip)]`: never decoded, keeps its default
///
/// ```ignore
/// #[derive(Debug, Default, ClaimsRecord)]
/// struct Session {
///     #[claim(required, rename = "uid")]
///     user_id: String,
///     scopes: Vec<String>,
/// }
/// ```
#[proc_macro_derive(ClaimsRecord, attributes(claim))]
pub fn derive_claims_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

struct FieldOptions {
    rename: Option<String>,
    required: bool,
    skip: bool,
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(DataStruct {
            fields: Fields::Named(fields),
            ..
        }) => &fields.named,
        _ => {
            return Err(syn::Error::new_spanned(
                struct_name,
                "#[derive(ClaimsRecord)] can only be applied to structs with named fields",
            ))
        }
    };

    let mut descriptors = Vec::with_capacity(fields.len());
    for field in fields {
        let options = field_options(field)?;
        if options.skip {
            continue;
        }

        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let name = options
            .rename
            .unwrap_or_else(|| ident.to_string().trim_start_matches("r#").to_string());
        let required = options.required;

        descriptors.push(quote! {
            ::jwtseal::Field::new(
                #name,
                #required,
                |record: &mut Self, value: &::jwtseal::Value| {
                    record.#ident = ::jwtseal::FromClaimValue::from_claim_value(value)?;
                    ::std::result::Result::Ok(())
                },
            )
        });
    }

    Ok(quote! {
        impl #impl_generics ::jwtseal::ClaimsRecord for #struct_name #ty_generics #where_clause {
            fn fields() -> ::std::vec::Vec<::jwtseal::Field<Self>> {
                ::std::vec![#(#descriptors),*]
            }
        }
    })
}

fn field_options(field: &syn::Field) -> syn::Result<FieldOptions> {
    let mut options = FieldOptions {
        rename: None,
        required: false,
        skip: false,
    };

    for attr in field.attrs.iter().filter(|a| a.path().is_ident("claim")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("required") {
                options.required = true;
                Ok(())
            } else if meta.path.is_ident("skip") {
                options.skip = true;
                Ok(())
            } else if meta.path.is_ident("rename") {
                let name: LitStr = meta.value()?.parse()?;
                options.rename = Some(name.value());
                Ok(())
            } else {
                Err(meta.error("expected `required`, `skip` or `rename = \"...\"`"))
            }
        })?;
    }

    Ok(options)
}
