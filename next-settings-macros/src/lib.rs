//! Proc macros for the next-settings crate.
//!
//! This crate provides the `#[derive(ParserPlugin)]` macro

use proc_macro::TokenStream;
use quote::quote;
use syn::{DeriveInput, Expr, Lit, parse_macro_input, spanned::Spanned};

/// Options parsed from the `#[parser(...)]` attribute.
struct ParserOptions {
    name: String,
}

impl ParserOptions {
    fn from_attrs(attrs: &[syn::Attribute]) -> syn::Result<Self> {
        let mut name = None;

        for attr in attrs {
            if attr.path().is_ident("parser") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("name") {
                        let value: Expr = meta.value()?.parse()?;
                        if let Expr::Lit(expr_lit) = value {
                            if let Lit::Str(lit_str) = expr_lit.lit {
                                name = Some(lit_str.value());
                            } else {
                                return Err(syn::Error::new(
                                    expr_lit.span(),
                                    "name must be a string",
                                ));
                            }
                        } else {
                            return Err(syn::Error::new(value.span(), "name must be a literal"));
                        }
                    } else {
                        return Err(syn::Error::new(
                            meta.path.span(),
                            format!("unknown parser attribute: {:?}", meta.path.get_ident()),
                        ));
                    }
                    Ok(())
                })?;
            }
        }

        let name = name.ok_or_else(|| {
            syn::Error::new(
                proc_macro2::Span::call_site(),
                "missing required attribute: #[parser(name = \"...\")]",
            )
        })?;

        if name.trim().is_empty() {
            return Err(syn::Error::new(
                proc_macro2::Span::call_site(),
                "parser name must not be empty",
            ));
        }

        Ok(Self { name })
    }
}

/// Derive macro for registering a parser implementation by name.
///
/// This macro automatically:
/// - Implements the `ParserName` trait with the given name
/// - Registers the parser with `inventory` so that every
///   `ParserRegistry::collect()` can resolve it by that name
///
/// The type must also implement `Parser` and `FromInput`; the registration
/// fails to compile otherwise.
///
/// # Example
///
/// ```rust,ignore
/// use next_settings::{FromInput, InputSource, Parser, ParserPlugin};
///
/// #[derive(ParserPlugin)]
/// #[parser(name = "lines")]
/// struct LinesParser {
///     input: InputSource,
/// }
/// ```
///
/// This expands to roughly:
///
/// ```rust,ignore
/// impl next_settings::ParserName for LinesParser {
///     const NAME: &'static str = "lines";
/// }
///
/// inventory::submit! {
///     next_settings::RegisteredParser::new::<LinesParser>()
/// }
/// ```
#[proc_macro_derive(ParserPlugin, attributes(parser))]
pub fn derive_parser_plugin(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match derive_parser_plugin_impl(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn derive_parser_plugin_impl(input: DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new(
            input.generics.span(),
            "ParserPlugin cannot be derived for generic types",
        ));
    }

    let options = ParserOptions::from_attrs(&input.attrs)?;
    let name = &input.ident;
    let parser_name = &options.name;

    Ok(quote! {
        impl ::next_settings::ParserName for #name {
            const NAME: &'static str = #parser_name;
        }

        ::next_settings::inventory::submit! {
            ::next_settings::RegisteredParser::new::<#name>()
        }
    })
}
