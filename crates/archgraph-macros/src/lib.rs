//! # archgraph-macros
//!
//! Procedural macros for running archgraph as part of `cargo test`.
//!
//! Use them through the `archgraph` facade crate:
//!
//! ```rust,ignore
//! // tests/architecture.rs
//! archgraph::check!();
//! archgraph::check!(config = "archgraph.strict.toml", fail_on_empty = true);
//! ```

#![forbid(unsafe_code)]

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{parse_macro_input, Ident, Lit, LitBool, LitStr, Token};

/// Generates a `#[test]` that loads `archgraph.toml` and fails on any
/// violation.
///
/// # Arguments
///
/// - `config = "path"`: config file, relative to the workspace root
///   (default: `archgraph.toml`, then `.archgraph.toml`)
/// - `fail_on_empty = bool`: fail when no rule is configured (default: false)
#[proc_macro]
pub fn check(input: TokenStream) -> TokenStream {
    let args = parse_macro_input!(input as CheckArgs);
    expand_check(&args).into()
}

#[derive(Default)]
struct CheckArgs {
    config: Option<LitStr>,
    fail_on_empty: Option<LitBool>,
}

struct Arg {
    key: Ident,
    value: Lit,
}

impl Parse for Arg {
    fn parse(input: ParseStream<'_>) -> syn::Result<Self> {
        let key: Ident = input.parse()?;
        input.parse::<Token![=]>()?;
        let value: Lit = input.parse()?;
        Ok(Self { key, value })
    }
}

impl Parse for CheckArgs {
    fn parse(input: ParseStream<'_>) -> syn::Result<Self> {
        let mut args = Self::default();
        for arg in Punctuated::<Arg, Token![,]>::parse_terminated(input)? {
            match (arg.key.to_string().as_str(), arg.value) {
                ("config", Lit::Str(s)) if args.config.is_none() => args.config = Some(s),
                ("fail_on_empty", Lit::Bool(b)) if args.fail_on_empty.is_none() => {
                    args.fail_on_empty = Some(b);
                }
                ("config" | "fail_on_empty", value) => {
                    return Err(syn::Error::new_spanned(
                        value,
                        format!("duplicate or mistyped argument `{}`", arg.key),
                    ));
                }
                _ => {
                    return Err(syn::Error::new_spanned(
                        &arg.key,
                        "unknown argument, expected `config` or `fail_on_empty`",
                    ));
                }
            }
        }
        Ok(args)
    }
}

fn expand_check(args: &CheckArgs) -> TokenStream2 {
    let config = match &args.config {
        Some(path) => quote!(::core::option::Option::Some(#path)),
        None => quote!(::core::option::Option::None),
    };
    let fail_on_empty = args.fail_on_empty.as_ref().is_some_and(LitBool::value);

    quote! {
        #[test]
        fn archgraph_architecture() {
            ::archgraph::__internal::run_check(#config, #fail_on_empty);
        }
    }
}
