//! Attribute and visibility conversion for source introspection.

use crate::model::{AccessLevel, Attribute as Marker};
use syn::punctuated::Punctuated;
use syn::{Attribute, Meta, Token, Visibility};

/// Converts item attributes into model markers.
///
/// Doc comments are dropped. `#[derive(..)]` becomes a `derive` marker with
/// one argument per derived trait; other list attributes keep their tokens
/// under `args`, and `#[name = value]` keeps the value under `value`.
#[must_use]
pub fn markers(attrs: &[Attribute]) -> Vec<Marker> {
    attrs
        .iter()
        .filter(|attr| !attr.path().is_ident("doc"))
        .map(marker)
        .collect()
}

fn marker(attr: &Attribute) -> Marker {
    let name = attr
        .path()
        .segments
        .iter()
        .map(|seg| seg.ident.to_string())
        .collect::<Vec<_>>()
        .join(".");
    let mut result = Marker::new(name);

    match &attr.meta {
        Meta::Path(_) => {}
        Meta::NameValue(nv) => {
            let value = match &nv.value {
                syn::Expr::Lit(syn::ExprLit {
                    lit: syn::Lit::Str(s),
                    ..
                }) => s.value(),
                other => quote::quote!(#other).to_string(),
            };
            result = result.with_argument("value", value);
        }
        Meta::List(list) => {
            if attr.path().is_ident("derive") {
                for derived in derived_traits(attr) {
                    result = result.with_argument(derived, "");
                }
            } else {
                result = result.with_argument("args", list.tokens.to_string());
            }
        }
    }

    result
}

/// Names of the traits listed in a `#[derive(..)]` attribute.
fn derived_traits(attr: &Attribute) -> Vec<String> {
    attr.parse_args_with(Punctuated::<syn::Path, Token![,]>::parse_terminated)
        .map(|paths| {
            paths
                .iter()
                .filter_map(|p| p.segments.last().map(|s| s.ident.to_string()))
                .collect()
        })
        .unwrap_or_default()
}

/// Checks if attributes derive a specific trait.
#[must_use]
pub fn derives(attrs: &[Attribute], trait_name: &str) -> bool {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident("derive"))
        .any(|attr| derived_traits(attr).iter().any(|d| d == trait_name))
}

/// Checks if attributes contain a `#[cfg(test)]` attribute.
#[must_use]
pub fn has_cfg_test(attrs: &[Attribute]) -> bool {
    attrs.iter().any(|attr| {
        attr.path().is_ident("cfg") && quote::quote!(#attr).to_string().contains("test")
    })
}

/// Maps Rust visibility onto the model's access levels.
#[must_use]
pub fn access_level(vis: &Visibility) -> AccessLevel {
    match vis {
        Visibility::Public(_) => AccessLevel::Public,
        Visibility::Restricted(r) if r.in_token.is_none() && r.path.is_ident("crate") => {
            AccessLevel::Internal
        }
        Visibility::Restricted(r) if r.in_token.is_none() && r.path.is_ident("self") => {
            AccessLevel::Private
        }
        Visibility::Restricted(_) => AccessLevel::Protected,
        Visibility::Inherited => AccessLevel::Private,
    }
}
