//! Path utilities for source introspection.

use std::path::{Component, Path};

/// Converts a syn Path to its segment names.
///
/// A leading `::` is kept as an empty first segment so callers can tell an
/// absolute path from a relative one.
#[must_use]
pub fn path_segments(path: &syn::Path) -> Vec<String> {
    let mut segments = Vec::with_capacity(path.segments.len() + 1);
    if path.leading_colon.is_some() {
        segments.push(String::new());
    }
    segments.extend(path.segments.iter().map(|seg| seg.ident.to_string()));
    segments
}

/// Computes a module path from a file path relative to `src/`.
///
/// `lib.rs`, `main.rs` and `mod.rs` name their parent module.
///
/// ```ignore
/// assert_eq!(module_path_of(Path::new("tuna/atlantic.rs")), vec!["tuna", "atlantic"]);
/// assert_eq!(module_path_of(Path::new("tuna/mod.rs")), vec!["tuna"]);
/// ```
#[must_use]
pub fn module_path_of(relative_path: &Path) -> Vec<String> {
    let mut parts: Vec<String> = relative_path
        .with_extension("")
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => s.to_str().map(String::from),
            _ => None,
        })
        .collect();

    if let Some(last) = parts.last() {
        if last == "mod" || last == "lib" || (last == "main" && parts.len() == 1) {
            parts.pop();
        }
    }

    parts
}

/// Normalizes a crate or package name to its Rust identifier form.
#[must_use]
pub fn crate_ident(name: &str) -> String {
    name.replace('-', "_")
}
