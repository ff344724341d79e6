//! Name resolution for the source introspector.
//!
//! Resolution is purely syntactic: `use` declarations, `crate`/`self`/`super`
//! prefixes, child modules and same-module declarations. Anything else is
//! attributed to the crate named by its first segment, and unresolved single
//! names (primitives and prelude types) to `std`.

use crate::model::{NamedType, TypeName, TypeRef};
use crate::utils::paths::path_segments;
use std::collections::{BTreeSet, HashMap};

/// Module owning primitives, prelude names and `core`/`alloc` items.
pub(super) const STD_MODULE: &str = "std";

const MAX_ALIAS_DEPTH: usize = 16;

/// Crate-wide declarations collected before any type is resolved.
#[derive(Debug, Default)]
pub(super) struct CrateScope {
    /// Crate identifier, also the root namespace.
    pub(super) name: String,
    /// Known module paths, relative to the crate root.
    pub(super) modules: BTreeSet<Vec<String>>,
    /// Type names declared per module path.
    pub(super) types: HashMap<Vec<String>, BTreeSet<String>>,
}

impl CrateScope {
    pub(super) fn new(name: impl Into<String>) -> Self {
        let mut modules = BTreeSet::new();
        modules.insert(Vec::new());
        Self {
            name: name.into(),
            modules,
            types: HashMap::new(),
        }
    }

    pub(super) fn declare_module(&mut self, path: Vec<String>) {
        self.modules.insert(path);
    }

    pub(super) fn declare_type(&mut self, module: &[String], ident: String) {
        self.types.entry(module.to_vec()).or_default().insert(ident);
    }

    fn declares(&self, module: &[String], ident: &str) -> bool {
        self.types.get(module).is_some_and(|t| t.contains(ident))
    }

    /// Name of a type declared in `module`.
    pub(super) fn type_name(&self, module: &[String], ident: &str) -> TypeName {
        TypeName::new(Some(&self.namespace(module)), ident)
    }

    /// Dotted namespace of a module path.
    pub(super) fn namespace(&self, module: &[String]) -> String {
        std::iter::once(self.name.as_str())
            .chain(module.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// Names visible inside one module body.
#[derive(Debug)]
pub(super) struct ModuleScope<'a> {
    krate: &'a CrateScope,
    path: Vec<String>,
    aliases: HashMap<String, Vec<String>>,
    globs: Vec<Vec<String>>,
}

/// Names that shadow crate-level resolution inside an item.
#[derive(Debug, Default, Clone)]
pub(super) struct ItemScope {
    /// Generic parameters in scope.
    pub(super) generics: Vec<String>,
    /// What `Self` means, if anything.
    pub(super) self_type: Option<TypeRef>,
}

impl ItemScope {
    pub(super) fn with_generics(mut self, generics: &syn::Generics) -> Self {
        self.generics
            .extend(generics.type_params().map(|p| p.ident.to_string()));
        self
    }
}

impl<'a> ModuleScope<'a> {
    /// Builds the scope of a module body from its `use` declarations.
    pub(super) fn new(krate: &'a CrateScope, path: Vec<String>, items: &[syn::Item]) -> Self {
        let mut scope = Self {
            krate,
            path,
            aliases: HashMap::new(),
            globs: Vec::new(),
        };
        for item in items {
            if let syn::Item::Use(u) = item {
                scope.add_use(&u.tree, Vec::new());
            }
        }
        scope
    }

    pub(super) fn path(&self) -> &[String] {
        &self.path
    }

    pub(super) fn krate(&self) -> &CrateScope {
        self.krate
    }

    fn add_use(&mut self, tree: &syn::UseTree, mut prefix: Vec<String>) {
        match tree {
            syn::UseTree::Path(p) => {
                prefix.push(p.ident.to_string());
                self.add_use(&p.tree, prefix);
            }
            syn::UseTree::Name(n) => {
                let ident = n.ident.to_string();
                if ident == "self" {
                    if let Some(last) = prefix.last().cloned() {
                        self.aliases.insert(last, prefix);
                    }
                } else {
                    prefix.push(ident.clone());
                    self.aliases.insert(ident, prefix);
                }
            }
            syn::UseTree::Rename(r) => {
                prefix.push(r.ident.to_string());
                self.aliases.insert(r.rename.to_string(), prefix);
            }
            syn::UseTree::Glob(_) => self.globs.push(prefix),
            syn::UseTree::Group(g) => {
                for item in &g.items {
                    self.add_use(item, prefix.clone());
                }
            }
        }
    }

    /// Resolves a syntactic type to a model reference.
    ///
    /// Returns `None` for types that name nothing (unit, `!`, `_`, function
    /// pointers, projections such as `T::Item`).
    pub(super) fn resolve_type(&self, ty: &syn::Type, item: &ItemScope) -> Option<TypeRef> {
        match ty {
            syn::Type::Path(p) if p.qself.is_none() => self.resolve_path(&p.path, item),
            syn::Type::Reference(r) => self.resolve_type(&r.elem, item),
            syn::Type::Ptr(p) => self.resolve_type(&p.elem, item),
            syn::Type::Paren(p) => self.resolve_type(&p.elem, item),
            syn::Type::Group(g) => self.resolve_type(&g.elem, item),
            syn::Type::Slice(s) => Some(self.builtin("slice", [&*s.elem], item)),
            syn::Type::Array(a) => Some(self.builtin("array", [&*a.elem], item)),
            syn::Type::Tuple(t) if !t.elems.is_empty() => {
                Some(self.builtin("tuple", t.elems.iter(), item))
            }
            syn::Type::TraitObject(t) => self.resolve_bounds(&t.bounds, item),
            syn::Type::ImplTrait(t) => self.resolve_bounds(&t.bounds, item),
            _ => None,
        }
    }

    fn builtin<'t>(
        &self,
        name: &str,
        elems: impl IntoIterator<Item = &'t syn::Type>,
        item: &ItemScope,
    ) -> TypeRef {
        let args = elems
            .into_iter()
            .filter_map(|e| self.resolve_type(e, item))
            .collect();
        TypeRef::named(STD_MODULE, TypeName::new(Some(STD_MODULE), name)).with_args(args)
    }

    fn resolve_bounds(
        &self,
        bounds: &syn::punctuated::Punctuated<syn::TypeParamBound, syn::Token![+]>,
        item: &ItemScope,
    ) -> Option<TypeRef> {
        bounds.iter().find_map(|b| match b {
            syn::TypeParamBound::Trait(t) => self.resolve_path(&t.path, item),
            _ => None,
        })
    }

    /// Resolves a path naming a type or trait.
    pub(super) fn resolve_path(&self, path: &syn::Path, item: &ItemScope) -> Option<TypeRef> {
        let segments = path_segments(path);
        let first = segments.first()?;

        if segments.len() == 1 {
            if first == "Self" {
                return item.self_type.clone();
            }
            if item.generics.contains(first) {
                return Some(TypeRef::generic(first.clone()));
            }
        } else if item.generics.contains(first) || first == "Self" {
            // Associated type projection.
            return None;
        }

        let args = path
            .segments
            .last()
            .map(|last| self.generic_args(&last.arguments, item))
            .unwrap_or_default();

        let (module, name) = self.locate(segments);
        Some(TypeRef::Named(NamedType { name, module, args }))
    }

    fn generic_args(&self, arguments: &syn::PathArguments, item: &ItemScope) -> Vec<TypeRef> {
        match arguments {
            syn::PathArguments::AngleBracketed(a) => a
                .args
                .iter()
                .filter_map(|arg| match arg {
                    syn::GenericArgument::Type(t) => self.resolve_type(t, item),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Maps path segments to `(owning module, type name)`.
    fn locate(&self, segments: Vec<String>) -> (String, TypeName) {
        match self.absolutize(segments, 0) {
            Target::Local(mut module) => {
                let ident = module.pop().unwrap_or_default();
                (self.krate.name.clone(), self.krate.type_name(&module, &ident))
            }
            Target::External(segments) => {
                let owner = match segments.first().map(String::as_str) {
                    None | Some("core" | "alloc") => STD_MODULE.to_string(),
                    Some(other) => other.to_string(),
                };
                (owner, TypeName::parse(&segments.join(".")))
            }
        }
    }

    fn absolutize(&self, segments: Vec<String>, depth: usize) -> Target {
        let (first, rest) = match segments.split_first() {
            Some((first, rest)) => (first.as_str(), rest),
            None => return Target::External(vec![STD_MODULE.to_string()]),
        };

        match first {
            "crate" => return Target::Local(rest.to_vec()),
            "self" => return Target::Local(concat(&self.path, rest)),
            "super" => {
                let supers = segments.iter().take_while(|s| *s == "super").count();
                let keep = self.path.len().saturating_sub(supers);
                return Target::Local(concat(&self.path[..keep], &segments[supers..]));
            }
            "" => return Target::External(rest.to_vec()),
            _ => {}
        }

        if first == self.krate.name {
            return Target::Local(rest.to_vec());
        }

        if depth < MAX_ALIAS_DEPTH {
            if let Some(target) = self.aliases.get(first) {
                if target.len() > 1 || target[0] != first {
                    return self.absolutize(concat(target, rest), depth + 1);
                }
            }
        }

        let child = concat(&self.path, &[first.to_string()]);
        if self.krate.modules.contains(&child) {
            return Target::Local(concat(&self.path, &segments));
        }

        if rest.is_empty() {
            if self.krate.declares(&self.path, first) {
                return Target::Local(concat(&self.path, &segments));
            }
            for glob in &self.globs {
                if let Target::Local(module) = self.absolutize(glob.clone(), MAX_ALIAS_DEPTH) {
                    if self.krate.declares(&module, first) {
                        return Target::Local(concat(&module, &segments));
                    }
                }
            }
            return Target::External(vec![STD_MODULE.to_string(), first.to_string()]);
        }

        Target::External(segments)
    }
}

/// A fully qualified path.
enum Target {
    /// Module path and item name inside the analyzed crate.
    Local(Vec<String>),
    /// Path whose first segment names another crate.
    External(Vec<String>),
}

fn concat(a: &[String], b: &[String]) -> Vec<String> {
    a.iter().chain(b).cloned().collect()
}
