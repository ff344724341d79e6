//! Static extraction of the type model from Rust sources.
//!
//! Extraction runs in two passes over the parsed files of one crate. The
//! first pass records every module and type declaration so that the second
//! can resolve names declared in files it has not visited yet.

use super::resolve::{CrateScope, ItemScope, ModuleScope};
use super::{IntrospectError, ModuleIntrospector};
use crate::model::{
    Member, ModuleDescriptor, ModuleReference, TypeDescriptor, TypeKind, TypeName, TypeRef,
};
use crate::utils::{access_level, crate_ident, derives, has_cfg_test, markers, module_path_of};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Placeholder for a parameter whose type names nothing (e.g. a function
/// pointer). It keeps arity intact and is never a graph node.
const UNNAMED_PARAMETER: &str = "_";

/// Reads one Rust crate (a directory containing `Cargo.toml` and `src/`).
#[derive(Debug, Clone)]
pub struct SourceIntrospector {
    root: PathBuf,
    exclude_patterns: Vec<String>,
    fail_on_parse_error: bool,
}

impl SourceIntrospector {
    /// Creates an introspector for the crate at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            exclude_patterns: vec!["**/target/**".to_string()],
            fail_on_parse_error: false,
        }
    }

    /// Adds an exclude glob pattern, matched against paths relative to the crate root.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Adds multiple exclude glob patterns.
    #[must_use]
    pub fn excludes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Sets whether to fail on parse errors (default: false, skip with a warning).
    #[must_use]
    pub fn fail_on_parse_error(mut self, fail: bool) -> Self {
        self.fail_on_parse_error = fail;
        self
    }

    /// Crate root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Extracts the crate as a single module.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest is missing or malformed, the source
    /// tree cannot be walked, or (when configured) a file fails to parse.
    pub fn introspect(&self) -> Result<ModuleDescriptor, IntrospectError> {
        let manifest = self.read_manifest()?;
        let files = self.parse_files(&self.discover_files()?)?;

        let mut krate = CrateScope::new(crate_ident(&manifest.name));
        for file in &files {
            krate.declare_module(file.module.clone());
            declare(&mut krate, &file.module, &file.ast.items);
        }

        let mut extractor = Extractor::new(&krate);
        for file in &files {
            extractor.items(file.module.clone(), &file.ast.items);
        }
        let types = extractor.finish();

        info!(
            "Extracted {} type(s) from {} file(s) of crate {}",
            types.len(),
            files.len(),
            krate.name
        );

        Ok(ModuleDescriptor {
            name: krate.name.clone(),
            version: manifest.version,
            references: manifest.references,
            types,
        })
    }

    fn read_manifest(&self) -> Result<Manifest, IntrospectError> {
        let path = self.root.join("Cargo.toml");
        let content = std::fs::read_to_string(&path).map_err(|source| IntrospectError::Io {
            path: path.clone(),
            source,
        })?;
        Manifest::parse(&path, &content)
    }

    fn discover_files(&self) -> Result<Vec<PathBuf>, IntrospectError> {
        let src = self.root.join("src");
        let patterns = self
            .exclude_patterns
            .iter()
            .map(|p| glob::Pattern::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        let mut builder = ignore::WalkBuilder::new(&src);
        builder.hidden(false).git_ignore(true);

        let mut files = Vec::new();
        for entry in builder.build() {
            let entry = entry.map_err(|source| IntrospectError::Walk {
                path: src.clone(),
                source,
            })?;
            let path = entry.path();

            if !path.is_file() || !path.extension().is_some_and(|e| e == "rs") {
                continue;
            }

            let relative = path.strip_prefix(&self.root).unwrap_or(path);
            if patterns.iter().any(|p| p.matches_path(relative)) {
                debug!("Excluding: {}", relative.display());
                continue;
            }

            files.push(path.to_path_buf());
        }

        files.sort();
        Ok(files)
    }

    fn parse_files(&self, paths: &[PathBuf]) -> Result<Vec<ParsedFile>, IntrospectError> {
        let src = self.root.join("src");
        let mut files = Vec::with_capacity(paths.len());

        for path in paths {
            let content = std::fs::read_to_string(path).map_err(|source| IntrospectError::Io {
                path: path.clone(),
                source,
            })?;
            match syn::parse_file(&content) {
                Ok(ast) => {
                    let relative = path.strip_prefix(&src).unwrap_or(path);
                    files.push(ParsedFile {
                        module: module_path_of(relative),
                        ast,
                    });
                }
                Err(e) => {
                    warn!("Failed to parse {}: {}", path.display(), e);
                    if self.fail_on_parse_error {
                        return Err(IntrospectError::Parse {
                            path: path.clone(),
                            message: e.to_string(),
                        });
                    }
                }
            }
        }

        Ok(files)
    }
}

impl ModuleIntrospector for SourceIntrospector {
    fn load(&self) -> Result<Vec<ModuleDescriptor>, IntrospectError> {
        Ok(vec![self.introspect()?])
    }
}

struct ParsedFile {
    module: Vec<String>,
    ast: syn::File,
}

/// The parts of `Cargo.toml` the model needs.
#[derive(Debug)]
struct Manifest {
    name: String,
    version: Option<String>,
    references: Vec<ModuleReference>,
}

impl Manifest {
    fn parse(path: &Path, content: &str) -> Result<Self, IntrospectError> {
        let invalid = |message: String| IntrospectError::Manifest {
            path: path.to_path_buf(),
            message,
        };

        let table: toml::Table = toml::from_str(content).map_err(|e| invalid(e.to_string()))?;
        let package = table
            .get("package")
            .and_then(toml::Value::as_table)
            .ok_or_else(|| invalid("missing [package] table".to_string()))?;
        let name = package
            .get("name")
            .and_then(toml::Value::as_str)
            .ok_or_else(|| invalid("missing package.name".to_string()))?;
        let version = package
            .get("version")
            .and_then(toml::Value::as_str)
            .map(String::from);

        let references = table
            .get("dependencies")
            .and_then(toml::Value::as_table)
            .map(|deps| {
                deps.iter()
                    .map(|(key, spec)| dependency(key, spec))
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            name: name.to_string(),
            version,
            references,
        })
    }
}

fn dependency(key: &str, spec: &toml::Value) -> ModuleReference {
    match spec {
        toml::Value::String(version) => ModuleReference {
            name: key.to_string(),
            version: Some(version.clone()),
        },
        toml::Value::Table(t) => ModuleReference {
            name: t
                .get("package")
                .and_then(toml::Value::as_str)
                .unwrap_or(key)
                .to_string(),
            version: t.get("version").and_then(toml::Value::as_str).map(String::from),
        },
        _ => ModuleReference::new(key),
    }
}

/// First pass: records modules and type names.
fn declare(krate: &mut CrateScope, module: &[String], items: &[syn::Item]) {
    for item in items {
        let ident = match item {
            syn::Item::Struct(s) => &s.ident,
            syn::Item::Enum(e) => &e.ident,
            syn::Item::Union(u) => &u.ident,
            syn::Item::Trait(t) => &t.ident,
            syn::Item::Mod(m) if !has_cfg_test(&m.attrs) => {
                let mut child = module.to_vec();
                child.push(m.ident.to_string());
                krate.declare_module(child.clone());
                if let Some((_, items)) = &m.content {
                    declare(krate, &child, items);
                }
                continue;
            }
            _ => continue,
        };
        krate.declare_type(module, ident.to_string());
    }
}

/// Members and interfaces contributed by one `impl` block.
struct ImplPart {
    target: TypeName,
    interface: Option<TypeRef>,
    members: Vec<Member>,
}

/// Second pass: builds descriptors.
struct Extractor<'a> {
    krate: &'a CrateScope,
    types: Vec<TypeDescriptor>,
    impls: Vec<ImplPart>,
}

impl<'a> Extractor<'a> {
    fn new(krate: &'a CrateScope) -> Self {
        Self {
            krate,
            types: Vec::new(),
            impls: Vec::new(),
        }
    }

    fn items(&mut self, module: Vec<String>, items: &[syn::Item]) {
        let krate = self.krate;
        let scope = ModuleScope::new(krate, module, items);

        for item in items {
            match item {
                syn::Item::Struct(s) => {
                    let fields = named_fields(&s.fields, None);
                    self.data_type(&scope, &s.ident, &s.vis, &s.attrs, &s.generics, fields);
                }
                syn::Item::Enum(e) => {
                    let fields = e
                        .variants
                        .iter()
                        .flat_map(|v| named_fields(&v.fields, Some(&v.ident)))
                        .collect();
                    self.data_type(&scope, &e.ident, &e.vis, &e.attrs, &e.generics, fields);
                }
                syn::Item::Union(u) => {
                    let fields = u
                        .fields
                        .named
                        .iter()
                        .map(|f| (field_name(f, 0), &f.ty))
                        .collect();
                    self.data_type(&scope, &u.ident, &u.vis, &u.attrs, &u.generics, fields);
                }
                syn::Item::Trait(t) => self.interface(&scope, t),
                syn::Item::Impl(i) => self.implementation(&scope, i),
                syn::Item::Mod(m) if !has_cfg_test(&m.attrs) => {
                    if let Some((_, inner)) = &m.content {
                        let mut child = scope.path().to_vec();
                        child.push(m.ident.to_string());
                        self.items(child, inner);
                    }
                }
                _ => {}
            }
        }
    }

    fn descriptor(
        &self,
        scope: &ModuleScope<'_>,
        ident: &syn::Ident,
        kind: TypeKind,
        vis: &syn::Visibility,
        attrs: &[syn::Attribute],
        generics: &syn::Generics,
    ) -> (TypeDescriptor, ItemScope) {
        let name = self.krate.type_name(scope.path(), &ident.to_string());
        let item = ItemScope {
            self_type: Some(TypeRef::named(self.krate.name.clone(), name.clone())),
            ..ItemScope::default()
        }
        .with_generics(generics);

        let mut ty = TypeDescriptor::new(self.krate.name.clone(), name, kind)
            .with_access(access_level(vis))
            .with_generic_parameters(item.generics.clone());
        ty.attributes = markers(attrs);
        (ty, item)
    }

    fn data_type(
        &mut self,
        scope: &ModuleScope<'_>,
        ident: &syn::Ident,
        vis: &syn::Visibility,
        attrs: &[syn::Attribute],
        generics: &syn::Generics,
        fields: Vec<(String, &syn::Type)>,
    ) {
        let kind = if derives(attrs, "PartialEq") {
            TypeKind::Record
        } else {
            TypeKind::Struct
        };
        let (mut ty, item) = self.descriptor(scope, ident, kind, vis, attrs, generics);

        for (name, field_ty) in fields {
            if let Some(resolved) = scope.resolve_type(field_ty, &item) {
                ty.members.push(Member::field(name, resolved));
            }
        }

        self.types.push(ty);
    }

    fn interface(&mut self, scope: &ModuleScope<'_>, t: &syn::ItemTrait) {
        let (mut ty, item) =
            self.descriptor(scope, &t.ident, TypeKind::Interface, &t.vis, &t.attrs, &t.generics);

        for bound in &t.supertraits {
            if let syn::TypeParamBound::Trait(b) = bound {
                if let Some(resolved) = scope.resolve_path(&b.path, &item) {
                    ty.interfaces.push(resolved);
                }
            }
        }

        for trait_item in &t.items {
            if let syn::TraitItem::Fn(f) = trait_item {
                ty.members.push(method(scope, &f.sig, &f.attrs, &item));
            }
        }

        self.types.push(ty);
    }

    fn implementation(&mut self, scope: &ModuleScope<'_>, imp: &syn::ItemImpl) {
        if has_cfg_test(&imp.attrs) {
            return;
        }

        let generics = ItemScope::default().with_generics(&imp.generics);
        let Some(TypeRef::Named(target)) = scope.resolve_type(&imp.self_ty, &generics) else {
            return;
        };
        if target.module != self.krate.name {
            debug!("Skipping impl for foreign type {}", target.name);
            return;
        }

        let item = ItemScope {
            self_type: Some(TypeRef::Named(target.clone())),
            ..generics
        };
        let interface = match &imp.trait_ {
            Some((None, path, _)) => scope.resolve_path(path, &item),
            Some((Some(_), _, _)) => return,
            None => None,
        };
        let implemented = interface.as_ref().and_then(TypeRef::as_named).cloned();

        let members = imp
            .items
            .iter()
            .filter_map(|i| match i {
                syn::ImplItem::Fn(f) => Some(f),
                _ => None,
            })
            .map(|f| {
                let member = method(scope, &f.sig, &f.attrs, &item);
                match &implemented {
                    Some(i) => member.implementing(i.clone()),
                    None => member,
                }
            })
            .collect();

        self.impls.push(ImplPart {
            target: target.name,
            interface,
            members,
        });
    }

    /// Attaches impl blocks to their types, in declaration order.
    fn finish(mut self) -> Vec<TypeDescriptor> {
        let positions: HashMap<TypeName, usize> = self
            .types
            .iter()
            .enumerate()
            .map(|(i, t)| (t.name.clone(), i))
            .collect();

        for part in self.impls {
            let Some(&pos) = positions.get(&part.target) else {
                debug!("No declaration found for impl target {}", part.target);
                continue;
            };
            let ty = &mut self.types[pos];
            if let Some(interface) = part.interface {
                if !ty.interfaces.contains(&interface) {
                    ty.interfaces.push(interface);
                }
            }
            ty.members.extend(part.members);
        }

        self.types
    }
}

/// Converts a function signature into a member.
///
/// An associated function without receiver that returns `Self` is a
/// constructor.
fn method(
    scope: &ModuleScope<'_>,
    sig: &syn::Signature,
    attrs: &[syn::Attribute],
    item: &ItemScope,
) -> Member {
    let item = item.clone().with_generics(&sig.generics);

    let parameters = sig
        .inputs
        .iter()
        .filter_map(|arg| match arg {
            syn::FnArg::Typed(t) => Some(
                scope
                    .resolve_type(&t.ty, &item)
                    .unwrap_or_else(|| TypeRef::generic(UNNAMED_PARAMETER)),
            ),
            syn::FnArg::Receiver(_) => None,
        })
        .collect();

    let return_type = match &sig.output {
        syn::ReturnType::Type(_, ty) => scope.resolve_type(ty, &item),
        syn::ReturnType::Default => None,
    };

    let name = sig.ident.to_string();
    let is_constructor = sig.receiver().is_none()
        && return_type.is_some()
        && return_type.as_ref() == item.self_type.as_ref();

    let mut member = if is_constructor {
        let mut ctor = Member::constructor(parameters);
        ctor.name = name;
        ctor
    } else {
        Member::method(name, parameters, return_type)
    };
    member.attributes = markers(attrs);
    member
}

fn field_name(field: &syn::Field, index: usize) -> String {
    field
        .ident
        .as_ref()
        .map_or_else(|| index.to_string(), ToString::to_string)
}

fn named_fields<'f>(
    fields: &'f syn::Fields,
    variant: Option<&syn::Ident>,
) -> Vec<(String, &'f syn::Type)> {
    fields
        .iter()
        .enumerate()
        .map(|(i, f)| {
            let name = field_name(f, i);
            let name = match variant {
                Some(v) => format!("{v}.{name}"),
                None => name,
            };
            (name, &f.ty)
        })
        .collect()
}
