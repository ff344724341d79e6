//! Type reference graph.
//!
//! Edges are computed lazily per type and memoized in a [`ReferenceCache`].
//! Entries are keyed by type identity plus a fingerprint of everything the
//! computation reads (the descriptor and the root types), so a cache shared
//! between analyzers never serves a set computed from other metadata.
//! Entries are never invalidated; [`ReferenceCache::clear`] exists for test
//! isolation.

use crate::config::AnalysisOptions;
use crate::index::TypeIndex;
use crate::model::{MemberKind, TypeDescriptor, TypeKey, TypeRef};
use dashmap::DashMap;
use std::collections::BTreeSet;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::{Arc, OnceLock};
use tracing::trace;

/// Types referenced by one type, split by module boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceSet {
    /// References to types owned by the same module.
    pub internal: BTreeSet<TypeKey>,
    /// References to types owned by other modules.
    pub external: BTreeSet<TypeKey>,
}

impl ReferenceSet {
    /// All references, internal first.
    pub fn all(&self) -> impl Iterator<Item = &TypeKey> {
        self.internal.iter().chain(self.external.iter())
    }

    /// Total number of distinct references.
    #[must_use]
    pub fn len(&self) -> usize {
        self.internal.len() + self.external.len()
    }

    /// Whether the type references nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.internal.is_empty() && self.external.is_empty()
    }
}

/// Cache identity of one reference set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Graph node the set belongs to.
    pub ty: TypeKey,
    /// Hash of the inputs the set was computed from.
    pub fingerprint: u64,
}

impl CacheKey {
    /// Key for `ty` as described by `descriptor` under `options`.
    #[must_use]
    pub fn of(descriptor: &TypeDescriptor, options: &AnalysisOptions) -> Self {
        let mut hasher = DefaultHasher::new();
        options.root_types.hash(&mut hasher);
        descriptor.hash(&mut hasher);
        Self {
            ty: descriptor.key(),
            fingerprint: hasher.finish(),
        }
    }
}

/// Concurrent memo of reference sets, keyed by [`CacheKey`].
///
/// Cloning is cheap and shares the underlying map. Writes use
/// insert-if-absent: the first stored value for a key wins and is immutable
/// afterwards. Equal keys come from equal inputs, so recomputing a key
/// yields an equal value and racing writers are harmless.
#[derive(Debug, Clone, Default)]
pub struct ReferenceCache {
    entries: Arc<DashMap<CacheKey, Arc<ReferenceSet>>>,
}

impl ReferenceCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide cache shared by every caller that opts into it.
    #[must_use]
    pub fn shared() -> Self {
        static SHARED: OnceLock<ReferenceCache> = OnceLock::new();
        SHARED.get_or_init(Self::new).clone()
    }

    /// Returns the cached set for `key`, if computed.
    #[must_use]
    pub fn get(&self, key: &CacheKey) -> Option<Arc<ReferenceSet>> {
        self.entries.get(key).map(|e| Arc::clone(e.value()))
    }

    /// Stores `set` unless `key` already has a value, and returns the stored value.
    pub fn insert_if_absent(&self, key: CacheKey, set: ReferenceSet) -> Arc<ReferenceSet> {
        let entry = self.entries.entry(key).or_insert_with(|| Arc::new(set));
        Arc::clone(entry.value())
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.entries.clear();
    }
}

/// Reference graph over a [`TypeIndex`].
#[derive(Debug, Clone, Copy)]
pub struct ReferenceGraph<'a> {
    index: &'a TypeIndex,
    cache: &'a ReferenceCache,
    options: &'a AnalysisOptions,
}

impl<'a> ReferenceGraph<'a> {
    /// Creates a graph view.
    #[must_use]
    pub fn new(index: &'a TypeIndex, cache: &'a ReferenceCache, options: &'a AnalysisOptions) -> Self {
        Self {
            index,
            cache,
            options,
        }
    }

    /// The index this graph reads from.
    #[must_use]
    pub fn index(&self) -> &'a TypeIndex {
        self.index
    }

    /// Returns the types `ty` references, computing them on first use.
    ///
    /// Sources are the base type (unless it is a root type), implemented
    /// interfaces, field and property types, constructor parameters, and
    /// method parameters and return types declared directly on `ty`. Generic
    /// arguments are references too. Self references are dropped.
    #[must_use]
    pub fn references(&self, ty: &TypeDescriptor) -> Arc<ReferenceSet> {
        let key = CacheKey::of(ty, self.options);
        if let Some(hit) = self.cache.get(&key) {
            trace!(ty = %key.ty, "reference cache hit");
            return hit;
        }

        trace!(ty = %key.ty, "computing references");
        let set = self.compute(ty);
        self.cache.insert_if_absent(key, set)
    }

    fn compute(&self, ty: &TypeDescriptor) -> ReferenceSet {
        let mut keys = Vec::new();

        if let Some(base) = &ty.base_type {
            let is_root = base
                .definition()
                .is_some_and(|n| self.options.is_root_type(&n.full_name()));
            if !is_root {
                base.collect_keys(&mut keys);
            }
        }

        for interface in &ty.interfaces {
            interface.collect_keys(&mut keys);
        }

        for member in &ty.members {
            let refs: Box<dyn Iterator<Item = &TypeRef>> = match member.kind {
                MemberKind::Field | MemberKind::Property => Box::new(member.value_type.iter()),
                MemberKind::Constructor => Box::new(member.parameters.iter()),
                MemberKind::Method => Box::new(member.signature()),
            };
            for r in refs {
                r.collect_keys(&mut keys);
            }
        }

        let own = ty.key();
        let mut set = ReferenceSet::default();
        for key in keys {
            if key == own {
                continue;
            }
            if key.module == ty.module {
                set.internal.insert(key);
            } else {
                set.external.insert(key);
            }
        }
        set
    }

    /// Resolves a graph node to its descriptor when the owning module is loaded.
    #[must_use]
    pub fn descriptor(&self, key: &TypeKey) -> Option<&'a TypeDescriptor> {
        self.index.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Member, ModuleDescriptor, TypeKind};

    fn fixture() -> TypeIndex {
        let app = ModuleDescriptor::new("App")
            .with_type(TypeDescriptor::new("App", "App.Salmon.Salmon", TypeKind::Class))
            .with_type(
                TypeDescriptor::new("App", "App.Tuna.Tuna", TypeKind::Class)
                    .with_base(TypeRef::named("System", "System.Object"))
                    .with_member(Member::constructor(vec![TypeRef::named(
                        "App",
                        "App.Salmon.Salmon",
                    )]))
                    .with_member(Member::method(
                        "Clone",
                        vec![],
                        Some(TypeRef::named("App", "App.Tuna.Tuna")),
                    ))
                    .with_member(Member::field(
                        "cans",
                        TypeRef::named("System", "System.Collections.Generic.List")
                            .with_args(vec![TypeRef::named("App", "App.Sardine.Sardine")]),
                    )),
            )
            .with_type(TypeDescriptor::new("App", "App.Sardine.Sardine", TypeKind::Class));
        TypeIndex::new(vec![app])
    }

    #[test]
    fn splits_internal_and_external() {
        let index = fixture();
        let cache = ReferenceCache::new();
        let options = AnalysisOptions::default();
        let graph = ReferenceGraph::new(&index, &cache, &options);

        let tuna = index.find(&"App.Tuna.Tuna".into()).unwrap();
        let refs = graph.references(tuna);

        let internal: Vec<String> = refs.internal.iter().map(ToString::to_string).collect();
        let external: Vec<String> = refs.external.iter().map(ToString::to_string).collect();
        assert_eq!(internal, vec!["App.Salmon.Salmon", "App.Sardine.Sardine"]);
        assert_eq!(external, vec!["System.Collections.Generic.List"]);
    }

    #[test]
    fn root_type_is_skipped_only_as_base() {
        let module = ModuleDescriptor::new("App").with_type(
            TypeDescriptor::new("App", "App.Boxed", TypeKind::Class)
                .with_base(TypeRef::named("System", "System.Object"))
                .with_member(Member::field("value", TypeRef::named("System", "System.Object"))),
        );
        let index = TypeIndex::new(vec![module]);
        let cache = ReferenceCache::new();
        let options = AnalysisOptions::default();
        let graph = ReferenceGraph::new(&index, &cache, &options);

        let boxed = index.find(&"App.Boxed".into()).unwrap();
        let refs = graph.references(boxed);
        assert!(refs.external.contains(&TypeKey::new("System", "System.Object")));
        assert_eq!(refs.len(), 1);
    }

    #[test]
    fn repeated_queries_are_memoized_and_equal() {
        let index = fixture();
        let cache = ReferenceCache::new();
        let options = AnalysisOptions::default();
        let graph = ReferenceGraph::new(&index, &cache, &options);
        let tuna = index.find(&"App.Tuna.Tuna".into()).unwrap();

        let first = graph.references(tuna);
        let second = graph.references(tuna);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
        let third = graph.references(tuna);
        assert_eq!(*first, *third);
    }

    #[test]
    fn first_insert_wins() {
        let cache = ReferenceCache::new();
        let key = CacheKey {
            ty: TypeKey::new("App", "App.A"),
            fingerprint: 7,
        };
        let mut first = ReferenceSet::default();
        first.internal.insert(TypeKey::new("App", "App.B"));

        let stored = cache.insert_if_absent(key.clone(), first.clone());
        let again = cache.insert_if_absent(key, ReferenceSet::default());
        assert_eq!(*stored, first);
        assert_eq!(*again, first);
    }

    #[test]
    fn mutual_references_terminate() {
        let module = ModuleDescriptor::new("App")
            .with_type(
                TypeDescriptor::new("App", "App.A", TypeKind::Class)
                    .with_member(Member::field("b", TypeRef::named("App", "App.B"))),
            )
            .with_type(
                TypeDescriptor::new("App", "App.B", TypeKind::Class)
                    .with_member(Member::field("a", TypeRef::named("App", "App.A"))),
            );
        let index = TypeIndex::new(vec![module]);
        let cache = ReferenceCache::new();
        let options = AnalysisOptions::default();
        let graph = ReferenceGraph::new(&index, &cache, &options);

        for ty in index.types() {
            assert_eq!(graph.references(ty).internal.len(), 1);
        }
    }

    fn secret_holder(with_field: bool) -> TypeIndex {
        let mut service = TypeDescriptor::new("App", "App.Service", TypeKind::Class);
        if with_field {
            service = service.with_member(Member::field("secret", TypeRef::named("App", "App.Secret")));
        }
        TypeIndex::new(vec![ModuleDescriptor::new("App")
            .with_type(TypeDescriptor::new("App", "App.Secret", TypeKind::Class))
            .with_type(service)])
    }

    #[test]
    fn shared_cache_separates_same_named_modules() {
        let cache = ReferenceCache::new();
        let options = AnalysisOptions::default();

        let first = secret_holder(true);
        let graph = ReferenceGraph::new(&first, &cache, &options);
        let service = first.find(&"App.Service".into()).unwrap();
        assert_eq!(graph.references(service).len(), 1);

        let second = secret_holder(false);
        let graph = ReferenceGraph::new(&second, &cache, &options);
        let service = second.find(&"App.Service".into()).unwrap();
        assert!(graph.references(service).is_empty());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn shared_cache_separates_root_types() {
        let module = ModuleDescriptor::new("App")
            .with_type(TypeDescriptor::new("App", "App.Secret", TypeKind::Class))
            .with_type(
                TypeDescriptor::new("App", "App.Service", TypeKind::Class)
                    .with_base(TypeRef::named("App", "App.Secret")),
            );
        let index = TypeIndex::new(vec![module]);
        let service = index.find(&"App.Service".into()).unwrap();
        let cache = ReferenceCache::new();

        let no_roots = AnalysisOptions {
            root_types: vec![],
            ..AnalysisOptions::default()
        };
        let graph = ReferenceGraph::new(&index, &cache, &no_roots);
        assert_eq!(graph.references(service).len(), 1);

        let secret_is_root = AnalysisOptions {
            root_types: vec!["App.Secret".to_string()],
            ..AnalysisOptions::default()
        };
        let graph = ReferenceGraph::new(&index, &cache, &secret_is_root);
        assert!(graph.references(service).is_empty());
    }
}
