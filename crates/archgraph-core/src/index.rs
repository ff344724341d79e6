//! Lookup and assignability over all loaded modules.

use crate::model::{ModuleDescriptor, NamedType, TypeDescriptor, TypeKey, TypeName};
use std::collections::{BTreeSet, HashMap, VecDeque};

/// Index over the types of every loaded module.
///
/// Types are enumerated in module order, then declaration order, which makes
/// every validator's output deterministic.
#[derive(Debug, Default)]
pub struct TypeIndex {
    modules: Vec<ModuleDescriptor>,
    by_key: HashMap<TypeKey, (usize, usize)>,
    by_name: HashMap<TypeName, (usize, usize)>,
}

impl TypeIndex {
    /// Builds an index. Modules are normalised on the way in.
    #[must_use]
    pub fn new(modules: Vec<ModuleDescriptor>) -> Self {
        let modules: Vec<ModuleDescriptor> =
            modules.into_iter().map(ModuleDescriptor::normalized).collect();

        let mut by_key = HashMap::new();
        let mut by_name = HashMap::new();
        for (m, module) in modules.iter().enumerate() {
            for (t, ty) in module.types.iter().enumerate() {
                by_key.entry(ty.key()).or_insert((m, t));
                by_name.entry(ty.name.clone()).or_insert((m, t));
            }
        }

        Self {
            modules,
            by_key,
            by_name,
        }
    }

    /// All loaded modules.
    #[must_use]
    pub fn modules(&self) -> &[ModuleDescriptor] {
        &self.modules
    }

    /// Looks up a module by name.
    #[must_use]
    pub fn module(&self, name: &str) -> Option<&ModuleDescriptor> {
        self.modules.iter().find(|m| m.name == name)
    }

    /// All types, in enumeration order.
    pub fn types(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.modules.iter().flat_map(|m| m.types.iter())
    }

    /// Number of indexed types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    /// Whether no types are indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    fn at(&self, (m, t): (usize, usize)) -> &TypeDescriptor {
        &self.modules[m].types[t]
    }

    /// Looks up a type by graph identity.
    #[must_use]
    pub fn get(&self, key: &TypeKey) -> Option<&TypeDescriptor> {
        self.by_key.get(key).map(|&pos| self.at(pos))
    }

    /// Looks up a type by name, in any module.
    #[must_use]
    pub fn find(&self, name: &TypeName) -> Option<&TypeDescriptor> {
        self.by_name.get(name).map(|&pos| self.at(pos))
    }

    /// Resolves a reference to its definition, preferring the exact module.
    #[must_use]
    pub fn resolve(&self, named: &NamedType) -> Option<&TypeDescriptor> {
        self.get(&named.key()).or_else(|| self.find(&named.name))
    }

    /// Whether `name` is a known interface.
    #[must_use]
    pub fn is_interface(&self, name: &TypeName) -> bool {
        self.find(name).is_some_and(TypeDescriptor::is_interface)
    }

    /// Every base type and interface `ty` derives from, transitively.
    ///
    /// Generic instantiations are reported by their definition name. Unknown
    /// (not loaded) supertypes are included but not expanded further.
    #[must_use]
    pub fn supertypes(&self, ty: &TypeDescriptor) -> BTreeSet<TypeName> {
        let mut seen = BTreeSet::new();
        let mut queue: VecDeque<&NamedType> = direct_supertypes(ty).collect();

        while let Some(next) = queue.pop_front() {
            if !seen.insert(next.name.clone()) {
                continue;
            }
            if let Some(resolved) = self.resolve(next) {
                queue.extend(direct_supertypes(resolved));
            }
        }

        seen
    }

    /// Whether `ty` is `target` or derives from it.
    #[must_use]
    pub fn is_assignable_to(&self, ty: &TypeDescriptor, target: &TypeName) -> bool {
        ty.name == *target || self.supertypes(ty).contains(target)
    }

    /// Like [`is_assignable_to`](Self::is_assignable_to) for a graph node
    /// that may not be loaded.
    #[must_use]
    pub fn is_key_assignable_to(&self, key: &TypeKey, target: &TypeName) -> bool {
        match self.get(key) {
            Some(ty) => self.is_assignable_to(ty, target),
            None => key.name == *target,
        }
    }

    /// The closed instantiation of `definition` that `ty` implements,
    /// searching inherited interfaces too.
    #[must_use]
    pub fn find_instantiation<'a>(
        &'a self,
        ty: &'a TypeDescriptor,
        definition: &TypeName,
    ) -> Option<&'a NamedType> {
        let mut visited = BTreeSet::new();
        let mut queue: VecDeque<&TypeDescriptor> = VecDeque::from([ty]);

        while let Some(current) = queue.pop_front() {
            if !visited.insert(current.key()) {
                continue;
            }
            for named in direct_supertypes(current) {
                if named.name == *definition {
                    return Some(named);
                }
                if let Some(resolved) = self.resolve(named) {
                    queue.push_back(resolved);
                }
            }
        }

        None
    }

    /// Concrete (non-interface) types assignable to `target`.
    pub fn implementers_of<'a>(
        &'a self,
        target: &'a TypeName,
    ) -> impl Iterator<Item = &'a TypeDescriptor> + 'a {
        self.types()
            .filter(move |t| !t.is_interface() && self.is_assignable_to(t, target))
    }
}

fn direct_supertypes(ty: &TypeDescriptor) -> impl Iterator<Item = &NamedType> {
    ty.base_type
        .iter()
        .chain(ty.interfaces.iter())
        .filter_map(|r| r.as_named())
}
