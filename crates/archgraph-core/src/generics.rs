//! Interface-to-implementation method mapping.
//!
//! Signatures are compared structurally: names must be equal, arity must be
//! equal, and parameter types must be equal except where the interface's
//! parameter is (or contains) a generic placeholder, which matches anything.

use crate::index::TypeIndex;
use crate::model::{Member, TypeDescriptor, TypeName, TypeRef};
use std::collections::BTreeSet;

/// Whether `candidate` matches the interface method `open`.
#[must_use]
pub fn signature_matches(open: &Member, candidate: &Member) -> bool {
    open.name == candidate.name
        && open.parameters.len() == candidate.parameters.len()
        && open
            .parameters
            .iter()
            .zip(&candidate.parameters)
            .all(|(o, c)| type_matches(o, c))
}

fn type_matches(open: &TypeRef, candidate: &TypeRef) -> bool {
    match (open, candidate) {
        (TypeRef::Generic { .. }, _) => true,
        (TypeRef::Named(o), TypeRef::Named(c)) => {
            o.name == c.name
                && o.args.len() == c.args.len()
                && o.args.iter().zip(&c.args).all(|(a, b)| type_matches(a, b))
        }
        (TypeRef::Named(_), TypeRef::Generic { .. }) => false,
    }
}

/// Maps `method`, declared on `interface`, to the member of `ty` that
/// implements it.
///
/// Returns `None` when `ty` does not implement any instantiation of
/// `interface` or has no matching member. A miss is not an error; the
/// caller decides what "not implemented" means.
#[must_use]
pub fn find_implementing_method<'a>(
    ty: &'a TypeDescriptor,
    interface: &TypeName,
    method: &Member,
    index: &'a TypeIndex,
) -> Option<&'a Member> {
    index.find_instantiation(ty, interface)?;

    let mut visited = BTreeSet::new();
    let mut current = Some(ty);
    while let Some(owner) = current {
        if !visited.insert(owner.key()) {
            break;
        }

        let explicit = owner.methods().find(|m| {
            m.interface.as_ref().is_some_and(|i| i.name == *interface)
                && signature_matches(method, m)
        });
        let implicit = || {
            owner
                .methods()
                .find(|m| m.interface.is_none() && signature_matches(method, m))
        };
        if let Some(found) = explicit.or_else(implicit) {
            return Some(found);
        }

        current = owner
            .base_type
            .as_ref()
            .and_then(TypeRef::as_named)
            .and_then(|b| index.resolve(b));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Attribute, ModuleDescriptor, TypeKind};

    fn handle(param: TypeRef) -> Member {
        Member::method("Handle", vec![param], None)
    }

    fn fixture() -> TypeIndex {
        let module = ModuleDescriptor::new("App")
            .with_type(
                TypeDescriptor::new("App", "App.IHandler", TypeKind::Interface)
                    .with_generic_parameters(["T"])
                    .with_member(handle(TypeRef::generic("T"))),
            )
            .with_type(
                TypeDescriptor::new("App", "App.CreateHandler", TypeKind::Class)
                    .with_interface(
                        TypeRef::named("App", "App.IHandler")
                            .with_args(vec![TypeRef::named("App", "App.Create")]),
                    )
                    .with_member(
                        handle(TypeRef::named("App", "App.Create"))
                            .with_attribute(Attribute::new("App.TransactionalAttribute")),
                    ),
            )
            .with_type(
                TypeDescriptor::new("App", "App.DerivedHandler", TypeKind::Class)
                    .with_base(TypeRef::named("App", "App.CreateHandler")),
            )
            .with_type(
                TypeDescriptor::new("App", "App.Unrelated", TypeKind::Class)
                    .with_member(handle(TypeRef::named("App", "App.Create"))),
            );
        TypeIndex::new(vec![module])
    }

    #[test]
    fn generic_placeholder_is_a_wildcard() {
        let open = handle(TypeRef::generic("T"));
        assert!(signature_matches(&open, &handle(TypeRef::named("App", "App.X"))));

        let nested_open = handle(
            TypeRef::named("System", "System.List").with_args(vec![TypeRef::generic("T")]),
        );
        let nested = handle(
            TypeRef::named("System", "System.List")
                .with_args(vec![TypeRef::named("App", "App.X")]),
        );
        assert!(signature_matches(&nested_open, &nested));
    }

    #[test]
    fn concrete_parameters_must_be_equal() {
        let open = handle(TypeRef::named("App", "App.A"));
        assert!(!signature_matches(&open, &handle(TypeRef::named("App", "App.B"))));
        assert!(!signature_matches(
            &open,
            &Member::method("Handle", vec![], None)
        ));
        assert!(!signature_matches(
            &open,
            &Member::method("Other", vec![TypeRef::named("App", "App.A")], None)
        ));
    }

    #[test]
    fn resolves_implementation_through_closed_interface() {
        let index = fixture();
        let iface = index.find(&"App.IHandler".into()).unwrap();
        let open = iface.methods().next().unwrap();
        let ty = index.find(&"App.CreateHandler".into()).unwrap();

        let found = find_implementing_method(ty, &iface.name, open, &index).unwrap();
        assert!(found.has_attribute(&"App.TransactionalAttribute".into()));
    }

    #[test]
    fn resolves_inherited_implementation() {
        let index = fixture();
        let iface = index.find(&"App.IHandler".into()).unwrap();
        let open = iface.methods().next().unwrap();
        let ty = index.find(&"App.DerivedHandler".into()).unwrap();

        assert!(find_implementing_method(ty, &iface.name, open, &index).is_some());
    }

    #[test]
    fn non_implementer_is_a_miss() {
        let index = fixture();
        let iface = index.find(&"App.IHandler".into()).unwrap();
        let open = iface.methods().next().unwrap();
        let ty = index.find(&"App.Unrelated".into()).unwrap();

        assert!(find_implementing_method(ty, &iface.name, open, &index).is_none());
    }
}
