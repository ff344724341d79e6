//! Shared fixtures for validator tests.

use archgraph_core::{
    Analyzer, Member, ModuleDescriptor, ModuleReference, TypeDescriptor, TypeKind, TypeRef,
    Validator, Violation,
};

fn class(name: &str) -> TypeDescriptor {
    TypeDescriptor::new("App", name, TypeKind::Class)
}

fn salmon() -> TypeRef {
    TypeRef::named("App", "App.Salmon.Salmon")
}

/// The fish app: `Tuna` and friends reference `Salmon`, `Sardine` only
/// references its own namespace, and `DependsOnTuna` sits in the root.
pub fn fish_app() -> ModuleDescriptor {
    ModuleDescriptor::new("App")
        .with_reference(ModuleReference {
            name: "Newtonsoft.Json".into(),
            version: Some("13.0.0".into()),
        })
        .with_reference(ModuleReference::new("System.Runtime"))
        .with_type(class("App.Salmon.Salmon"))
        .with_type(class("App.Tuna.Tuna").with_member(Member::constructor(vec![salmon()])))
        .with_type(class("App.Tuna.TunaField").with_member(Member::field("salmon", salmon())))
        .with_type(class("App.Tuna.TunaProperty").with_member(Member::property("Salmon", salmon())))
        .with_type(
            class("App.Tuna.Atlantic.AtlanticTuna").with_member(Member::field("salmon", salmon())),
        )
        .with_type(class("App.Sardine.Sardine").with_member(Member::field(
            "cousin",
            TypeRef::named("App", "App.Sardine.Atlantic.AtlanticSardine"),
        )))
        .with_type(class("App.Sardine.Atlantic.AtlanticSardine"))
        .with_type(class("App.DependsOnTuna").with_member(Member::field(
            "tuna",
            TypeRef::named("App", "App.Tuna.Tuna"),
        )))
}

/// Runs one validator over `modules` with default options.
pub fn run<V: Validator + 'static>(validator: V, modules: Vec<ModuleDescriptor>) -> Vec<Violation> {
    Analyzer::builder()
        .modules(modules)
        .validator(validator)
        .build()
        .unwrap()
        .evaluate()
        .violations
}
