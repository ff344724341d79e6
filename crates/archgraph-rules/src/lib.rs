//! # archgraph-rules
//!
//! Architecture validators and the fluent builder that registers them.
//!
//! ## Available Rules
//!
//! | Code | Name | Stage | Description |
//! |------|------|-------|-------------|
//! | AG001 | `namespace-no-inbound` | namespace | Types outside an isolated namespace must not reference in |
//! | AG002 | `namespace-no-outbound` | namespace | Types inside an isolated namespace must not reference out |
//! | AG010 | `forbidden-module-dependency` | module | Module references must not match a forbidden pattern |
//! | AG011 | `solution-module-dependency` | module | Solution modules follow their allow or forbid list |
//! | AG020 | `dependency-used-only` | dependency | Restricted types are referenced only by allowed types |
//! | AG030 | `type-shape` | shape | Record-ness, access, name and namespace of assignable types |
//! | AG031 | `method-attribute` | shape | Required markers on (implementing) methods |
//!
//! Stages run in the order above. Evaluation stops after a stage once the
//! violation limit is reached.
//!
//! ## Usage
//!
//! ```ignore
//! use archgraph_rules::ArchitectureBuilder;
//!
//! ArchitectureBuilder::for_module(module)
//!     .with_namespace_isolated("app.tuna")
//!     .with_dependency_used_only("app.tuna.Tuna", ["app.sardine.Sardine"], true)
//!     .should_be_valid()?;
//! ```
//!
//! The same rules can be declared in TOML, see [`declarative`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod builder;
mod catalog;
mod dependency;
mod module_deps;
mod namespace;
mod shape;

pub mod declarative;

#[cfg(test)]
mod testing;

pub use builder::{
    ArchitectureBuilder, MethodRuleBuilder, ModuleInSolutionBuilder, TypeRuleBuilder,
};
pub use catalog::{catalog, find_rule, RuleInfo};
pub use dependency::{DependencyUsedOnly, UsedOnlyRule};
pub use module_deps::{ForbiddenModuleDependency, SolutionModuleDependency, SolutionPolicy};
pub use namespace::{IsolatedNamespace, NamespaceNoInbound, NamespaceNoOutbound};
pub use shape::{MethodAttribute, MethodAttributes, MethodSelector, TypeShape, TypeShapes};

/// Re-export core types for convenience.
pub use archgraph_core::{
    ArchitectureError, ConfigurationError, RuleKind, ValidationReport, Validator, Violation,
};
