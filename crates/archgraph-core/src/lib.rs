//! # archgraph-core
//!
//! Type reference graph and evaluation engine for architecture conformance
//! checks.
//!
//! This crate provides:
//!
//! - the language-independent [model](crate::model) of modules, types and members
//! - [`ModuleIntrospector`] with a `syn`-based [`SourceIntrospector`] and a
//!   [`SnapshotIntrospector`] for metadata produced by external extractors
//! - [`ReferenceGraph`] with an injectable, concurrent [`ReferenceCache`]
//! - the [`Validator`] trait and the [`Analyzer`] that runs validators in
//!   pipeline order and aggregates [`Violation`]s
//!
//! ## Example
//!
//! ```ignore
//! use archgraph_core::{Analyzer, ModuleIntrospector, SourceIntrospector};
//!
//! let modules = SourceIntrospector::new("./crates/app").load()?;
//! let analyzer = Analyzer::builder()
//!     .modules(modules)
//!     .validator(MyValidator::new())
//!     .build()?;
//!
//! analyzer.should_be_valid()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analyzer;
mod config;
mod context;
mod generics;
mod graph;
mod index;
mod synthetic;
mod types;
mod validator;

/// Module metadata sources.
pub mod introspect;
pub mod model;
/// Helpers for turning `syn` syntax into model types.
pub mod utils;

pub use analyzer::{Analyzer, AnalyzerBuilder, ArchitectureError};
pub use config::{
    compile_pattern, AnalysisOptions, Config, ConfigError, ConfigurationError, ModuleSource,
};
pub use context::ValidationContext;
pub use generics::{find_implementing_method, signature_matches};
pub use graph::{CacheKey, ReferenceCache, ReferenceGraph, ReferenceSet};
pub use index::TypeIndex;
pub use introspect::{
    introspector_for, IntrospectError, ModuleIntrospector, SnapshotIntrospector, SourceIntrospector,
};
pub use model::{
    namespace_contains, AccessLevel, Attribute, Member, MemberKind, ModuleDescriptor,
    ModuleReference, NamedType, TypeDescriptor, TypeKey, TypeKind, TypeName, TypeRef,
};
pub use synthetic::CompilerGeneratedHeuristic;
pub use types::{RuleKind, Subject, ValidationReport, Violation, ViolationDiagnostic};
pub use validator::{Validator, ValidatorBox};
