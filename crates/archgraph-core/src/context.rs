//! Context handed to validators.

use crate::config::AnalysisOptions;
use crate::graph::{ReferenceGraph, ReferenceSet};
use crate::index::TypeIndex;
use crate::model::{ModuleDescriptor, TypeDescriptor};
use crate::synthetic::CompilerGeneratedHeuristic;
use std::sync::Arc;

/// Everything a validator may read during one evaluation run.
///
/// The index spans every loaded module, so supertypes and referenced types
/// from reference-only modules still resolve; enumeration helpers only yield
/// the modules under test.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    /// All loaded types.
    pub index: &'a TypeIndex,
    /// Reference graph over `index`.
    pub graph: ReferenceGraph<'a>,
    /// Limits and heuristics.
    pub options: &'a AnalysisOptions,
    heuristic: &'a CompilerGeneratedHeuristic,
    under_test: &'a [String],
}

impl<'a> ValidationContext<'a> {
    /// Creates a new context.
    #[must_use]
    pub fn new(
        index: &'a TypeIndex,
        graph: ReferenceGraph<'a>,
        options: &'a AnalysisOptions,
        heuristic: &'a CompilerGeneratedHeuristic,
        under_test: &'a [String],
    ) -> Self {
        Self {
            index,
            graph,
            options,
            heuristic,
            under_test,
        }
    }

    /// Whether `module` is evaluated (as opposed to loaded for reference only).
    #[must_use]
    pub fn is_under_test(&self, module: &str) -> bool {
        self.under_test.iter().any(|m| m == module)
    }

    /// Modules under test, in load order.
    pub fn modules_under_test(&self) -> impl Iterator<Item = &'a ModuleDescriptor> + '_ {
        self.index
            .modules()
            .iter()
            .filter(|m| self.is_under_test(&m.name))
    }

    /// Types of the modules under test, in enumeration order.
    pub fn types_under_test(&self) -> impl Iterator<Item = &'a TypeDescriptor> + '_ {
        self.modules_under_test().flat_map(|m| m.types.iter())
    }

    /// Shorthand for [`ReferenceGraph::references`].
    #[must_use]
    pub fn references(&self, ty: &TypeDescriptor) -> Arc<ReferenceSet> {
        self.graph.references(ty)
    }

    /// Whether `ty` is a compiler-generated artifact.
    #[must_use]
    pub fn is_compiler_generated(&self, ty: &TypeDescriptor) -> bool {
        self.heuristic.is_compiler_generated(ty, self.index)
    }
}
