//! Compiler-generated artifact detection.
//!
//! This is a heuristic. Synthetic naming conventions are toolchain specific
//! (`<>c__DisplayClass` closures on .NET, `{{closure}}` in Rust symbol
//! names), so both markers and patterns come from [`AnalysisOptions`] and
//! should be revisited per target toolchain.

use crate::config::{compile_pattern, AnalysisOptions, ConfigurationError};
use crate::index::TypeIndex;
use crate::model::{TypeDescriptor, TypeName};
use regex::Regex;
use std::collections::HashSet;

/// Compiled compiler-generated predicate.
#[derive(Debug, Clone)]
pub struct CompilerGeneratedHeuristic {
    markers: Vec<TypeName>,
    patterns: Vec<Regex>,
}

impl CompilerGeneratedHeuristic {
    /// Compiles markers and name patterns from the analysis options.
    ///
    /// # Errors
    ///
    /// Returns an error if a name pattern is not a valid regex.
    pub fn from_options(options: &AnalysisOptions) -> Result<Self, ConfigurationError> {
        let patterns = options
            .compiler_generated_patterns
            .iter()
            .map(|p| compile_pattern(p))
            .collect::<Result<Vec<_>, _>>()?;
        let markers = options
            .compiler_generated_markers
            .iter()
            .map(|m| TypeName::parse(m))
            .collect();
        Ok(Self { markers, patterns })
    }

    /// Whether `ty` was synthesized by a toolchain.
    ///
    /// True when the type carries a synthetic marker, its simple name matches
    /// a synthetic naming pattern, or any enclosing type is itself
    /// compiler-generated.
    #[must_use]
    pub fn is_compiler_generated(&self, ty: &TypeDescriptor, index: &TypeIndex) -> bool {
        let mut visited = HashSet::new();
        let mut current = Some(ty);

        while let Some(ty) = current {
            if !visited.insert(ty.name.clone()) {
                return false;
            }
            if self.is_synthetic(ty) {
                return true;
            }
            current = ty.declaring_type.as_ref().and_then(|d| index.find(d));
        }

        false
    }

    fn is_synthetic(&self, ty: &TypeDescriptor) -> bool {
        self.markers.iter().any(|m| ty.has_attribute(m))
            || self.patterns.iter().any(|p| p.is_match(ty.name.name()))
    }
}
