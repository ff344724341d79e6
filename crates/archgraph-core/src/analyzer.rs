//! Core analyzer for orchestrating rule evaluation.

use crate::config::{AnalysisOptions, ConfigurationError};
use crate::context::ValidationContext;
use crate::graph::{ReferenceCache, ReferenceGraph};
use crate::index::TypeIndex;
use crate::introspect::IntrospectError;
use crate::model::ModuleDescriptor;
use crate::synthetic::CompilerGeneratedHeuristic;
use crate::types::{ValidationReport, Violation, ViolationDiagnostic};
use crate::validator::{Validator, ValidatorBox};

use miette::Diagnostic;
use thiserror::Error;
use tracing::{debug, info};

/// Errors surfaced by [`Analyzer::should_be_valid`] and the runners built on it.
#[derive(Debug, Error, Diagnostic)]
pub enum ArchitectureError {
    /// At least one rule was violated.
    #[error("Invalid architecture: {} violation(s)", .report.violations.len())]
    #[diagnostic(
        code(archgraph::invalid_architecture),
        help("each related diagnostic names the offending type and what it references")
    )]
    Invalid {
        /// The full report, including every captured violation.
        report: ValidationReport,
        /// Per-violation diagnostics.
        #[related]
        diagnostics: Vec<ViolationDiagnostic>,
    },

    /// Module metadata could not be loaded.
    #[error(transparent)]
    #[diagnostic(code(archgraph::introspect))]
    Introspect(#[from] IntrospectError),

    /// Rule registration failed.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Configuration(#[from] ConfigurationError),
}

impl ArchitectureError {
    /// Wraps a failing report.
    #[must_use]
    pub fn invalid(report: ValidationReport) -> Self {
        let diagnostics = report.violations.iter().map(ViolationDiagnostic::from).collect();
        Self::Invalid {
            report,
            diagnostics,
        }
    }

    /// Violations carried by this error, if any.
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::Invalid { report, .. } => &report.violations,
            _ => &[],
        }
    }
}

/// Builder for configuring an [`Analyzer`].
#[derive(Default)]
pub struct AnalyzerBuilder {
    modules: Vec<ModuleDescriptor>,
    under_test: Vec<String>,
    validators: Vec<ValidatorBox>,
    options: Option<AnalysisOptions>,
    cache: Option<ReferenceCache>,
}

impl AnalyzerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a module for reference resolution.
    #[must_use]
    pub fn module(mut self, module: ModuleDescriptor) -> Self {
        self.modules.push(module);
        self
    }

    /// Loads several modules for reference resolution.
    #[must_use]
    pub fn modules<I>(mut self, modules: I) -> Self
    where
        I: IntoIterator<Item = ModuleDescriptor>,
    {
        self.modules.extend(modules);
        self
    }

    /// Marks a loaded module as under test.
    ///
    /// When no module is marked, every loaded module is under test.
    #[must_use]
    pub fn under_test(mut self, module: impl Into<String>) -> Self {
        let module = module.into();
        if !self.under_test.contains(&module) {
            self.under_test.push(module);
        }
        self
    }

    /// Adds a validator.
    #[must_use]
    pub fn validator<V: Validator + 'static>(mut self, validator: V) -> Self {
        self.validators.push(Box::new(validator));
        self
    }

    /// Adds a boxed validator.
    #[must_use]
    pub fn validator_box(mut self, validator: ValidatorBox) -> Self {
        self.validators.push(validator);
        self
    }

    /// Adds several boxed validators.
    #[must_use]
    pub fn validators<I>(mut self, validators: I) -> Self
    where
        I: IntoIterator<Item = ValidatorBox>,
    {
        self.validators.extend(validators);
        self
    }

    /// Sets analysis limits and heuristics.
    #[must_use]
    pub fn options(mut self, options: AnalysisOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Shares a reference cache instead of creating a fresh one.
    #[must_use]
    pub fn cache(mut self, cache: ReferenceCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Builds the analyzer.
    ///
    /// # Errors
    ///
    /// Returns an error if a compiler-generated name pattern is invalid.
    pub fn build(self) -> Result<Analyzer, ConfigurationError> {
        let options = self.options.unwrap_or_default();
        let heuristic = CompilerGeneratedHeuristic::from_options(&options)?;

        let under_test = if self.under_test.is_empty() {
            self.modules.iter().map(|m| m.name.clone()).collect()
        } else {
            self.under_test
        };

        // Stable sort keeps registration order within a stage.
        let mut validators = self.validators;
        validators.sort_by_key(|v| v.kind());

        Ok(Analyzer {
            index: TypeIndex::new(self.modules),
            under_test,
            validators,
            options,
            heuristic,
            cache: self.cache.unwrap_or_default(),
        })
    }
}

/// Evaluates validators over a fixed set of loaded modules.
///
/// Use [`Analyzer::builder()`] to construct an instance.
pub struct Analyzer {
    index: TypeIndex,
    under_test: Vec<String>,
    validators: Vec<ValidatorBox>,
    options: AnalysisOptions,
    heuristic: CompilerGeneratedHeuristic,
    cache: ReferenceCache,
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("index", &self.index)
            .field("under_test", &self.under_test)
            .field(
                "validators",
                &self.validators.iter().map(|v| v.name()).collect::<Vec<_>>(),
            )
            .field("options", &self.options)
            .field("heuristic", &self.heuristic)
            .field("cache", &self.cache)
            .finish()
    }
}

impl Analyzer {
    /// Creates a new builder for configuring an analyzer.
    #[must_use]
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    /// All loaded types.
    #[must_use]
    pub fn index(&self) -> &TypeIndex {
        &self.index
    }

    /// The reference cache used by this analyzer.
    #[must_use]
    pub fn cache(&self) -> &ReferenceCache {
        &self.cache
    }

    /// Analysis limits and heuristics in effect.
    #[must_use]
    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    /// Names of the modules under test.
    #[must_use]
    pub fn modules_under_test(&self) -> &[String] {
        &self.under_test
    }

    /// Returns the number of registered validators.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.validators.len()
    }

    /// A reference graph view over the loaded modules.
    #[must_use]
    pub fn graph(&self) -> ReferenceGraph<'_> {
        ReferenceGraph::new(&self.index, &self.cache, &self.options)
    }

    /// Context handed to validators.
    #[must_use]
    pub fn context(&self) -> ValidationContext<'_> {
        ValidationContext::new(
            &self.index,
            self.graph(),
            &self.options,
            &self.heuristic,
            &self.under_test,
        )
    }

    /// Runs every validator and returns the report without failing.
    ///
    /// Validators run stage by stage (namespace, module, dependency, shape).
    /// Once `max_violations` is reached at the end of a stage, later stages
    /// are skipped and the report is marked truncated.
    #[must_use]
    pub fn evaluate(&self) -> ValidationReport {
        let ctx = self.context();
        let mut report = ValidationReport {
            types_checked: ctx.types_under_test().count(),
            ..ValidationReport::new()
        };

        info!(
            "Evaluating {} rule(s) over {} type(s)",
            self.validators.len(),
            report.types_checked
        );

        let mut stages = self.validators.chunk_by(|a, b| a.kind() == b.kind()).peekable();
        while let Some(stage) = stages.next() {
            for validator in stage {
                let found = validator.validate(&ctx);
                debug!(
                    "{} [{}]: {} violation(s)",
                    validator.name(),
                    validator.code(),
                    found.len()
                );
                report.violations.extend(found);
                report.rules_evaluated += 1;
            }

            if stages.peek().is_some() && report.violations.len() >= self.options.max_violations {
                debug!("Violation limit {} reached", self.options.max_violations);
                report.truncated = true;
                break;
            }
        }

        info!(
            "Evaluation complete: {} violation(s), {} cached reference set(s)",
            report.violations.len(),
            self.cache.len()
        );

        report
    }

    /// Runs every validator and fails if any violation is found.
    ///
    /// # Errors
    ///
    /// Returns [`ArchitectureError::Invalid`] carrying every captured
    /// violation.
    pub fn should_be_valid(&self) -> Result<ValidationReport, ArchitectureError> {
        let report = self.evaluate();
        if report.is_valid() {
            Ok(report)
        } else {
            Err(ArchitectureError::invalid(report))
        }
    }
}
