//! Fluent rule registration.
//!
//! [`ArchitectureBuilder`] collects rules for one module or a solution of
//! several modules and turns them into an [`Analyzer`].
//!
//! ```ignore
//! use archgraph_rules::ArchitectureBuilder;
//!
//! ArchitectureBuilder::for_module(app)
//!     .with_namespace_isolated("app.domain")
//!     .with_dependency_used_only("app.db.Pool", ["app.repo.Repository"], true)
//!     .with_module_forbidden_dependency("^openssl")
//!     .with_type("app.commands.Command", |t| t.is_record().with_name_ends_with("Command"))
//!     .should_be_valid()?;
//! ```
//!
//! Registration errors (bad patterns, conflicting solution policies,
//! unknown modules or method targets) are collected as they happen and
//! returned by [`build`](ArchitectureBuilder::build) before any type is
//! enumerated.

use crate::dependency::{DependencyUsedOnly, UsedOnlyRule};
use crate::module_deps::{ForbiddenModuleDependency, SolutionModuleDependency, SolutionPolicy};
use crate::namespace::{IsolatedNamespace, NamespaceNoInbound, NamespaceNoOutbound};
use crate::shape::{MethodAttribute, MethodAttributes, MethodSelector, TypeShape, TypeShapes};
use archgraph_core::{
    compile_pattern, introspector_for, AccessLevel, AnalysisOptions, Analyzer, ArchitectureError,
    Config, ConfigurationError, ModuleDescriptor, ReferenceCache, TypeIndex, TypeName,
    ValidationReport, ValidatorBox,
};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info};

/// Registers architecture rules for one module or a solution of modules.
#[derive(Debug, Default)]
pub struct ArchitectureBuilder {
    modules: Vec<ModuleDescriptor>,
    under_test: Vec<String>,
    no_inbound: NamespaceNoInbound,
    no_outbound: NamespaceNoOutbound,
    forbidden: ForbiddenModuleDependency,
    used_only: DependencyUsedOnly,
    types: Vec<TypeRuleBuilder>,
    solution: Vec<ModuleInSolutionBuilder>,
    options: AnalysisOptions,
    cache: Option<ReferenceCache>,
    errors: Vec<ConfigurationError>,
}

impl ArchitectureBuilder {
    /// Starts rules for a single module.
    #[must_use]
    pub fn for_module(module: ModuleDescriptor) -> Self {
        Self::default().with_module(module)
    }

    /// Starts rules for a solution. Every module is under test and counts
    /// as a solution module for [`module_in_solution`](Self::module_in_solution).
    #[must_use]
    pub fn for_modules<I>(modules: I) -> Self
    where
        I: IntoIterator<Item = ModuleDescriptor>,
    {
        modules.into_iter().fold(Self::default(), Self::with_module)
    }

    /// Adds a module under test.
    #[must_use]
    pub fn with_module(mut self, module: ModuleDescriptor) -> Self {
        if !self.under_test.contains(&module.name) {
            self.under_test.push(module.name.clone());
        }
        self.modules.push(module);
        self
    }

    /// Loads every `[[modules]]` entry of `config` and adopts its analysis
    /// options. Relative module paths resolve against `base_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if a module source is ambiguous or cannot be loaded.
    pub fn from_config(config: &Config, base_dir: &Path) -> Result<Self, ArchitectureError> {
        let mut builder = Self::default().with_options(config.analysis.clone());
        for (index, source) in config.modules.iter().enumerate() {
            let modules = introspector_for(source, index, base_dir)?.load()?;
            for module in modules {
                info!(
                    "Loaded module {} with {} type(s){}",
                    module.name,
                    module.types.len(),
                    if source.reference_only { " (reference only)" } else { "" }
                );
                builder = if source.reference_only {
                    builder.with_reference_module(module)
                } else {
                    builder.with_module(module)
                };
            }
        }
        Ok(builder)
    }

    /// Loads a module for reference resolution only.
    ///
    /// Its types resolve supertypes and method targets but are not checked
    /// themselves. With no module under test, every loaded module is.
    #[must_use]
    pub fn with_reference_module(mut self, module: ModuleDescriptor) -> Self {
        self.modules.push(module);
        self
    }

    /// Replaces the analysis limits and heuristics.
    #[must_use]
    pub fn with_options(mut self, options: AnalysisOptions) -> Self {
        self.options = options;
        self
    }

    /// Shares a reference cache between runs.
    #[must_use]
    pub fn with_cache(mut self, cache: ReferenceCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Names of the modules under test.
    #[must_use]
    pub fn modules_under_test(&self) -> &[String] {
        &self.under_test
    }

    /// Isolates `namespace` in both directions.
    #[must_use]
    pub fn with_namespace_isolated(self, namespace: &str) -> Self {
        self.with_namespace_no_inbound_dependencies(namespace)
            .with_namespace_no_outbound_dependencies(namespace)
    }

    /// Types outside `namespace` must not reference types inside it.
    #[must_use]
    pub fn with_namespace_no_inbound_dependencies(self, namespace: &str) -> Self {
        self.with_namespace_no_inbound_dependencies_except(namespace, std::iter::empty::<&str>())
    }

    /// Like [`with_namespace_no_inbound_dependencies`](Self::with_namespace_no_inbound_dependencies),
    /// but types in `except` may reference in.
    #[must_use]
    pub fn with_namespace_no_inbound_dependencies_except<I, S>(
        mut self,
        namespace: &str,
        except: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.no_inbound
            .push(IsolatedNamespace::new(namespace).with_exceptions(except));
        self
    }

    /// Types inside `namespace` must not reference types outside it.
    #[must_use]
    pub fn with_namespace_no_outbound_dependencies(self, namespace: &str) -> Self {
        self.with_namespace_no_outbound_dependencies_except(namespace, std::iter::empty::<&str>())
    }

    /// Like [`with_namespace_no_outbound_dependencies`](Self::with_namespace_no_outbound_dependencies),
    /// but references into `except` are allowed.
    #[must_use]
    pub fn with_namespace_no_outbound_dependencies_except<I, S>(
        mut self,
        namespace: &str,
        except: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.no_outbound
            .push(IsolatedNamespace::new(namespace).with_exceptions(except));
        self
    }

    /// Only `allowed` (or types assignable to them) may reference `target`.
    ///
    /// When `target` is an interface, the rule covers every type assignable
    /// to it.
    #[must_use]
    pub fn with_dependency_used_only<I, S>(
        mut self,
        target: &str,
        allowed: I,
        exclude_compiler_generated: bool,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rule = allowed
            .into_iter()
            .fold(UsedOnlyRule::new(TypeName::parse(target)), |rule, a| {
                rule.allowed_by(TypeName::parse(a.as_ref()))
            })
            .exclude_compiler_generated(exclude_compiler_generated);
        self.used_only.push(rule);
        self
    }

    /// Modules under test must not reference modules whose `name@version`
    /// matches `pattern`.
    #[must_use]
    pub fn with_module_forbidden_dependency(mut self, pattern: &str) -> Self {
        match compile_pattern(pattern) {
            Ok(regex) => self.forbidden.push(regex),
            Err(e) => self.errors.push(e),
        }
        self
    }

    /// Constrains every type assignable to `target`.
    #[must_use]
    pub fn with_type<F>(mut self, target: &str, configure: F) -> Self
    where
        F: FnOnce(TypeRuleBuilder) -> TypeRuleBuilder,
    {
        let mut rule = configure(TypeRuleBuilder::new(target));
        self.errors.append(&mut rule.errors);
        self.types.push(rule);
        self
    }

    /// Restricts which solution modules `module` may reference.
    #[must_use]
    pub fn module_in_solution<F>(mut self, module: &str, configure: F) -> Self
    where
        F: FnOnce(ModuleInSolutionBuilder) -> ModuleInSolutionBuilder,
    {
        self.solution
            .push(configure(ModuleInSolutionBuilder::new(module)));
        self
    }

    /// Builds the analyzer.
    ///
    /// # Errors
    ///
    /// Returns the first registration error.
    pub fn build(self) -> Result<Analyzer, ConfigurationError> {
        if let Some(err) = self.errors.into_iter().next() {
            return Err(err);
        }

        let mut validators: Vec<ValidatorBox> = Vec::new();
        if !self.no_inbound.is_empty() {
            validators.push(Box::new(self.no_inbound));
        }
        if !self.no_outbound.is_empty() {
            validators.push(Box::new(self.no_outbound));
        }
        if !self.forbidden.is_empty() {
            validators.push(Box::new(self.forbidden));
        }

        let mut solution = SolutionModuleDependency::new(&self.under_test);
        for module in self.solution {
            module.apply(&mut solution)?;
        }
        if !solution.is_empty() {
            validators.push(Box::new(solution));
        }

        if !self.used_only.is_empty() {
            validators.push(Box::new(self.used_only));
        }

        let mut shapes = TypeShapes::new();
        let mut methods = MethodAttributes::new();
        let needs_index = self.types.iter().any(|t| !t.methods.is_empty());
        let index = if needs_index {
            TypeIndex::new(self.modules.clone())
        } else {
            TypeIndex::default()
        };
        for rule in self.types {
            for method in &rule.methods {
                let resolved = MethodAttribute::new(&index, &rule.target, &method.selector)?;
                methods.push(
                    method
                        .required
                        .iter()
                        .cloned()
                        .fold(resolved, MethodAttribute::require),
                );
            }
            shapes.push(rule.shape);
        }
        if !shapes.is_empty() {
            validators.push(Box::new(shapes));
        }
        if !methods.is_empty() {
            validators.push(Box::new(methods));
        }

        debug!(
            "Registered {} validator(s) for {} module(s) under test",
            validators.len(),
            self.under_test.len()
        );

        let mut builder = Analyzer::builder()
            .modules(self.modules)
            .validators(validators)
            .options(self.options);
        for module in self.under_test {
            builder = builder.under_test(module);
        }
        if let Some(cache) = self.cache {
            builder = builder.cache(cache);
        }
        builder.build()
    }

    /// Evaluates every rule and returns the report without failing on
    /// violations.
    ///
    /// # Errors
    ///
    /// Returns a registration error, if any.
    pub fn evaluate(self) -> Result<ValidationReport, ConfigurationError> {
        Ok(self.build()?.evaluate())
    }

    /// Evaluates every rule and fails on the first registration error or
    /// on any violation.
    ///
    /// # Errors
    ///
    /// [`ArchitectureError::Configuration`] or [`ArchitectureError::Invalid`].
    pub fn should_be_valid(self) -> Result<ValidationReport, ArchitectureError> {
        self.build()?.should_be_valid()
    }
}

/// Constraints on the types assignable to one target.
#[derive(Debug)]
pub struct TypeRuleBuilder {
    target: TypeName,
    shape: TypeShape,
    methods: Vec<MethodRuleBuilder>,
    errors: Vec<ConfigurationError>,
}

impl TypeRuleBuilder {
    fn new(target: &str) -> Self {
        let target = TypeName::parse(target);
        Self {
            shape: TypeShape::new(target.clone()),
            target,
            methods: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Types must be record-shaped.
    #[must_use]
    pub fn is_record(mut self) -> Self {
        self.shape = self.shape.record(true);
        self
    }

    /// Types must not be record-shaped.
    #[must_use]
    pub fn is_not_record(mut self) -> Self {
        self.shape = self.shape.record(false);
        self
    }

    /// Simple names must match `pattern`.
    #[must_use]
    pub fn with_name_match(mut self, pattern: &str) -> Self {
        match compile_pattern(pattern) {
            Ok(regex) => self.shape = self.shape.name_pattern(regex),
            Err(e) => self.errors.push(e),
        }
        self
    }

    /// Simple names must end with `suffix`.
    #[must_use]
    pub fn with_name_ends_with(mut self, suffix: &str) -> Self {
        self.shape = self.shape.name_suffix(suffix);
        self
    }

    /// Namespaces must match `pattern`.
    #[must_use]
    pub fn with_namespace_match(mut self, pattern: &str) -> Self {
        match compile_pattern(pattern) {
            Ok(regex) => self.shape = self.shape.namespace_pattern(regex),
            Err(e) => self.errors.push(e),
        }
        self
    }

    /// Accepts `level`. Call repeatedly to accept several levels.
    #[must_use]
    pub fn with_access_level(mut self, level: AccessLevel) -> Self {
        self.shape = self.shape.access(level);
        self
    }

    /// Constrains a method declared on the target.
    ///
    /// When the target is an interface, the implementing method of each
    /// implementer is checked instead.
    #[must_use]
    pub fn with_method<S, F>(mut self, selector: S, configure: F) -> Self
    where
        S: Into<MethodSelector>,
        F: FnOnce(MethodRuleBuilder) -> MethodRuleBuilder,
    {
        self.methods.push(configure(MethodRuleBuilder {
            selector: selector.into(),
            required: Vec::new(),
        }));
        self
    }
}

/// Constraints on one method.
#[derive(Debug)]
pub struct MethodRuleBuilder {
    selector: MethodSelector,
    required: Vec<TypeName>,
}

impl MethodRuleBuilder {
    /// The method must carry the marker `attribute`.
    #[must_use]
    pub fn with_required_attribute(mut self, attribute: &str) -> Self {
        self.required.push(TypeName::parse(attribute));
        self
    }
}

/// Solution-scoped restrictions for one module.
#[derive(Debug)]
pub struct ModuleInSolutionBuilder {
    module: String,
    allowed: Option<BTreeSet<String>>,
    forbidden: Option<BTreeSet<String>>,
}

impl ModuleInSolutionBuilder {
    fn new(module: &str) -> Self {
        Self {
            module: module.to_string(),
            allowed: None,
            forbidden: None,
        }
    }

    /// The module may only reference these solution modules.
    #[must_use]
    pub fn with_allowed_solution_dependencies<I, S>(mut self, modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed
            .get_or_insert_with(BTreeSet::new)
            .extend(modules.into_iter().map(Into::into));
        self
    }

    /// The module must not reference these solution modules.
    #[must_use]
    pub fn with_forbidden_solution_dependencies<I, S>(mut self, modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.forbidden
            .get_or_insert_with(BTreeSet::new)
            .extend(modules.into_iter().map(Into::into));
        self
    }

    fn apply(self, solution: &mut SolutionModuleDependency) -> Result<(), ConfigurationError> {
        if let Some(allowed) = self.allowed {
            solution.policy(&self.module, SolutionPolicy::Allow(allowed))?;
        }
        if let Some(forbidden) = self.forbidden {
            solution.policy(&self.module, SolutionPolicy::Forbid(forbidden))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fish_app;
    use archgraph_core::{Member, ModuleReference, RuleKind, TypeDescriptor, TypeKind, TypeRef};

    fn codes(report: &ValidationReport) -> Vec<&str> {
        report.violations.iter().map(|v| v.code.as_str()).collect()
    }

    #[test]
    fn no_rules_is_valid() {
        let report = ArchitectureBuilder::for_module(fish_app())
            .should_be_valid()
            .unwrap();
        assert_eq!(report.rules_evaluated, 0);
        assert_eq!(report.types_checked, 8);
    }

    #[test]
    fn isolated_sardine_is_valid() {
        ArchitectureBuilder::for_module(fish_app())
            .with_namespace_isolated("App.Sardine")
            .should_be_valid()
            .unwrap();
    }

    #[test]
    fn isolated_tuna_fails_both_ways() {
        let err = ArchitectureBuilder::for_module(fish_app())
            .with_namespace_isolated("App.Tuna")
            .should_be_valid()
            .unwrap_err();
        let violations = err.violations();
        assert_eq!(violations.iter().filter(|v| v.code == "AG001").count(), 1);
        assert_eq!(violations.iter().filter(|v| v.code == "AG002").count(), 4);
    }

    #[test]
    fn inbound_exceptions_are_honoured() {
        ArchitectureBuilder::for_module(fish_app())
            .with_namespace_no_inbound_dependencies_except("App.Tuna", ["App"])
            .should_be_valid()
            .unwrap();
    }

    #[test]
    fn every_family_runs_in_pipeline_order() {
        let report = ArchitectureBuilder::for_module(fish_app())
            .with_type("App.Salmon.Salmon", |t| t.with_name_ends_with("Fish"))
            .with_dependency_used_only("App.Tuna.Tuna", ["App.Sardine.Sardine"], true)
            .with_module_forbidden_dependency("Newtonsoft")
            .with_namespace_no_inbound_dependencies("App.Tuna")
            .evaluate()
            .unwrap();

        assert_eq!(codes(&report), vec!["AG001", "AG010", "AG020", "AG030"]);
        let kinds: Vec<RuleKind> = report.violations.iter().map(|v| v.kind).collect();
        assert!(kinds.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn invalid_pattern_surfaces_before_evaluation() {
        let err = ArchitectureBuilder::for_module(fish_app())
            .with_module_forbidden_dependency("(")
            .should_be_valid()
            .unwrap_err();
        assert!(matches!(
            err,
            ArchitectureError::Configuration(ConfigurationError::InvalidPattern { .. })
        ));

        let err = ArchitectureBuilder::for_module(fish_app())
            .with_type("App.Tuna.Tuna", |t| t.with_namespace_match("["))
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidPattern { pattern, .. } if pattern == "["));
    }

    fn solution() -> Vec<ModuleDescriptor> {
        vec![
            ModuleDescriptor::new("domain"),
            ModuleDescriptor::new("infra").with_reference(ModuleReference::new("domain")),
            ModuleDescriptor::new("web")
                .with_reference(ModuleReference::new("domain"))
                .with_reference(ModuleReference::new("infra")),
        ]
    }

    #[test]
    fn solution_allow_list() {
        let err = ArchitectureBuilder::for_modules(solution())
            .module_in_solution("web", |m| m.with_allowed_solution_dependencies(["domain"]))
            .should_be_valid()
            .unwrap_err();
        assert_eq!(err.violations().len(), 1);
        assert_eq!(err.violations()[0].code, "AG011");
    }

    #[test]
    fn solution_forbid_list() {
        let report = ArchitectureBuilder::for_modules(solution())
            .module_in_solution("infra", |m| m.with_forbidden_solution_dependencies(["web"]))
            .should_be_valid()
            .unwrap();
        assert_eq!(report.rules_evaluated, 1);
    }

    #[test]
    fn solution_allow_and_forbid_conflict() {
        let err = ArchitectureBuilder::for_modules(solution())
            .module_in_solution("web", |m| {
                m.with_allowed_solution_dependencies(["domain"])
                    .with_forbidden_solution_dependencies(["infra"])
            })
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::ConflictingSolutionPolicy {
                module: "web".into()
            }
        );
    }

    #[test]
    fn solution_rejects_modules_outside_scope() {
        let err = ArchitectureBuilder::for_modules(solution())
            .module_in_solution("cli", |m| m.with_allowed_solution_dependencies(["domain"]))
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::ModuleNotInSolution { .. }));
    }

    #[test]
    fn reference_modules_are_not_checked() {
        let lib = ModuleDescriptor::new("Lib")
            .with_reference(ModuleReference::new("Newtonsoft.Json"))
            .with_type(TypeDescriptor::new("Lib", "Lib.ICommand", TypeKind::Interface));
        let app = ModuleDescriptor::new("App").with_type(
            TypeDescriptor::new("App", "App.Ship", TypeKind::Class)
                .with_interface(TypeRef::named("Lib", "Lib.ICommand")),
        );

        let report = ArchitectureBuilder::for_module(app)
            .with_reference_module(lib)
            .with_module_forbidden_dependency("Newtonsoft")
            .with_type("Lib.ICommand", |t| t.with_name_ends_with("Command"))
            .evaluate()
            .unwrap();
        assert_eq!(codes(&report), vec!["AG030"]);
        assert_eq!(report.violations[0].current, "App.Ship");
    }

    #[test]
    fn method_rules_resolve_against_loaded_types() {
        let module = ModuleDescriptor::new("App").with_type(
            TypeDescriptor::new("App", "App.Jobs", TypeKind::Class)
                .with_member(Member::method("run", vec![], None)),
        );

        let err = ArchitectureBuilder::for_module(module.clone())
            .with_type("App.Jobs", |t| {
                t.with_method("run", |m| m.with_required_attribute("instrument"))
            })
            .should_be_valid()
            .unwrap_err();
        assert_eq!(err.violations()[0].code, "AG031");

        let err = ArchitectureBuilder::for_module(module)
            .with_type("App.Jobs", |t| {
                t.with_method("stop", |m| m.with_required_attribute("instrument"))
            })
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::UnknownTarget {
                target: "App.Jobs.stop".into()
            }
        );
    }

    #[test]
    fn violation_limit_stops_later_stages() {
        let options = AnalysisOptions {
            max_violations: 2,
            ..AnalysisOptions::default()
        };
        let report = ArchitectureBuilder::for_module(fish_app())
            .with_options(options)
            .with_namespace_no_outbound_dependencies("App.Tuna")
            .with_module_forbidden_dependency("Newtonsoft")
            .evaluate()
            .unwrap();
        assert!(report.truncated);
        assert_eq!(codes(&report), vec!["AG002"; 4]);
    }

    #[test]
    fn shared_cache_is_reused() {
        let cache = ReferenceCache::new();
        ArchitectureBuilder::for_module(fish_app())
            .with_cache(cache.clone())
            .with_namespace_isolated("App.Sardine")
            .should_be_valid()
            .unwrap();
        assert!(!cache.is_empty());
    }
}
