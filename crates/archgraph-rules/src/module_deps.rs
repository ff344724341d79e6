//! Module-level dependency rules.
//!
//! These rules inspect the module references declared by each module under
//! test, not the type graph.
//!
//! - `AG010` forbids references whose `name@version` matches a pattern.
//! - `AG011` restricts references between modules of one solution, either
//!   by an allow-list or by a forbid-list per module.

use archgraph_core::{
    compile_pattern, ConfigurationError, ModuleDescriptor, ModuleReference, RuleKind, Subject,
    ValidationContext, Validator, Violation,
};
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};

/// Rule code for forbidden-module-dependency.
pub const FORBIDDEN_CODE: &str = "AG010";

/// Rule name for forbidden-module-dependency.
pub const FORBIDDEN_NAME: &str = "forbidden-module-dependency";

/// Rule code for solution-module-dependency.
pub const SOLUTION_CODE: &str = "AG011";

/// Rule name for solution-module-dependency.
pub const SOLUTION_NAME: &str = "solution-module-dependency";

/// Forbids module references matching any registered pattern.
#[derive(Debug, Clone, Default)]
pub struct ForbiddenModuleDependency {
    patterns: Vec<Regex>,
}

impl ForbiddenModuleDependency {
    /// Creates a rule with no patterns.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a pattern matched against `name@version` of each reference.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidPattern`] if `pattern` does not
    /// compile.
    pub fn pattern(mut self, pattern: &str) -> Result<Self, ConfigurationError> {
        self.patterns.push(compile_pattern(pattern)?);
        Ok(self)
    }

    /// Adds an already compiled pattern.
    pub fn push(&mut self, pattern: Regex) {
        self.patterns.push(pattern);
    }

    /// Whether no pattern is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    fn forbids(&self, reference: &ModuleReference) -> bool {
        let full_name = reference.full_name();
        self.patterns.iter().any(|p| p.is_match(&full_name))
    }
}

impl Validator for ForbiddenModuleDependency {
    fn name(&self) -> &'static str {
        FORBIDDEN_NAME
    }

    fn code(&self) -> &'static str {
        FORBIDDEN_CODE
    }

    fn description(&self) -> &'static str {
        "Modules must not reference modules matching a forbidden pattern"
    }

    fn kind(&self) -> RuleKind {
        RuleKind::Module
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<Violation> {
        ctx.modules_under_test()
            .flat_map(|module| {
                module
                    .references
                    .iter()
                    .filter(|r| self.forbids(r))
                    .map(move |r| {
                        Violation::new(
                            FORBIDDEN_CODE,
                            FORBIDDEN_NAME,
                            RuleKind::Module,
                            &module.name,
                            Subject::Module(r.name.clone()),
                            format!(
                                "Module '{}' depends on forbidden module '{}'",
                                module.name,
                                r.full_name()
                            ),
                        )
                    })
            })
            .collect()
    }
}

/// What one module may reference inside its solution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolutionPolicy {
    /// Only these solution modules may be referenced.
    Allow(BTreeSet<String>),
    /// These solution modules must not be referenced.
    Forbid(BTreeSet<String>),
}

/// Restricts references between the modules of one solution.
///
/// Build with [`SolutionModuleDependency::new`] and [`policy`](Self::policy);
/// both validate module names eagerly so that misconfiguration surfaces
/// before evaluation starts.
#[derive(Debug, Clone)]
pub struct SolutionModuleDependency {
    solution: BTreeSet<String>,
    policies: BTreeMap<String, SolutionPolicy>,
}

impl SolutionModuleDependency {
    /// Creates a rule scoped to the given solution modules.
    #[must_use]
    pub fn new<I, S>(solution: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            solution: solution.into_iter().map(|s| normalize(s.as_ref())).collect(),
            policies: BTreeMap::new(),
        }
    }

    /// Registers the policy of `module`.
    ///
    /// # Errors
    ///
    /// - [`ConfigurationError::ModuleNotInSolution`] if `module` or any
    ///   listed module is outside the solution
    /// - [`ConfigurationError::ConflictingSolutionPolicy`] if `module`
    ///   already has a policy of the other kind
    pub fn policy(
        &mut self,
        module: &str,
        policy: SolutionPolicy,
    ) -> Result<(), ConfigurationError> {
        let module = self.in_solution(module)?;
        let (names, allow) = match &policy {
            SolutionPolicy::Allow(names) => (names, true),
            SolutionPolicy::Forbid(names) => (names, false),
        };
        let names = names
            .iter()
            .map(|n| self.in_solution(n))
            .collect::<Result<BTreeSet<_>, _>>()?;

        match (self.policies.get_mut(&module), allow) {
            (None, true) => {
                self.policies.insert(module, SolutionPolicy::Allow(names));
            }
            (None, false) => {
                self.policies.insert(module, SolutionPolicy::Forbid(names));
            }
            (Some(SolutionPolicy::Allow(existing)), true)
            | (Some(SolutionPolicy::Forbid(existing)), false) => existing.extend(names),
            (Some(_), _) => return Err(ConfigurationError::ConflictingSolutionPolicy { module }),
        }
        Ok(())
    }

    /// Whether no policy is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    fn in_solution(&self, module: &str) -> Result<String, ConfigurationError> {
        let name = normalize(module);
        if self.solution.contains(&name) {
            Ok(name)
        } else {
            Err(ConfigurationError::ModuleNotInSolution {
                module: module.to_string(),
            })
        }
    }

    fn check(&self, module: &ModuleDescriptor, out: &mut Vec<Violation>) {
        let Some(policy) = self.policies.get(&normalize(&module.name)) else {
            return;
        };

        for reference in &module.references {
            let name = normalize(&reference.name);
            if !self.solution.contains(&name) {
                continue;
            }
            let message = match policy {
                SolutionPolicy::Allow(allowed) if !allowed.contains(&name) => format!(
                    "Module '{}' is not allowed to depend on solution module '{}'",
                    module.name, reference.name
                ),
                SolutionPolicy::Forbid(forbidden) if forbidden.contains(&name) => format!(
                    "Module '{}' is forbidden to depend on solution module '{}'",
                    module.name, reference.name
                ),
                _ => continue,
            };
            out.push(Violation::new(
                SOLUTION_CODE,
                SOLUTION_NAME,
                RuleKind::Module,
                &module.name,
                Subject::Module(reference.name.clone()),
                message,
            ));
        }
    }
}

impl Validator for SolutionModuleDependency {
    fn name(&self) -> &'static str {
        SOLUTION_NAME
    }

    fn code(&self) -> &'static str {
        SOLUTION_CODE
    }

    fn description(&self) -> &'static str {
        "Solution modules may only reference the sibling modules their policy allows"
    }

    fn kind(&self) -> RuleKind {
        RuleKind::Module
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<Violation> {
        let mut violations = Vec::new();
        for module in ctx.modules_under_test() {
            self.check(module, &mut violations);
        }
        violations
    }
}

/// Cargo package names and crate names differ only in `-` vs `_`.
fn normalize(name: &str) -> String {
    name.replace('-', "_")
}
