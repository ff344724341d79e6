//! "Used only by" allow-lists.
//!
//! A rule names a target type and the types allowed to reference it. Every
//! other non-interface type that references the target is a violation.
//!
//! When the target is an interface the rule also covers every type
//! assignable to it, so one rule can restrict a whole capability:
//!
//! ```ignore
//! // Only handlers may touch anything implementing `IRepository`.
//! UsedOnlyRule::new("App.Data.IRepository").allowed_by("App.Handlers.IHandler")
//! ```
//!
//! When several rules match the same referenced type, their allowed sets
//! are unioned. A compiler-generated dependant is only checked against the
//! matching rules that do not exclude such types.

use archgraph_core::{
    RuleKind, Subject, TypeDescriptor, TypeKey, TypeName, ValidationContext, Validator, Violation,
};
use tracing::trace;

/// Rule code for dependency-used-only.
pub const CODE: &str = "AG020";

/// Rule name for dependency-used-only.
pub const NAME: &str = "dependency-used-only";

/// One target and the types allowed to reference it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsedOnlyRule {
    /// Restricted type.
    pub target: TypeName,
    /// Types (or interfaces) allowed to reference `target`.
    pub allowed: Vec<TypeName>,
    /// Skip compiler-generated dependants.
    pub exclude_compiler_generated: bool,
}

impl UsedOnlyRule {
    /// Restricts `target`; compiler-generated dependants are excluded.
    #[must_use]
    pub fn new(target: impl Into<TypeName>) -> Self {
        Self {
            target: target.into(),
            allowed: Vec::new(),
            exclude_compiler_generated: true,
        }
    }

    /// Allows `dependant`, or any type assignable to it.
    #[must_use]
    pub fn allowed_by(mut self, dependant: impl Into<TypeName>) -> Self {
        self.allowed.push(dependant.into());
        self
    }

    /// Sets whether compiler-generated dependants are exempt.
    #[must_use]
    pub fn exclude_compiler_generated(mut self, exclude: bool) -> Self {
        self.exclude_compiler_generated = exclude;
        self
    }
}

/// Validator for every registered [`UsedOnlyRule`].
#[derive(Debug, Clone, Default)]
pub struct DependencyUsedOnly {
    rules: Vec<UsedOnlyRule>,
}

impl DependencyUsedOnly {
    /// Creates a validator with no rules.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule.
    #[must_use]
    pub fn rule(mut self, rule: UsedOnlyRule) -> Self {
        self.push(rule);
        self
    }

    /// Adds a rule in place.
    pub fn push(&mut self, rule: UsedOnlyRule) {
        self.rules.push(rule);
    }

    /// Whether no rule is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Registered targets.
    pub fn targets(&self) -> impl Iterator<Item = &TypeName> {
        self.rules.iter().map(|r| &r.target)
    }

    fn matching(&self, ctx: &ValidationContext<'_>, dependency: &TypeKey) -> Vec<&UsedOnlyRule> {
        self.rules
            .iter()
            .filter(|rule| {
                dependency.name == rule.target
                    || (ctx.index.is_interface(&rule.target)
                        && ctx.index.is_key_assignable_to(dependency, &rule.target))
            })
            .collect()
    }

    fn check_edge(
        &self,
        ctx: &ValidationContext<'_>,
        current: &TypeDescriptor,
        dependency: &TypeKey,
    ) -> Option<Violation> {
        let mut rules = self.matching(ctx, dependency);
        if rules.iter().any(|r| r.exclude_compiler_generated) && ctx.is_compiler_generated(current)
        {
            rules.retain(|r| !r.exclude_compiler_generated);
            if rules.is_empty() {
                trace!(ty = %current.name, "compiler-generated dependant skipped");
            }
        }
        if rules.is_empty() {
            return None;
        }

        let mut allowed: Vec<&TypeName> = rules.iter().flat_map(|r| r.allowed.iter()).collect();
        allowed.sort();
        allowed.dedup();

        if allowed.iter().any(|a| ctx.index.is_assignable_to(current, a)) {
            return None;
        }

        let allowed_list = allowed
            .iter()
            .map(|a| format!("'{a}'"))
            .collect::<Vec<_>>()
            .join(", ");
        Some(
            Violation::new(
                CODE,
                NAME,
                RuleKind::Dependency,
                current.name.full_name(),
                Subject::from_key(dependency),
                format!(
                    "Type '{}' depends on type '{}' from module '{}', which may only be used by [{}]",
                    current.name, dependency.name, dependency.module, allowed_list
                ),
            )
            .with_help(format!(
                "remove the reference or route it through one of [{allowed_list}]"
            )),
        )
    }
}

impl Validator for DependencyUsedOnly {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Restricted types may only be referenced by their allowed dependants"
    }

    fn kind(&self) -> RuleKind {
        RuleKind::Dependency
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<Violation> {
        let mut violations = Vec::new();
        for ty in ctx.types_under_test().filter(|t| !t.is_interface()) {
            let refs = ctx.references(ty);
            for dependency in refs.external.iter().chain(refs.internal.iter()) {
                violations.extend(self.check_edge(ctx, ty, dependency));
            }
        }
        violations
    }
}
