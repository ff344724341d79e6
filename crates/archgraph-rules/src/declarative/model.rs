//! Validated declarative rules.
//!
//! Every value here has passed the loader's checks: names are non-empty,
//! patterns compile and solution policies are unambiguous. Applying the
//! rules to an [`ArchitectureBuilder`] therefore never records a pattern
//! error; module and method names are still resolved at build time.

use crate::builder::{ArchitectureBuilder, TypeRuleBuilder};
use archgraph_core::{compile_pattern, AccessLevel};
use std::collections::BTreeSet;

/// Field-level validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// A required name is empty or whitespace.
    #[error("must not be empty")]
    Empty,

    /// A regex does not compile.
    #[error("invalid pattern `{pattern}`: {message}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Compiler message.
        message: String,
    },

    /// Neither direction of an isolation is enabled.
    #[error("at least one of `inbound` or `outbound` must be true")]
    NoDirection,

    /// A type shape constrains nothing.
    #[error("type shape for `{0}` sets no constraint")]
    EmptyShape(String),

    /// A method constraint lists no attribute.
    #[error("method `{0}` lists no attribute")]
    NoAttributes(String),
}

/// Returns `value` trimmed, or [`ModelError::Empty`].
pub(crate) fn non_empty(value: &str) -> Result<String, ModelError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ModelError::Empty)
    } else {
        Ok(trimmed.to_string())
    }
}

/// Returns `pattern` if it compiles.
pub(crate) fn valid_pattern(pattern: &str) -> Result<String, ModelError> {
    compile_pattern(pattern)
        .map(|_| pattern.to_string())
        .map_err(|e| ModelError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })
}

/// An isolated namespace and the directions it is closed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceIsolation {
    /// Isolated namespace.
    pub namespace: String,
    /// Closed to references from outside.
    pub inbound: bool,
    /// Closed to references to the outside.
    pub outbound: bool,
    /// Exempted namespaces.
    pub except: Vec<String>,
}

/// A "used only by" restriction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsedOnlyBy {
    /// Restricted type.
    pub target: String,
    /// Allowed dependants.
    pub allowed: Vec<String>,
    /// Skip compiler-generated dependants.
    pub exclude_compiler_generated: bool,
}

/// Constraints on the types assignable to one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeShapeRule {
    /// Target type or interface.
    pub target: String,
    /// Required record-ness.
    pub record: Option<bool>,
    /// Accepted access levels.
    pub access: Vec<AccessLevel>,
    /// Name regex.
    pub name: Option<String>,
    /// Name suffix.
    pub name_ends_with: Option<String>,
    /// Namespace regex.
    pub namespace: Option<String>,
    /// Method constraints.
    pub methods: Vec<MethodShapeRule>,
}

impl TypeShapeRule {
    /// Whether no constraint is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.record.is_none()
            && self.access.is_empty()
            && self.name.is_none()
            && self.name_ends_with.is_none()
            && self.namespace.is_none()
            && self.methods.is_empty()
    }

    fn configure(&self, mut t: TypeRuleBuilder) -> TypeRuleBuilder {
        match self.record {
            Some(true) => t = t.is_record(),
            Some(false) => t = t.is_not_record(),
            None => {}
        }
        for level in &self.access {
            t = t.with_access_level(*level);
        }
        if let Some(pattern) = &self.name {
            t = t.with_name_match(pattern);
        }
        if let Some(suffix) = &self.name_ends_with {
            t = t.with_name_ends_with(suffix);
        }
        if let Some(pattern) = &self.namespace {
            t = t.with_namespace_match(pattern);
        }
        for method in &self.methods {
            t = t.with_method(method.method.as_str(), |m| {
                method
                    .attributes
                    .iter()
                    .fold(m, |m, a| m.with_required_attribute(a))
            });
        }
        t
    }
}

/// Required markers on one method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodShapeRule {
    /// Method name.
    pub method: String,
    /// Required markers.
    pub attributes: Vec<String>,
}

/// Allow- or forbid-list of one solution module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolutionModuleRule {
    /// `module` may only reference `modules`.
    Allow {
        /// Constrained module.
        module: String,
        /// Allowed solution modules.
        modules: BTreeSet<String>,
    },
    /// `module` must not reference `modules`.
    Forbid {
        /// Constrained module.
        module: String,
        /// Forbidden solution modules.
        modules: BTreeSet<String>,
    },
}

/// Declarative rules loaded from `archgraph.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclarativeRules {
    isolations: Vec<NamespaceIsolation>,
    forbidden_modules: Vec<String>,
    used_only: Vec<UsedOnlyBy>,
    type_shapes: Vec<TypeShapeRule>,
    solution: Vec<SolutionModuleRule>,
}

impl DeclarativeRules {
    pub(crate) fn new(
        isolations: Vec<NamespaceIsolation>,
        forbidden_modules: Vec<String>,
        used_only: Vec<UsedOnlyBy>,
        type_shapes: Vec<TypeShapeRule>,
        solution: Vec<SolutionModuleRule>,
    ) -> Self {
        Self {
            isolations,
            forbidden_modules,
            used_only,
            type_shapes,
            solution,
        }
    }

    /// Whether no rule is defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rule_count() == 0
    }

    /// Number of declared rule entries.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.isolations.len()
            + self.forbidden_modules.len()
            + self.used_only.len()
            + self.type_shapes.len()
            + self.solution.len()
    }

    /// Namespace isolations.
    #[must_use]
    pub fn isolations(&self) -> &[NamespaceIsolation] {
        &self.isolations
    }

    /// Forbidden module patterns.
    #[must_use]
    pub fn forbidden_modules(&self) -> &[String] {
        &self.forbidden_modules
    }

    /// "Used only by" restrictions.
    #[must_use]
    pub fn used_only(&self) -> &[UsedOnlyBy] {
        &self.used_only
    }

    /// Type shape rules.
    #[must_use]
    pub fn type_shapes(&self) -> &[TypeShapeRule] {
        &self.type_shapes
    }

    /// Solution module policies.
    #[must_use]
    pub fn solution(&self) -> &[SolutionModuleRule] {
        &self.solution
    }

    /// Registers every rule on `builder`.
    #[must_use]
    pub fn apply(&self, mut builder: ArchitectureBuilder) -> ArchitectureBuilder {
        for iso in &self.isolations {
            if iso.inbound {
                builder = builder
                    .with_namespace_no_inbound_dependencies_except(&iso.namespace, iso.except.clone());
            }
            if iso.outbound {
                builder = builder.with_namespace_no_outbound_dependencies_except(
                    &iso.namespace,
                    iso.except.clone(),
                );
            }
        }
        for pattern in &self.forbidden_modules {
            builder = builder.with_module_forbidden_dependency(pattern);
        }
        for rule in &self.used_only {
            builder = builder.with_dependency_used_only(
                &rule.target,
                &rule.allowed,
                rule.exclude_compiler_generated,
            );
        }
        for shape in &self.type_shapes {
            builder = builder.with_type(&shape.target, |t| shape.configure(t));
        }
        for rule in &self.solution {
            builder = match rule {
                SolutionModuleRule::Allow { module, modules } => builder
                    .module_in_solution(module, |m| {
                        m.with_allowed_solution_dependencies(modules.iter().cloned())
                    }),
                SolutionModuleRule::Forbid { module, modules } => builder
                    .module_in_solution(module, |m| {
                        m.with_forbidden_solution_dependencies(modules.iter().cloned())
                    }),
            };
        }
        builder
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_trims() {
        assert_eq!(non_empty("  app.tuna ").unwrap(), "app.tuna");
        assert_eq!(non_empty("   "), Err(ModelError::Empty));
    }

    #[test]
    fn valid_pattern_reports_compiler_message() {
        assert_eq!(valid_pattern("^serde").unwrap(), "^serde");
        let err = valid_pattern("(").unwrap_err();
        assert!(matches!(err, ModelError::InvalidPattern { pattern, .. } if pattern == "("));
    }

    #[test]
    fn empty_shape() {
        let shape = TypeShapeRule {
            target: "app.Command".into(),
            record: None,
            access: vec![],
            name: None,
            name_ends_with: None,
            namespace: None,
            methods: vec![],
        };
        assert!(shape.is_empty());
        let shape = TypeShapeRule {
            record: Some(false),
            ..shape
        };
        assert!(!shape.is_empty());
    }

    #[test]
    fn rule_count_sums_every_section() {
        let rules = DeclarativeRules::new(
            vec![NamespaceIsolation {
                namespace: "app.tuna".into(),
                inbound: true,
                outbound: true,
                except: vec![],
            }],
            vec!["^serde".into()],
            vec![],
            vec![],
            vec![SolutionModuleRule::Allow {
                module: "web".into(),
                modules: BTreeSet::new(),
            }],
        );
        assert_eq!(rules.rule_count(), 3);
        assert!(!rules.is_empty());
        assert!(DeclarativeRules::default().is_empty());
    }
}
