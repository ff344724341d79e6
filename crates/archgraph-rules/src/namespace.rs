//! Namespace isolation rules.
//!
//! A namespace `N` covers `N` itself and every `N.*` child namespace.
//!
//! - **no inbound** (`AG001`): types outside `N` must not reference types
//!   inside it.
//! - **no outbound** (`AG002`): types inside `N` must not reference types
//!   outside it.
//!
//! Registering both for the same namespace isolates it fully.
//!
//! Only internal references (same module) are inspected, and referenced
//! types in the global namespace are ignored. Each offending type reports
//! at most `per_type_cutoff` references and each namespace at most
//! `per_namespace_cutoff` violations, which bounds the output when a large
//! namespace depends on everything.
//!
//! # Example
//!
//! ```ignore
//! let rule = NamespaceNoOutbound::new()
//!     .namespace(IsolatedNamespace::new("app.domain").with_exception("app.shared"));
//! ```

use archgraph_core::{
    namespace_contains, RuleKind, Subject, TypeDescriptor, TypeKey, ValidationContext, Validator,
    Violation,
};
use tracing::debug;

/// Rule code for namespace-no-inbound.
pub const NO_INBOUND_CODE: &str = "AG001";

/// Rule name for namespace-no-inbound.
pub const NO_INBOUND_NAME: &str = "namespace-no-inbound";

/// Rule code for namespace-no-outbound.
pub const NO_OUTBOUND_CODE: &str = "AG002";

/// Rule name for namespace-no-outbound.
pub const NO_OUTBOUND_NAME: &str = "namespace-no-outbound";

/// An isolated namespace and the namespaces exempted from its boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsolatedNamespace {
    /// The isolated namespace (children included).
    pub namespace: String,
    /// Namespaces treated as inside the boundary.
    pub except: Vec<String>,
}

impl IsolatedNamespace {
    /// Isolates `namespace` with no exceptions.
    #[must_use]
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            except: Vec::new(),
        }
    }

    /// Exempts `namespace` (and its children).
    #[must_use]
    pub fn with_exception(mut self, namespace: impl Into<String>) -> Self {
        self.except.push(namespace.into());
        self
    }

    /// Exempts several namespaces.
    #[must_use]
    pub fn with_exceptions<I, S>(mut self, namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.except.extend(namespaces.into_iter().map(Into::into));
        self
    }

    fn contains(&self, namespace: Option<&str>) -> bool {
        namespace_contains(&self.namespace, namespace)
    }

    fn is_exempt(&self, namespace: Option<&str>) -> bool {
        self.except.iter().any(|e| namespace_contains(e, namespace))
    }
}

/// Forbids references into isolated namespaces from outside.
#[derive(Debug, Clone, Default)]
pub struct NamespaceNoInbound {
    namespaces: Vec<IsolatedNamespace>,
}

impl NamespaceNoInbound {
    /// Creates a rule with no namespaces.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an isolated namespace.
    #[must_use]
    pub fn namespace(mut self, namespace: IsolatedNamespace) -> Self {
        self.push(namespace);
        self
    }

    /// Adds an isolated namespace in place. Duplicates are ignored.
    pub fn push(&mut self, namespace: IsolatedNamespace) {
        if !self.namespaces.contains(&namespace) {
            self.namespaces.push(namespace);
        }
    }

    /// Whether no namespace is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }
}

impl Validator for NamespaceNoInbound {
    fn name(&self) -> &'static str {
        NO_INBOUND_NAME
    }

    fn code(&self) -> &'static str {
        NO_INBOUND_CODE
    }

    fn description(&self) -> &'static str {
        "Types outside an isolated namespace must not reference types inside it"
    }

    fn kind(&self) -> RuleKind {
        RuleKind::Namespace
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<Violation> {
        let mut violations = Vec::new();
        for rule in &self.namespaces {
            scan(
                ctx,
                &mut violations,
                |ty| !rule.contains(ty.namespace()) && !rule.is_exempt(ty.namespace()),
                |r| rule.contains(r.name.namespace()),
                |ty, r| {
                    Violation::new(
                        NO_INBOUND_CODE,
                        NO_INBOUND_NAME,
                        RuleKind::Namespace,
                        ty.name.full_name(),
                        Subject::from_key(r),
                        format!(
                            "Type '{}' outside isolated namespace '{}' references type '{}' from isolated namespace '{}'",
                            ty.name,
                            rule.namespace,
                            r.name,
                            r.name.namespace().unwrap_or_default()
                        ),
                    )
                    .with_help(format!(
                        "only types inside '{}' may depend on its types",
                        rule.namespace
                    ))
                },
            );
        }
        violations
    }
}

/// Forbids references out of isolated namespaces.
#[derive(Debug, Clone, Default)]
pub struct NamespaceNoOutbound {
    namespaces: Vec<IsolatedNamespace>,
}

impl NamespaceNoOutbound {
    /// Creates a rule with no namespaces.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an isolated namespace.
    #[must_use]
    pub fn namespace(mut self, namespace: IsolatedNamespace) -> Self {
        self.push(namespace);
        self
    }

    /// Adds an isolated namespace in place. Duplicates are ignored.
    pub fn push(&mut self, namespace: IsolatedNamespace) {
        if !self.namespaces.contains(&namespace) {
            self.namespaces.push(namespace);
        }
    }

    /// Whether no namespace is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }
}

impl Validator for NamespaceNoOutbound {
    fn name(&self) -> &'static str {
        NO_OUTBOUND_NAME
    }

    fn code(&self) -> &'static str {
        NO_OUTBOUND_CODE
    }

    fn description(&self) -> &'static str {
        "Types inside an isolated namespace must not reference types outside it"
    }

    fn kind(&self) -> RuleKind {
        RuleKind::Namespace
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<Violation> {
        let mut violations = Vec::new();
        for rule in &self.namespaces {
            scan(
                ctx,
                &mut violations,
                |ty| rule.contains(ty.namespace()),
                |r| {
                    let ns = r.name.namespace();
                    ns.is_some() && !rule.contains(ns) && !rule.is_exempt(ns)
                },
                |ty, r| {
                    Violation::new(
                        NO_OUTBOUND_CODE,
                        NO_OUTBOUND_NAME,
                        RuleKind::Namespace,
                        ty.name.full_name(),
                        Subject::from_key(r),
                        format!(
                            "Type '{}' in isolated namespace '{}' references type '{}' from outside namespace '{}'",
                            ty.name,
                            rule.namespace,
                            r.name,
                            r.name.namespace().unwrap_or_default()
                        ),
                    )
                    .with_help(format!(
                        "move '{}' into '{}' or exempt its namespace",
                        r.name.name(),
                        rule.namespace
                    ))
                },
            );
        }
        violations
    }
}

/// Collects violations for one namespace under both cutoffs.
fn scan(
    ctx: &ValidationContext<'_>,
    out: &mut Vec<Violation>,
    select: impl Fn(&TypeDescriptor) -> bool,
    offends: impl Fn(&TypeKey) -> bool,
    violation: impl Fn(&TypeDescriptor, &TypeKey) -> Violation,
) {
    let per_type = ctx.options.per_type_cutoff;
    let per_namespace = ctx.options.per_namespace_cutoff;
    let mut found = 0;

    'types: for ty in ctx.types_under_test().filter(|t| select(t)) {
        let refs = ctx.references(ty);
        for r in refs.internal.iter().filter(|r| offends(r)).take(per_type) {
            if found == per_namespace {
                debug!("namespace cutoff {per_namespace} reached");
                break 'types;
            }
            out.push(violation(ty, r));
            found += 1;
        }
    }
}
