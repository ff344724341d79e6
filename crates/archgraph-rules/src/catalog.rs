//! Catalog of the built-in validators.

use crate::{
    DependencyUsedOnly, ForbiddenModuleDependency, MethodAttributes, NamespaceNoInbound,
    NamespaceNoOutbound, SolutionModuleDependency, TypeShapes,
};
use archgraph_core::{RuleKind, ValidatorBox};
use serde::Serialize;

/// Static description of one built-in rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleInfo {
    /// Rule code (e.g., "AG001").
    pub code: &'static str,
    /// Rule name (e.g., "namespace-no-inbound").
    pub name: &'static str,
    /// Pipeline stage.
    pub kind: RuleKind,
    /// One-line description.
    pub description: &'static str,
}

fn prototypes() -> Vec<ValidatorBox> {
    vec![
        Box::new(NamespaceNoInbound::new()),
        Box::new(NamespaceNoOutbound::new()),
        Box::new(ForbiddenModuleDependency::new()),
        Box::new(SolutionModuleDependency::new(std::iter::empty::<&str>())),
        Box::new(DependencyUsedOnly::new()),
        Box::new(TypeShapes::new()),
        Box::new(MethodAttributes::new()),
    ]
}

/// Returns every built-in rule in evaluation order.
#[must_use]
pub fn catalog() -> Vec<RuleInfo> {
    let mut rules: Vec<RuleInfo> = prototypes()
        .iter()
        .map(|v| RuleInfo {
            code: v.code(),
            name: v.name(),
            kind: v.kind(),
            description: v.description(),
        })
        .collect();
    rules.sort_by_key(|r| (r.kind, r.code));
    rules
}

/// Looks a rule up by code or name.
#[must_use]
pub fn find_rule(key: &str) -> Option<RuleInfo> {
    catalog()
        .into_iter()
        .find(|r| r.code.eq_ignore_ascii_case(key) || r.name == key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_ordered_by_stage() {
        let codes: Vec<&str> = catalog().iter().map(|r| r.code).collect();
        assert_eq!(
            codes,
            vec!["AG001", "AG002", "AG010", "AG011", "AG020", "AG030", "AG031"]
        );
    }

    #[test]
    fn codes_and_names_are_unique() {
        let rules = catalog();
        for (i, a) in rules.iter().enumerate() {
            for b in &rules[i + 1..] {
                assert_ne!(a.code, b.code);
                assert_ne!(a.name, b.name);
            }
        }
    }

    #[test]
    fn find_by_code_or_name() {
        assert_eq!(find_rule("ag020").unwrap().name, "dependency-used-only");
        assert_eq!(find_rule("type-shape").unwrap().code, "AG030");
        assert!(find_rule("AG999").is_none());
    }
}
