//! Violation and report types.

use crate::model::{TypeKey, TypeName};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Rule family that produced a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleKind {
    /// Namespace isolation, inbound or outbound.
    Namespace,
    /// Module-level dependency restriction.
    Module,
    /// "Used only by" allow-list.
    Dependency,
    /// Type or method shape constraint.
    Shape,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Namespace => write!(f, "namespace"),
            Self::Module => write!(f, "module"),
            Self::Dependency => write!(f, "dependency"),
            Self::Shape => write!(f, "shape"),
        }
    }
}

/// What a violation points at besides the offending type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "lowercase")]
pub enum Subject {
    /// A referenced type.
    Type(TypeName),
    /// A referenced module.
    Module(String),
    /// A method on the offending type.
    Method(String),
    /// Nothing beyond the offending type.
    None,
}

impl Subject {
    /// Creates a type subject from a graph node.
    #[must_use]
    pub fn from_key(key: &TypeKey) -> Self {
        Self::Type(key.name.clone())
    }
}

/// A single rule breach.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Rule code (e.g., "AG001").
    pub code: String,
    /// Rule name (e.g., "namespace-no-inbound").
    pub rule: String,
    /// Rule family.
    pub kind: RuleKind,
    /// Offending type, or the offending module's name for module rules.
    pub current: String,
    /// What `current` wrongly references or lacks.
    pub referenced: Subject,
    /// Human-readable message.
    pub message: String,
    /// Optional remediation hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

impl Violation {
    /// Creates a new violation.
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        rule: impl Into<String>,
        kind: RuleKind,
        current: impl Into<String>,
        referenced: Subject,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            rule: rule.into(),
            kind,
            current: current.into(),
            referenced,
            message: message.into(),
            help: None,
        }
    }

    /// Adds a remediation hint.
    #[must_use]
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Formats the violation for terminal output.
    #[must_use]
    pub fn format(&self) -> String {
        use std::fmt::Write;
        let mut output = format!("{} {} in {}\n", self.code, self.rule, self.current);
        let _ = writeln!(output, "  error: {}", self.message);
        if let Some(help) = &self.help {
            let _ = writeln!(output, "  = help: {help}");
        }
        output
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

/// A violation rendered as a miette diagnostic.
#[derive(Debug, thiserror::Error, Diagnostic)]
#[error("{message}")]
pub struct ViolationDiagnostic {
    message: String,
    #[help]
    help: Option<String>,
}

impl From<&Violation> for ViolationDiagnostic {
    fn from(v: &Violation) -> Self {
        Self {
            message: format!("[{}] {}", v.code, v.message),
            help: v.help.clone(),
        }
    }
}

/// Outcome of one evaluation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Every captured violation, in pipeline order.
    pub violations: Vec<Violation>,
    /// Number of types in the modules under test.
    pub types_checked: usize,
    /// Number of validators that ran.
    pub rules_evaluated: usize,
    /// Whether evaluation stopped early at the violation cutoff.
    pub truncated: bool,
}

impl ValidationReport {
    /// Creates an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether no violation was captured.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Violations of one rule family.
    pub fn by_kind(&self, kind: RuleKind) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(move |v| v.kind == kind)
    }

    /// Prints every violation and a summary line to stdout.
    pub fn print_report(&self) {
        for violation in &self.violations {
            println!("{}", violation.format());
        }
        println!("\n{}", self.summary());
    }

    /// One-line summary.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut line = format!(
            "Found {} violation(s) in {} type(s) across {} rule(s)",
            self.violations.len(),
            self.types_checked,
            self.rules_evaluated
        );
        if self.truncated {
            line.push_str(" (stopped at violation limit)");
        }
        line
    }

    /// Formats violations as a test failure report, one block per violation.
    #[must_use]
    pub fn format_test_report(&self) -> String {
        use std::fmt::Write;

        let mut report = String::new();
        let _ = writeln!(
            report,
            "\n=== archgraph: {} violation(s) ===\n",
            self.violations.len()
        );
        for v in &self.violations {
            let _ = writeln!(report, "{} [{}] in {}", v.rule, v.code, v.current);
            let _ = writeln!(report, "  {}", v.message);
            if let Some(help) = &v.help {
                let _ = writeln!(report, "  = help: {help}");
            }
            let _ = writeln!(report);
        }
        let _ = writeln!(report, "{}", self.summary());
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_violation() -> Violation {
        Violation::new(
            "AG002",
            "namespace-no-outbound",
            RuleKind::Namespace,
            "App.Tuna.Tuna",
            Subject::Type(TypeName::parse("App.Salmon.Salmon")),
            "Type 'App.Tuna.Tuna' from isolated namespace 'App.Tuna' references type 'App.Salmon.Salmon' from namespace 'App.Salmon'",
        )
    }

    #[test]
    fn format_includes_help_only_when_set() {
        let v = make_violation();
        assert!(!v.format().contains("help"));
        let v = v.with_help("move Salmon into App.Tuna");
        assert!(v.format().contains("= help: move Salmon into App.Tuna"));
    }

    #[test]
    fn display_is_code_and_message() {
        let v = make_violation();
        assert!(v.to_string().starts_with("[AG002] Type 'App.Tuna.Tuna'"));
    }

    #[test]
    fn subject_serializes_tagged() {
        let json = serde_json::to_string(&Subject::Module("serde_json".into())).unwrap();
        assert_eq!(json, r#"{"kind":"module","name":"serde_json"}"#);
    }

    #[test]
    fn test_report_layout() {
        let report = ValidationReport {
            violations: vec![make_violation()],
            types_checked: 7,
            rules_evaluated: 1,
            truncated: false,
        };
        insta::assert_snapshot!(report.format_test_report().trim(), @r"
        === archgraph: 1 violation(s) ===

        namespace-no-outbound [AG002] in App.Tuna.Tuna
          Type 'App.Tuna.Tuna' from isolated namespace 'App.Tuna' references type 'App.Salmon.Salmon' from namespace 'App.Salmon'

        Found 1 violation(s) in 7 type(s) across 1 rule(s)
        ");
    }

    #[test]
    fn truncated_summary_mentions_limit() {
        let report = ValidationReport {
            truncated: true,
            ..ValidationReport::new()
        };
        assert!(report.summary().ends_with("(stopped at violation limit)"));
        assert!(report.is_valid());
    }
}
