//! The validator seam.

use crate::context::ValidationContext;
use crate::types::{RuleKind, Violation};

/// A rule evaluated over the reference graph of the modules under test.
///
/// Validators are built at registration time and are immutable afterwards.
/// Evaluation never fails: every breach is returned as a [`Violation`], and
/// resolution misses are skipped.
///
/// # Example
///
/// ```ignore
/// use archgraph_core::{RuleKind, ValidationContext, Validator, Violation};
///
/// pub struct NoEmptyModules;
///
/// impl Validator for NoEmptyModules {
///     fn name(&self) -> &'static str { "no-empty-modules" }
///     fn code(&self) -> &'static str { "AG900" }
///     fn kind(&self) -> RuleKind { RuleKind::Module }
///
///     fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<Violation> {
///         ctx.modules_under_test()
///             .filter(|m| m.types.is_empty())
///             .map(|m| /* ... */)
///             .collect()
///     }
/// }
/// ```
pub trait Validator: Send + Sync {
    /// Returns the kebab-case name of this rule (e.g., "namespace-no-inbound").
    fn name(&self) -> &'static str;

    /// Returns the rule code (e.g., "AG001").
    fn code(&self) -> &'static str;

    /// Returns a brief description of what this rule checks.
    fn description(&self) -> &'static str {
        ""
    }

    /// Rule family, which also fixes the pipeline stage this validator runs in.
    fn kind(&self) -> RuleKind;

    /// Evaluates the rule and returns every violation found.
    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<Violation>;
}

/// Type alias for boxed Validator trait objects.
pub type ValidatorBox = Box<dyn Validator>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Subject;

    struct EveryModule;

    impl Validator for EveryModule {
        fn name(&self) -> &'static str {
            "every-module"
        }
        fn code(&self) -> &'static str {
            "TEST001"
        }
        fn kind(&self) -> RuleKind {
            RuleKind::Module
        }

        fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<Violation> {
            ctx.modules_under_test()
                .map(|m| {
                    Violation::new(
                        self.code(),
                        self.name(),
                        self.kind(),
                        &m.name,
                        Subject::None,
                        "flagged",
                    )
                })
                .collect()
        }
    }

    #[test]
    fn test_validator_trait() {
        let rule = EveryModule;
        assert_eq!(rule.name(), "every-module");
        assert_eq!(rule.code(), "TEST001");
        assert_eq!(rule.description(), "");
        assert_eq!(rule.kind(), RuleKind::Module);
    }
}
