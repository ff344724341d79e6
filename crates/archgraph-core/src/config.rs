//! Configuration types for archgraph.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration file (`archgraph.toml`).
///
/// Declarative rule sections live in the same file and are read separately
/// by the rules crate; serde skips them here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Analysis limits and heuristics.
    #[serde(default)]
    pub analysis: AnalysisOptions,

    /// Modules to load.
    #[serde(default)]
    pub modules: Vec<ModuleSource>,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }
}

/// Where to load one module from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModuleSource {
    /// Rust crate directory (containing `Cargo.toml`), read with the
    /// source introspector.
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Metadata snapshot file (`.json` or `.toml`).
    #[serde(default)]
    pub snapshot: Option<PathBuf>,

    /// Glob patterns excluded from source discovery.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Load for reference resolution only; rules do not evaluate it.
    #[serde(default)]
    pub reference_only: bool,
}

/// Limits and heuristics applied during evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisOptions {
    /// Evaluation stops after the stage that reaches this many violations.
    #[serde(default = "default_max_violations")]
    pub max_violations: usize,

    /// Maximum namespace violations reported per offending type.
    #[serde(default = "default_per_type_cutoff")]
    pub per_type_cutoff: usize,

    /// Maximum namespace violations reported per isolated namespace.
    #[serde(default = "default_per_namespace_cutoff")]
    pub per_namespace_cutoff: usize,

    /// Universal root types ignored in the base-type slot.
    #[serde(default = "default_root_types")]
    pub root_types: Vec<String>,

    /// Marker names that identify compiler-generated types.
    #[serde(default = "default_compiler_generated_markers")]
    pub compiler_generated_markers: Vec<String>,

    /// Regexes over simple type names that identify compiler-generated types.
    #[serde(default = "default_compiler_generated_patterns")]
    pub compiler_generated_patterns: Vec<String>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            max_violations: default_max_violations(),
            per_type_cutoff: default_per_type_cutoff(),
            per_namespace_cutoff: default_per_namespace_cutoff(),
            root_types: default_root_types(),
            compiler_generated_markers: default_compiler_generated_markers(),
            compiler_generated_patterns: default_compiler_generated_patterns(),
        }
    }
}

impl AnalysisOptions {
    /// Whether `full_name` is a universal root type.
    #[must_use]
    pub fn is_root_type(&self, full_name: &str) -> bool {
        self.root_types.iter().any(|r| r == full_name)
    }
}

fn default_max_violations() -> usize {
    15
}

fn default_per_type_cutoff() -> usize {
    3
}

fn default_per_namespace_cutoff() -> usize {
    15
}

fn default_root_types() -> Vec<String> {
    vec!["System.Object".to_string(), "object".to_string()]
}

fn default_compiler_generated_markers() -> Vec<String> {
    vec![
        "System.Runtime.CompilerServices.CompilerGeneratedAttribute".to_string(),
        "automatically_derived".to_string(),
    ]
}

fn default_compiler_generated_patterns() -> Vec<String> {
    vec![
        "^<".to_string(),
        "<>".to_string(),
        "__DisplayClass".to_string(),
        r"\{\{closure\}\}".to_string(),
    ]
}

/// Errors reading the configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },
}

/// Rule registration errors, raised before any type is enumerated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, miette::Diagnostic)]
pub enum ConfigurationError {
    /// Both an allow-list and a forbid-list were registered for one module.
    #[error("module '{module}' has both allowed and forbidden solution dependencies")]
    #[diagnostic(
        code(archgraph::config::conflicting_policy),
        help("use either an allow-list or a forbid-list per module")
    )]
    ConflictingSolutionPolicy {
        /// Module with the conflicting policy.
        module: String,
    },

    /// A solution rule names a module outside the solution scope.
    #[error("module '{module}' is not part of the solution")]
    #[diagnostic(code(archgraph::config::module_not_in_solution))]
    ModuleNotInSolution {
        /// The unknown module.
        module: String,
    },

    /// A regular expression failed to compile.
    #[error("invalid pattern '{pattern}': {reason}")]
    #[diagnostic(code(archgraph::config::invalid_pattern))]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Compiler error.
        reason: String,
    },

    /// A rule names a type or method that is not loaded.
    #[error("unknown rule target '{target}'")]
    #[diagnostic(
        code(archgraph::config::unknown_target),
        help("targets are dotted full names, e.g. `app.tuna.Tuna`")
    )]
    UnknownTarget {
        /// The unresolved name.
        target: String,
    },

    /// A module source entry names neither a path nor a snapshot, or both.
    #[error("modules[{index}]: exactly one of `path` or `snapshot` must be set")]
    #[diagnostic(code(archgraph::config::ambiguous_module_source))]
    AmbiguousModuleSource {
        /// Index of the entry.
        index: usize,
    },
}

/// Compiles a regular expression, mapping failures to a configuration error.
///
/// # Errors
///
/// Returns [`ConfigurationError::InvalidPattern`] if `pattern` is not a valid
/// regular expression.
pub fn compile_pattern(pattern: &str) -> Result<regex::Regex, ConfigurationError> {
    regex::Regex::new(pattern).map_err(|e| ConfigurationError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.analysis.max_violations, 15);
        assert_eq!(config.analysis.per_type_cutoff, 3);
        assert!(config.modules.is_empty());
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[analysis]
max_violations = 50
root_types = ["System.Object"]

[[modules]]
path = "crates/app"
exclude = ["**/generated/**"]

[[modules]]
snapshot = "metadata/core.json"
reference_only = true

[[isolate-namespace]]
namespace = "app.domain"
"#;

        let config = Config::parse(toml).expect("Failed to parse");
        assert_eq!(config.analysis.max_violations, 50);
        assert_eq!(config.analysis.per_namespace_cutoff, 15);
        assert!(config.analysis.is_root_type("System.Object"));
        assert!(!config.analysis.is_root_type("object"));
        assert_eq!(config.modules.len(), 2);
        assert_eq!(config.modules[0].path, Some(PathBuf::from("crates/app")));
        assert!(config.modules[1].reference_only);
    }

    #[test]
    fn invalid_pattern_is_a_configuration_error() {
        let err = compile_pattern("(unclosed").unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidPattern { .. }));
    }
}
