//! Architecture rules driven by TOML configuration.
//!
//! The same rules the fluent [`ArchitectureBuilder`] registers can be
//! declared next to `[analysis]` in `archgraph.toml`:
//!
//! ```toml
//! [[isolate-namespace]]
//! namespace = "app.tuna"
//! except = ["app.sardine"]
//!
//! [[used-only-by]]
//! target = "app.tuna.Tuna"
//! allowed = ["app.sardine.Sardine"]
//! ```
//!
//! # Architecture
//!
//! ```text
//! TOML text
//!   ↓ serde (DTO layer)
//! config_dto types
//!   ↓ validate + convert
//! DeclarativeRules (domain model)
//!   ↓ apply()
//! ArchitectureBuilder
//! ```

pub mod config_dto;
pub mod loader;
pub mod model;

pub use loader::LoadError;
pub use model::{DeclarativeRules, ModelError};

use crate::builder::ArchitectureBuilder;

/// Errors from parsing TOML and loading declarative rules.
#[derive(Debug, thiserror::Error)]
pub enum LoadRulesError {
    /// TOML deserialization failed.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Domain model validation failed.
    #[error("{0}")]
    Load(#[from] LoadError),
}

/// Parses TOML content into validated rules.
///
/// Returns empty rules if no declarative section is present.
///
/// # Errors
///
/// Returns an error if TOML parsing or model validation fails.
pub fn load_rules_from_toml(content: &str) -> Result<DeclarativeRules, LoadRulesError> {
    let dto: config_dto::DeclarativeConfigDto = toml::from_str(content)?;
    Ok(loader::load(dto)?)
}

/// Parses TOML content and registers its rules on `builder`.
///
/// # Errors
///
/// Returns an error if TOML parsing or model validation fails.
pub fn apply_toml(
    content: &str,
    builder: ArchitectureBuilder,
) -> Result<ArchitectureBuilder, LoadRulesError> {
    let rules = load_rules_from_toml(content)?;
    tracing::debug!("Loaded {} declarative rule(s)", rules.rule_count());
    Ok(rules.apply(builder))
}
