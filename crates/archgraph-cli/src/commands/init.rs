//! Init command implementation.

use anyhow::{bail, Result};
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# archgraph configuration

[analysis]
# Stop after the first pipeline stage that reaches this many violations
max_violations = 15
# Violations reported per offending type / per isolated namespace
per_type_cutoff = 3
per_namespace_cutoff = 15

# Modules to load. Without this section the current crate is analyzed.
[[modules]]
path = "."
exclude = ["**/target/**"]

# Metadata snapshots can stand in for source:
# [[modules]]
# snapshot = "vendor/billing.json"
# reference_only = true

# [[isolate-namespace]]
# namespace = "app.domain"
# inbound = true
# outbound = true
# except = ["app.shared"]

# [[forbid-module-dependency]]
# pattern = "^openssl"

# [[used-only-by]]
# target = "app.db.Pool"
# allowed = ["app.repo.Repository"]

# [[type-shape]]
# target = "app.commands.Command"
# name-ends-with = "Command"
# access = ["public"]
#
# [[type-shape.methods]]
# method = "execute"
# attributes = ["instrument"]

# [[solution-module]]
# module = "app_web"
# forbid = ["app_infra"]
"#;

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    let config_path = Path::new("archgraph.toml");

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(config_path, DEFAULT_CONFIG)?;

    println!("Created archgraph.toml");
    println!("\nNext steps:");
    println!("  1. Uncomment and edit the rule sections");
    println!("  2. Run: archgraph check");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_parses() {
        let config = archgraph_core::Config::parse(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.analysis.max_violations, 15);
        assert_eq!(config.modules.len(), 1);
        assert!(archgraph_rules::declarative::load_rules_from_toml(DEFAULT_CONFIG)
            .unwrap()
            .is_empty());
    }
}
