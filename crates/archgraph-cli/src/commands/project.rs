//! Loading modules and rules for a CLI run.

use crate::config_resolver::ConfigSource;
use anyhow::{Context, Result};
use archgraph_core::{Config, ModuleSource};
use archgraph_rules::{declarative, ArchitectureBuilder};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Configuration text plus the directory its relative paths resolve against.
#[derive(Debug)]
pub struct LoadedConfig {
    pub content: String,
    pub config: Config,
    pub base_dir: PathBuf,
}

/// Reads and parses the resolved configuration.
///
/// With no `[[modules]]` entry, `path` itself is loaded as the module under
/// test. Relative module paths follow [`ConfigSource::base_dir`].
pub fn load_config(path: &Path, source: &ConfigSource) -> Result<LoadedConfig> {
    info!("Using {source}");
    let content = match source.path() {
        Some(p) => std::fs::read_to_string(p)
            .with_context(|| format!("Failed to read config file {}", p.display()))?,
        None => String::new(),
    };
    let base_dir = source.base_dir(path);
    debug!(base_dir = %base_dir.display(), "module paths resolve here");

    let mut config = Config::parse(&content)?;
    if config.modules.is_empty() {
        config.modules.push(ModuleSource {
            path: Some(path.to_path_buf()),
            ..ModuleSource::default()
        });
        return Ok(LoadedConfig {
            content,
            config,
            base_dir: PathBuf::from("."),
        });
    }

    Ok(LoadedConfig {
        content,
        config,
        base_dir,
    })
}

/// Loads every configured module and registers the declared rules.
pub fn builder(loaded: &LoadedConfig) -> Result<ArchitectureBuilder> {
    let builder = ArchitectureBuilder::from_config(&loaded.config, &loaded.base_dir)?;
    let builder = declarative::apply_toml(&loaded.content, builder)
        .context("Failed to load declarative rules")?;
    Ok(builder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_source_uses_path_as_module() {
        let tmp = TempDir::new().unwrap();
        let loaded = load_config(tmp.path(), &ConfigSource::Default).unwrap();
        assert!(loaded.content.is_empty());
        assert_eq!(loaded.config.modules.len(), 1);
        assert_eq!(loaded.config.modules[0].path.as_deref(), Some(tmp.path()));
    }

    #[test]
    fn project_modules_resolve_against_config_dir() {
        let tmp = TempDir::new().unwrap();
        let config = tmp.path().join("archgraph.toml");
        fs::write(&config, "[[modules]]\npath = \"crates/app\"\n").unwrap();

        let loaded = load_config(Path::new("."), &ConfigSource::Project(config)).unwrap();
        assert_eq!(loaded.base_dir, tmp.path());
        assert_eq!(
            loaded.config.modules[0].path.as_deref(),
            Some(Path::new("crates/app"))
        );
    }

    #[test]
    fn member_crate_loads_solution_modules() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join(".git")).unwrap();
        fs::write(
            tmp.path().join("archgraph.toml"),
            "[[modules]]\npath = \"crates/app\"\n",
        )
        .unwrap();
        let app = tmp.path().join("crates/app");
        fs::create_dir_all(&app).unwrap();

        let source = crate::config_resolver::resolve(&app, None);
        let loaded = load_config(&app, &source).unwrap();
        assert_eq!(loaded.base_dir, tmp.path());
        assert_eq!(
            loaded.config.modules[0].path.as_deref(),
            Some(Path::new("crates/app"))
        );
    }

    #[test]
    fn global_modules_resolve_against_path() {
        let global = TempDir::new().unwrap();
        let config = global.path().join("config.toml");
        fs::write(&config, "[[modules]]\npath = \"app\"\n").unwrap();

        let project = TempDir::new().unwrap();
        let loaded = load_config(project.path(), &ConfigSource::Global(config)).unwrap();
        assert_eq!(loaded.base_dir, project.path());
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let err = load_config(
            Path::new("."),
            &ConfigSource::Explicit(PathBuf::from("/nonexistent/archgraph.toml")),
        )
        .unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn invalid_declarative_rules_fail_to_load() {
        let fixture = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../archgraph-rules/tests/fixtures/app");
        let tmp = TempDir::new().unwrap();
        let config = tmp.path().join("archgraph.toml");
        fs::write(&config, "[[isolate-namespace]]\nnamespace = \"\"\n").unwrap();

        let loaded = load_config(&fixture, &ConfigSource::Explicit(config)).unwrap();
        let err = builder(&loaded).unwrap_err();
        assert!(format!("{err:#}").contains("isolate-namespace[0].namespace"));
    }
}
