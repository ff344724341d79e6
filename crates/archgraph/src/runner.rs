//! Internal runner for `check!()` macro integration.
//!
//! This module is `#[doc(hidden)]` and not part of the public API.
//! It is called by the generated test function from `archgraph::check!()`.

use archgraph_core::{ArchitectureError, Config, ModuleSource, ReferenceCache};
use archgraph_rules::{declarative, ArchitectureBuilder};
use std::path::{Path, PathBuf};

/// Config file names to search for, in priority order.
const CONFIG_CANDIDATES: &[&str] = &["archgraph.toml", ".archgraph.toml"];

/// Runs archgraph as part of `cargo test`.
///
/// Called by the `check!()` macro-generated test function. Every test in
/// the process shares one reference cache.
///
/// # Panics
///
/// Panics with a formatted report if violations are found, or if the
/// configuration, modules or rules cannot be loaded.
pub fn run_check(config_path: Option<&str>, fail_on_empty: bool) {
    let manifest_dir = manifest_dir();
    let root = find_project_root(&manifest_dir);
    let (content, base_dir) = read_config_content(&root, config_path);
    let config = with_default_module(parse_config(&content), &manifest_dir);

    let builder = ArchitectureBuilder::from_config(&config, &base_dir)
        .unwrap_or_else(|e| panic!("archgraph: failed to load modules: {e}"))
        .with_cache(ReferenceCache::shared());
    let builder = declarative::apply_toml(&content, builder)
        .unwrap_or_else(|e| panic!("archgraph: declarative config error: {e}"));

    match builder.should_be_valid() {
        Ok(report) if fail_on_empty && report.rules_evaluated == 0 => {
            panic!("archgraph: no rules configured (fail_on_empty = true)");
        }
        Ok(_) => {}
        Err(ArchitectureError::Invalid { report, .. }) => {
            panic!("{}", report.format_test_report());
        }
        Err(e) => panic!("archgraph: {e}"),
    }
}

/// Reads the raw TOML content from the config file, and the directory
/// relative module paths resolve against.
///
/// Returns an empty string and `root` if no config file is found.
fn read_config_content(root: &Path, explicit_path: Option<&str>) -> (String, PathBuf) {
    let read = |path: &Path| {
        let content = std::fs::read_to_string(path).unwrap_or_else(|e| {
            panic!(
                "archgraph: failed to read config from {}: {e}",
                path.display()
            );
        });
        let base = path.parent().map_or_else(|| root.to_path_buf(), Path::to_path_buf);
        (content, base)
    };

    if let Some(path) = explicit_path {
        let full_path = if Path::new(path).is_absolute() {
            PathBuf::from(path)
        } else {
            root.join(path)
        };
        return read(&full_path);
    }

    CONFIG_CANDIDATES
        .iter()
        .map(|candidate| root.join(candidate))
        .find(|path| path.exists())
        .map_or_else(|| (String::new(), root.to_path_buf()), |path| read(&path))
}

/// Parses a `Config` from TOML content.
fn parse_config(content: &str) -> Config {
    if content.is_empty() {
        return Config::default();
    }
    Config::parse(content).unwrap_or_else(|e| {
        panic!("archgraph: failed to parse config: {e}");
    })
}

/// Without `[[modules]]`, the crate containing the test is checked.
fn with_default_module(mut config: Config, manifest_dir: &Path) -> Config {
    if config.modules.is_empty() {
        config.modules.push(ModuleSource {
            path: Some(manifest_dir.to_path_buf()),
            ..ModuleSource::default()
        });
    }
    config
}

/// Checks whether a `Cargo.toml` file defines a `[workspace]` section
/// by parsing as TOML, avoiding false positives from comments or strings.
fn has_workspace_section(cargo_toml: &Path) -> bool {
    let Ok(content) = std::fs::read_to_string(cargo_toml) else {
        return false;
    };
    let Ok(table) = content.parse::<toml::Table>() else {
        return false;
    };
    table.contains_key("workspace")
}

fn manifest_dir() -> PathBuf {
    std::env::var("CARGO_MANIFEST_DIR").map_or_else(
        |_| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        PathBuf::from,
    )
}

/// Finds the workspace root above the crate containing the test, or the
/// crate itself outside a workspace.
fn find_project_root(manifest_dir: &Path) -> PathBuf {
    manifest_dir
        .ancestors()
        .find(|candidate| has_workspace_section(&candidate.join("Cargo.toml")))
        .unwrap_or(manifest_dir)
        .to_path_buf()
}
