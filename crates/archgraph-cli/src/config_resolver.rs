//! Locating `archgraph.toml` for a CLI run.
//!
//! The analyzed crate often sits below the file that lists the solution's
//! `[[modules]]`, so project configs are searched from PATH upwards:
//!
//! 1. `--config` flag (explicit path)
//! 2. `archgraph.toml` or `.archgraph.toml` in PATH or the nearest ancestor,
//!    stopping at the repository root (a directory holding `.git`)
//! 3. `~/.archgraph/config.toml` (or `$ARCHGRAPH_CONFIG_DIR/config.toml`)
//! 4. No config found → PATH is the only module, no rules
//!
//! Module paths in a config resolve against the directory of that config.
//! A global config has no project of its own, so its paths resolve against
//! PATH.

use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where the configuration was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Given with `--config`.
    Explicit(PathBuf),
    /// Found in PATH or one of its ancestors.
    Project(PathBuf),
    /// Found in the global config directory.
    Global(PathBuf),
    /// Nothing found.
    Default,
}

impl ConfigSource {
    /// The config file, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }

    /// Directory that relative `path` / `snapshot` entries resolve against.
    #[must_use]
    pub fn base_dir(&self, project_dir: &Path) -> PathBuf {
        match self {
            Self::Explicit(p) | Self::Project(p) => match p.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            },
            Self::Global(_) | Self::Default => project_dir.to_path_buf(),
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit(p) => write!(f, "{} (--config)", p.display()),
            Self::Project(p) => write!(f, "{} (project)", p.display()),
            Self::Global(p) => write!(f, "{} (global)", p.display()),
            Self::Default => f.write_str("built-in defaults"),
        }
    }
}

const PROJECT_CONFIG_NAMES: &[&str] = &["archgraph.toml", ".archgraph.toml"];

const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// Resolves the configuration for `project_dir`.
#[must_use]
pub fn resolve(project_dir: &Path, explicit: Option<&Path>) -> ConfigSource {
    resolve_inner(project_dir, explicit, global_config_dir())
}

fn resolve_inner(
    project_dir: &Path,
    explicit: Option<&Path>,
    global_dir: Option<PathBuf>,
) -> ConfigSource {
    if let Some(p) = explicit {
        return ConfigSource::Explicit(p.to_path_buf());
    }

    if let Some(found) = find_project_config(project_dir) {
        debug!("Found project config: {}", found.display());
        return ConfigSource::Project(found);
    }

    global_dir
        .map(|dir| dir.join(GLOBAL_CONFIG_NAME))
        .filter(|candidate| candidate.is_file())
        .map_or(ConfigSource::Default, ConfigSource::Global)
}

/// Nearest project config at or above `start`, not crossing the repository root.
fn find_project_config(start: &Path) -> Option<PathBuf> {
    for dir in start.ancestors() {
        let found = PROJECT_CONFIG_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file());
        if found.is_some() {
            return found;
        }
        if dir.join(".git").exists() {
            break;
        }
    }
    None
}

/// `$ARCHGRAPH_CONFIG_DIR`, else `~/.archgraph`.
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("ARCHGRAPH_CONFIG_DIR") {
        return Some(PathBuf::from(dir));
    }
    home::home_dir().map(|h| h.join(".archgraph"))
}
