//! Metadata snapshots produced by external extractors.

use super::{IntrospectError, ModuleIntrospector};
use crate::model::ModuleDescriptor;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads modules from a JSON or TOML snapshot.
///
/// The format is chosen by file extension (`.toml`, otherwise JSON). A file
/// holds either one module or `{ "modules": [...] }`.
#[derive(Debug, Clone)]
pub struct SnapshotIntrospector {
    path: PathBuf,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotFile {
    Many { modules: Vec<ModuleDescriptor> },
    One(ModuleDescriptor),
}

impl SnapshotIntrospector {
    /// Creates an introspector for `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Snapshot path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Decodes snapshot text; `is_toml` selects the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the text does not decode to a module list.
    pub fn parse(&self, content: &str, is_toml: bool) -> Result<Vec<ModuleDescriptor>, IntrospectError> {
        let decoded: Result<SnapshotFile, String> = if is_toml {
            toml::from_str(content).map_err(|e| e.to_string())
        } else {
            serde_json::from_str(content).map_err(|e| e.to_string())
        };

        let file = decoded.map_err(|message| IntrospectError::Snapshot {
            path: self.path.clone(),
            message,
        })?;

        Ok(match file {
            SnapshotFile::Many { modules } => modules,
            SnapshotFile::One(module) => vec![module],
        })
    }
}

impl ModuleIntrospector for SnapshotIntrospector {
    fn load(&self) -> Result<Vec<ModuleDescriptor>, IntrospectError> {
        let content = std::fs::read_to_string(&self.path).map_err(|source| IntrospectError::Io {
            path: self.path.clone(),
            source,
        })?;
        let is_toml = self.path.extension().is_some_and(|e| e == "toml");
        let modules = self.parse(&content, is_toml)?;

        debug!(
            "Loaded {} module(s) from snapshot {}",
            modules.len(),
            self.path.display()
        );
        Ok(modules)
    }
}
