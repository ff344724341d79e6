//! Module metadata sources.
//!
//! Rule evaluation never touches the file system; everything it needs is
//! loaded up front by a [`ModuleIntrospector`].

mod resolve;
mod snapshot;
mod source;

pub use snapshot::SnapshotIntrospector;
pub use source::SourceIntrospector;

use crate::config::{ConfigurationError, ModuleSource};
use crate::model::ModuleDescriptor;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Loads module metadata from some source.
pub trait ModuleIntrospector {
    /// Loads every module this source describes.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read or decoded.
    fn load(&self) -> Result<Vec<ModuleDescriptor>, IntrospectError>;
}

/// Errors from loading module metadata.
#[derive(Debug, Error)]
pub enum IntrospectError {
    /// IO error reading a file or directory.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Directory walk failed.
    #[error("Failed to walk {path}: {source}")]
    Walk {
        /// Walk root.
        path: PathBuf,
        /// Underlying walker error.
        source: ignore::Error,
    },

    /// A Rust source file failed to parse.
    #[error("Parse error in {path}: {message}")]
    Parse {
        /// Path to the file that failed to parse.
        path: PathBuf,
        /// Parse error message.
        message: String,
    },

    /// `Cargo.toml` is missing or malformed.
    #[error("Invalid manifest {path}: {message}")]
    Manifest {
        /// Manifest path.
        path: PathBuf,
        /// What is wrong with it.
        message: String,
    },

    /// A metadata snapshot could not be decoded.
    #[error("Invalid snapshot {path}: {message}")]
    Snapshot {
        /// Snapshot path.
        path: PathBuf,
        /// Decoder error message.
        message: String,
    },

    /// An exclude pattern is not a valid glob.
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),
}

/// Builds the introspector for one `[[modules]]` entry.
///
/// Relative paths are resolved against `base_dir`.
///
/// # Errors
///
/// Returns an error unless exactly one of `path` and `snapshot` is set.
pub fn introspector_for(
    source: &ModuleSource,
    index: usize,
    base_dir: &Path,
) -> Result<Box<dyn ModuleIntrospector>, ConfigurationError> {
    match (&source.path, &source.snapshot) {
        (Some(path), None) => Ok(Box::new(
            SourceIntrospector::new(base_dir.join(path)).excludes(source.exclude.iter().cloned()),
        )),
        (None, Some(snapshot)) => Ok(Box::new(SnapshotIntrospector::new(base_dir.join(snapshot)))),
        _ => Err(ConfigurationError::AmbiguousModuleSource { index }),
    }
}
