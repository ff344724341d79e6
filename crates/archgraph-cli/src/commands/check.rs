//! Check command implementation.

use anyhow::Result;
use std::path::Path;

use super::{output, project};
use crate::config_resolver::ConfigSource;
use crate::OutputFormat;

/// Runs the check command.
///
/// Exits with status 1 when any rule is violated.
pub fn run(path: &Path, format: OutputFormat, config_source: &ConfigSource) -> Result<()> {
    let loaded = project::load_config(path, config_source)?;
    let report = project::builder(&loaded)?.evaluate()?;

    output::print(&report, format)?;

    if !report.is_valid() {
        std::process::exit(1);
    }

    Ok(())
}
