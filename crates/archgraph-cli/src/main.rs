//! archgraph CLI tool.
//!
//! Usage:
//! ```bash
//! archgraph check [OPTIONS] [PATH]
//! archgraph graph [--type NAME] [PATH]
//! archgraph list-rules
//! archgraph init
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Architecture tests for Rust crates and module metadata snapshots
#[derive(Parser)]
#[command(name = "archgraph")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate the configured rules
    Check {
        /// Crate to analyze when the config lists no modules (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Print the reference sets of the types under test
    Graph {
        /// Crate to analyze when the config lists no modules (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Only print types whose full name contains this text
        #[arg(short = 't', long = "type")]
        type_filter: Option<String>,

        /// Output format (compact prints one edge per line)
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// List available rules
    ListRules,

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Output format for command results.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One-line-per-item compact format.
    Compact,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Check { path, format } => {
            let source = config_resolver::resolve(&path, cli.config.as_deref());
            commands::check::run(&path, format, &source)
        }
        Commands::Graph {
            path,
            type_filter,
            format,
        } => {
            let source = config_resolver::resolve(&path, cli.config.as_deref());
            commands::graph::run(&path, type_filter.as_deref(), format, &source)
        }
        Commands::ListRules => {
            commands::list_rules::run();
            Ok(())
        }
        Commands::Init { force } => commands::init::run(force),
    }
}
