//! # archgraph
//!
//! Architecture tests for Rust crates.
//!
//! This is the main facade crate that re-exports core functionality, macros, and rules.
//!
//! ## Quick Start: `cargo test` Integration
//!
//! ```toml
//! [dev-dependencies]
//! archgraph = "0.1"
//! ```
//!
//! ```rust,ignore
//! // tests/architecture.rs
//! archgraph::check!();
//! ```
//!
//! This runs every rule declared in `archgraph.toml` as part of `cargo test`.
//! Without `[[modules]]`, the crate containing the test is checked.
//!
//! ## Programmatic Usage
//!
//! ```rust,ignore
//! use archgraph::rules::ArchitectureBuilder;
//! use archgraph::SourceIntrospector;
//!
//! let app = SourceIntrospector::new(".").introspect()?;
//! ArchitectureBuilder::for_module(app)
//!     .with_namespace_isolated("app.domain")
//!     .with_type("app.commands.Command", |t| t.with_name_ends_with("Command"))
//!     .should_be_valid()?;
//! ```

#![forbid(unsafe_code)]

// Re-export core types and traits
pub use archgraph_core::*;

// Re-export the check macro for archgraph::check!()
pub use archgraph_macros::check;

/// Built-in validators, builders and declarative rules.
pub mod rules {
    pub use archgraph_rules::*;
}

pub use archgraph_rules::ArchitectureBuilder;

mod runner;

#[doc(hidden)]
pub mod __internal {
    pub use crate::runner::run_check;
}
