//! Graph command implementation.

use anyhow::Result;
use archgraph_core::{Analyzer, TypeKey};
use serde::Serialize;
use std::path::Path;

use super::project;
use crate::config_resolver::ConfigSource;
use crate::OutputFormat;

/// References of one type under test.
#[derive(Debug, Serialize)]
struct TypeReferences {
    #[serde(rename = "type")]
    name: String,
    internal: Vec<String>,
    external: Vec<String>,
}

/// Runs the graph command.
pub fn run(
    path: &Path,
    type_filter: Option<&str>,
    format: OutputFormat,
    config_source: &ConfigSource,
) -> Result<()> {
    let loaded = project::load_config(path, config_source)?;
    let analyzer = project::builder(&loaded)?.build()?;
    let entries = collect(&analyzer, type_filter);

    match format {
        OutputFormat::Text => {
            for entry in &entries {
                println!("{}", entry.name);
                for name in &entry.internal {
                    println!("  -> {name}");
                }
                for name in &entry.external {
                    println!("  => {name} (external)");
                }
            }
            println!("\n{} type(s)", entries.len());
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        OutputFormat::Compact => {
            for entry in &entries {
                for name in entry.internal.iter().chain(&entry.external) {
                    println!("{} {name}", entry.name);
                }
            }
        }
    }
    Ok(())
}

fn collect(analyzer: &Analyzer, type_filter: Option<&str>) -> Vec<TypeReferences> {
    let ctx = analyzer.context();
    let names = |keys: &std::collections::BTreeSet<TypeKey>| {
        keys.iter().map(ToString::to_string).collect::<Vec<_>>()
    };

    ctx.types_under_test()
        .filter(|ty| type_filter.map_or(true, |f| ty.name.full_name().contains(f)))
        .map(|ty| {
            let refs = ctx.references(ty);
            TypeReferences {
                name: ty.name.full_name(),
                internal: names(&refs.internal),
                external: names(&refs.external),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use archgraph_core::SourceIntrospector;
    use archgraph_rules::ArchitectureBuilder;

    fn fixture_analyzer() -> Analyzer {
        let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../archgraph-rules/tests/fixtures/app");
        let module = SourceIntrospector::new(root).introspect().unwrap();
        ArchitectureBuilder::for_module(module).build().unwrap()
    }

    #[test]
    fn filter_selects_matching_types() {
        let entries = collect(&fixture_analyzer(), Some("AtlanticTuna"));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "app.tuna.atlantic.AtlanticTuna");
        assert_eq!(entries[0].internal, vec!["app.salmon.Salmon"]);
        assert!(entries[0].external.is_empty());
    }

    #[test]
    fn every_type_under_test_is_listed() {
        assert_eq!(collect(&fixture_analyzer(), None).len(), 9);
    }
}
