//! Rules evaluated against a three-module solution loaded from a metadata snapshot.

use archgraph_core::{Config, ModuleDescriptor, ModuleIntrospector, SnapshotIntrospector};
use archgraph_rules::ArchitectureBuilder;
use std::path::{Path, PathBuf};

fn snapshot_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/billing.snapshot.json")
}

fn solution() -> Vec<ModuleDescriptor> {
    SnapshotIntrospector::new(snapshot_path()).load().unwrap()
}

fn currents(report: &archgraph_core::ValidationReport) -> Vec<&str> {
    report.violations.iter().map(|v| v.current.as_str()).collect()
}

#[test]
fn snapshot_holds_every_module() {
    let modules = solution();
    let names: Vec<&str> = modules.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["Billing.Domain", "Billing.Infrastructure", "Billing.Web"]);
}

#[test]
fn generated_closures_do_not_count_as_dependants() {
    let report = ArchitectureBuilder::for_modules(solution())
        .with_dependency_used_only(
            "Billing.Domain.Ledger",
            ["Billing.Infrastructure.LedgerStore"],
            true,
        )
        .evaluate()
        .unwrap();
    assert_eq!(currents(&report), vec!["Billing.Web.LedgerController"]);

    let report = ArchitectureBuilder::for_modules(solution())
        .with_dependency_used_only(
            "Billing.Domain.Ledger",
            ["Billing.Infrastructure.LedgerStore"],
            false,
        )
        .evaluate()
        .unwrap();
    assert_eq!(
        currents(&report),
        vec!["Billing.Web.LedgerController", "Billing.Web.<>c__DisplayClass0_0"]
    );
}

#[test]
fn generic_interface_method_needs_marker_on_every_implementation() {
    let report = ArchitectureBuilder::for_modules(solution())
        .with_type("Billing.Domain.IHandler", |t| {
            t.with_method("Handle", |m| m.with_required_attribute("TransactionalAttribute"))
        })
        .evaluate()
        .unwrap();
    assert_eq!(currents(&report), vec!["Billing.Web.RefundHandler"]);
    assert_eq!(report.violations[0].code, "AG031");
}

#[test]
fn web_must_not_reach_infrastructure() {
    let report = ArchitectureBuilder::for_modules(solution())
        .module_in_solution("Billing.Web", |m| {
            m.with_forbidden_solution_dependencies(["Billing.Infrastructure"])
        })
        .with_module_forbidden_dependency("^Newtonsoft")
        .evaluate()
        .unwrap();

    let lines: Vec<String> = report
        .violations
        .iter()
        .map(|v| format!("{} {}", v.code, v.message))
        .collect();
    assert_eq!(
        lines,
        vec![
            "AG010 Module 'Billing.Web' depends on forbidden module 'Newtonsoft.Json@13.0.0.0'",
            "AG011 Module 'Billing.Web' is forbidden to depend on solution module 'Billing.Infrastructure'",
        ]
    );
}

#[test]
fn domain_references_nothing_outside_itself() {
    ArchitectureBuilder::for_modules(solution())
        .with_namespace_no_outbound_dependencies("Billing.Domain")
        .should_be_valid()
        .unwrap();
}

#[test]
fn snapshot_modules_load_from_config() {
    let config = Config::parse(
        r#"
[[modules]]
snapshot = "tests/fixtures/billing.snapshot.json"
"#,
    )
    .unwrap();
    let builder =
        ArchitectureBuilder::from_config(&config, Path::new(env!("CARGO_MANIFEST_DIR"))).unwrap();
    assert_eq!(builder.modules_under_test().len(), 3);
}
