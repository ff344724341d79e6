//! List rules command implementation.

use archgraph_rules::catalog;

/// Runs the list-rules command.
pub fn run() {
    println!("Available rules:\n");
    println!("{:<8} {:<30} {:<12} Description", "Code", "Name", "Stage");
    println!("{}", "-".repeat(96));

    for rule in catalog() {
        println!(
            "{:<8} {:<30} {:<12} {}",
            rule.code,
            rule.name,
            rule.kind.to_string(),
            rule.description
        );
    }

    println!("\nStages run in the order listed. Evaluation stops after a stage");
    println!("once `analysis.max_violations` is reached.");

    println!("\nDeclare rules in archgraph.toml, e.g.:");
    println!("  [[isolate-namespace]]");
    println!("  namespace = \"app.domain\"");
}
