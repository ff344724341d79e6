//! Shared output formatting for validation reports.

use anyhow::Result;
use archgraph_core::{ValidationReport, ViolationDiagnostic};

use crate::OutputFormat;

/// Print a report in the specified format.
pub fn print(report: &ValidationReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(report),
        OutputFormat::Json => return print_json(report),
        OutputFormat::Compact => print_compact(report),
    }
    Ok(())
}

fn print_text(report: &ValidationReport) {
    for violation in &report.violations {
        println!("{} {} in {}", violation.code, violation.rule, violation.current);
        let diagnostic = miette::Report::new(ViolationDiagnostic::from(violation));
        println!("{diagnostic:?}");
    }

    let summary_color = if report.is_valid() {
        "\x1b[32m"
    } else {
        "\x1b[31m"
    };
    println!("{}{}\x1b[0m", summary_color, report.summary());
}

fn print_json(report: &ValidationReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{json}");
    Ok(())
}

fn print_compact(report: &ValidationReport) {
    for line in compact_lines(report) {
        println!("{line}");
    }
}

fn compact_lines(report: &ValidationReport) -> Vec<String> {
    report
        .violations
        .iter()
        .map(|v| format!("{}: [{}] {}", v.current, v.code, v.message))
        .collect()
}
