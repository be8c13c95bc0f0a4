//! Shared console output for summaries and rule listings.

use anyhow::Result;
use ruledoc_core::{Catalog, RunSummary, Severity};
use serde::Serialize;

use crate::OutputFormat;

/// Print a run summary in the specified format.
pub fn print_summary(summary: &RunSummary, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print_summary_text(summary),
        OutputFormat::Json => return print_json(summary),
    }
    Ok(())
}

fn print_summary_text(summary: &RunSummary) {
    if summary.is_empty() {
        println!("Nothing to do: no rules found or no outputs selected.");
        return;
    }

    for file in &summary.files {
        println!("  {:<13} {}", file.kind.to_string(), file.path.display());
    }
    println!(
        "\n\x1b[32mWrote {} file(s) for {} rule(s) from {} assembly(ies)\x1b[0m",
        summary.files.len(),
        summary.rules,
        summary.assemblies
    );
}

#[derive(Serialize)]
struct RuleRow<'a> {
    id: &'a str,
    category: &'a str,
    severity: Severity,
    enabled: bool,
    fix: bool,
    title: &'a str,
}

/// Print the master rule list in the specified format.
pub fn print_rules(catalog: &Catalog, format: OutputFormat) -> Result<()> {
    let rows: Vec<RuleRow<'_>> = catalog
        .rules()
        .map(|rule| RuleRow {
            id: rule.id(),
            category: rule.category(),
            severity: rule.default_severity(),
            enabled: rule.is_enabled_by_default(),
            fix: catalog.has_fix(rule.id()),
            title: rule.title(),
        })
        .collect();

    match format {
        OutputFormat::Text => print_rules_text(&rows),
        OutputFormat::Json => return print_json(&rows),
    }
    Ok(())
}

fn print_rules_text(rows: &[RuleRow<'_>]) {
    println!(
        "{:<12} {:<16} {:<8} {:<8} {:<4} Title",
        "ID", "Category", "Severity", "Enabled", "Fix"
    );
    println!("{}", "-".repeat(80));

    for row in rows {
        println!(
            "{:<12} {:<16} {:<8} {:<8} {:<4} {}",
            row.id,
            row.category,
            row.severity.to_string(),
            if row.enabled { "yes" } else { "no" },
            if row.fix { "yes" } else { "no" },
            row.title
        );
    }

    println!("\n{} rule(s)", rows.len());
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}
