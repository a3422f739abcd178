//! Shared output formatting for check results.

use anyhow::Result;
use depfence_core::{CheckReport, IssueKind};

use crate::OutputFormat;

/// Print check results in the specified format.
pub fn print(report: &CheckReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(report),
        OutputFormat::Json => return print_json(report),
        OutputFormat::Compact => print_compact(report),
    }
    Ok(())
}

fn print_text(report: &CheckReport) {
    for issue in &report.issues {
        let indicator = match issue.kind {
            IssueKind::Denied => "\x1b[31mdenied\x1b[0m",
            IssueKind::NotAllowed => "\x1b[33mnot allowed\x1b[0m",
            IssueKind::NoApplicableList => "\x1b[34mno rule list\x1b[0m",
        };

        println!("{}", issue.format_with_label(indicator));
    }

    let summary_color = if report.has_issues() {
        "\x1b[31m"
    } else {
        "\x1b[32m"
    };
    println!("{summary_color}{}\x1b[0m", report.summary());
}

fn print_json(report: &CheckReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{json}");
    Ok(())
}

fn print_compact(report: &CheckReport) {
    for issue in &report.issues {
        println!("{issue}");
    }
}
