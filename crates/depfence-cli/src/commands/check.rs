//! Check command implementation.

use anyhow::{Context, Result};
use depfence_core::{Checker, ImportOccurrence, MissingListPolicy};
use std::io::Read;
use std::path::Path;

use crate::roots::RootSource;
use crate::OutputFormat;

/// Runs the check command.
pub fn run(
    config_path: Option<&Path>,
    source: RootSource,
    imports: &str,
    format: OutputFormat,
    disallow_missing: bool,
) -> Result<()> {
    let settings = super::compile(config_path, source)?;
    let occurrences = read_occurrences(imports)?;

    let policy = if disallow_missing {
        MissingListPolicy::Deny
    } else {
        MissingListPolicy::Allow
    };

    tracing::info!(
        "Checking {} import(s) against {} rule list(s)",
        occurrences.len(),
        settings.len()
    );

    let report = Checker::new(&settings)
        .missing_lists(policy)
        .check(occurrences);

    super::output::print(&report, format)?;

    if report.has_issues() {
        std::process::exit(1);
    }

    Ok(())
}

/// Reads a JSON array of occurrences from a file, or stdin for `-`.
fn read_occurrences(imports: &str) -> Result<Vec<ImportOccurrence>> {
    let content = if imports == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read imports from stdin")?;
        buf
    } else {
        std::fs::read_to_string(imports)
            .with_context(|| format!("Failed to read imports file: {imports}"))?
    };
    parse_occurrences(&content).with_context(|| format!("Failed to parse imports: {imports}"))
}

fn parse_occurrences(content: &str) -> Result<Vec<ImportOccurrence>> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(content)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_occurrence_array() {
        let occurrences = parse_occurrences(
            r#"[{"identifier": "os", "file": "main.go", "line": 3, "column": 2}]"#,
        )
        .unwrap();
        assert_eq!(occurrences, vec![ImportOccurrence::new("os", "main.go", 3, 2)]);
    }

    #[test]
    fn blank_input_has_no_occurrences() {
        assert!(parse_occurrences("\n").unwrap().is_empty());
    }

    #[test]
    fn malformed_input_is_an_error() {
        assert!(parse_occurrences(r#"[{"identifier": "os"}]"#).is_err());
    }

    #[test]
    fn reads_occurrences_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("imports.json");
        std::fs::write(
            &path,
            r#"[{"identifier": "fmt", "file": "a.go", "line": 1, "column": 8}]"#,
        )
        .unwrap();

        let occurrences = read_occurrences(path.to_str().unwrap()).unwrap();
        assert_eq!(occurrences.len(), 1);
        assert_eq!(occurrences[0].identifier, "fmt");
    }
}
