//! Lists command implementation.

use anyhow::Result;
use depfence_core::CompiledSettings;
use serde::Serialize;
use std::path::Path;

use crate::roots::RootSource;
use crate::OutputFormat;

/// Rule lists resolved for one path.
#[derive(Debug, Serialize)]
struct Applicable<'a> {
    path: &'a str,
    lists: Vec<&'a str>,
}

/// Runs the lists command.
pub fn run(
    config_path: Option<&Path>,
    source: RootSource,
    paths: &[String],
    format: OutputFormat,
) -> Result<()> {
    let settings = super::compile(config_path, source)?;
    let resolved = resolve(&settings, paths);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&resolved)?),
        OutputFormat::Text | OutputFormat::Compact => {
            for entry in &resolved {
                println!("{}", render(entry));
            }
        }
    }

    Ok(())
}

fn resolve<'a>(settings: &'a CompiledSettings, paths: &'a [String]) -> Vec<Applicable<'a>> {
    paths
        .iter()
        .map(|path| Applicable {
            path: path.as_str(),
            lists: settings
                .which_lists(path)
                .into_iter()
                .map(depfence_core::CompiledList::name)
                .collect(),
        })
        .collect()
}

fn render(entry: &Applicable<'_>) -> String {
    if entry.lists.is_empty() {
        format!("{}: (no rule list)", entry.path)
    } else {
        format!("{}: {}", entry.path, entry.lists.join(", "))
    }
}
