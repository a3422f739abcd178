//! Validate command implementation.

use anyhow::Result;
use std::path::Path;

use crate::roots::RootSource;

/// Runs the validate command.
pub fn run(config_path: Option<&Path>, source: RootSource) -> Result<()> {
    match super::try_compile(config_path, source)? {
        Ok(settings) => {
            for list in settings.lists() {
                println!(
                    "{}: mode {}, {} file pattern(s), {} negated, {} allow, {} deny",
                    list.name(),
                    list.mode(),
                    list.files().len(),
                    list.negated_files().len(),
                    list.allow().len(),
                    list.deny().len(),
                );
                if list.excludes_root() {
                    println!("  root package imports are not checked");
                }
            }
            println!("\x1b[32mConfiguration OK: {} rule list(s)\x1b[0m", settings.len());
            Ok(())
        }
        Err(e) => {
            let count = e.rule_errors().count();
            eprintln!("{:?}", miette::Report::new(e));
            eprintln!("\x1b[31mFound {count} configuration error(s)\x1b[0m");
            std::process::exit(1);
        }
    }
}
