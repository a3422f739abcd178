//! Subcommand implementations.

pub mod check;
pub mod lists;
pub mod output;
pub mod validate;

use anyhow::{Context, Result};
use depfence_core::{config, CachedRootPackages, CompiledSettings, RawSettings, SettingsError};
use std::path::Path;

use crate::roots::RootSource;

/// Reads the configuration file, or returns empty settings when none is given.
fn load_raw(config_path: Option<&Path>) -> Result<RawSettings> {
    match config_path {
        Some(path) => config::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display())),
        None => {
            tracing::info!("No config file given, using the default rule list");
            Ok(RawSettings::new())
        }
    }
}

/// Loads and compiles the configuration.
///
/// The outer error covers loading; the inner one carries compilation errors
/// so callers can render them.
fn try_compile(
    config_path: Option<&Path>,
    source: RootSource,
) -> Result<Result<CompiledSettings, SettingsError>> {
    let raw = load_raw(config_path)?;
    let roots = CachedRootPackages::new(source);
    Ok(CompiledSettings::compile(&raw, &roots))
}

/// Loads and compiles the configuration, failing on any error.
fn compile(config_path: Option<&Path>, source: RootSource) -> Result<CompiledSettings> {
    try_compile(config_path, source)?.context("Invalid configuration")
}
