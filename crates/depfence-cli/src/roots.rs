//! Sources of root package names for the `$gostd` macro.

use std::path::{Path, PathBuf};

use depfence_core::{RootPackages, RootPackagesError};
use tracing::debug;

/// Where root package names are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootSource {
    /// A text file with one name per line; blank lines and `#` comments are
    /// skipped.
    List(PathBuf),
    /// A Go installation; every directory under `<goroot>/src` is a root.
    Goroot(PathBuf),
    /// No source configured.
    Unset,
}

impl RootSource {
    /// Picks a source from the command line, preferring an explicit list.
    #[must_use]
    pub fn from_args(list: Option<PathBuf>, goroot: Option<PathBuf>) -> Self {
        match (list, goroot) {
            (Some(path), _) => Self::List(path),
            (None, Some(dir)) => Self::Goroot(dir),
            (None, None) => Self::Unset,
        }
    }
}

impl RootPackages for RootSource {
    fn root_packages(&self) -> Result<Vec<String>, RootPackagesError> {
        match self {
            Self::List(path) => read_list(path),
            Self::Goroot(dir) => scan_goroot(dir),
            Self::Unset => Err(RootPackagesError::new(
                "no source configured, pass --root-packages or --goroot (or set GOROOT)",
            )),
        }
    }
}

fn read_list(path: &Path) -> Result<Vec<String>, RootPackagesError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        RootPackagesError::new(format!("could not read {}: {e}", path.display()))
    })?;
    let names: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect();
    debug!(path = %path.display(), count = names.len(), "Read root package list");
    Ok(names)
}

fn scan_goroot(goroot: &Path) -> Result<Vec<String>, RootPackagesError> {
    let src = goroot.join("src");
    let read_error = |e: std::io::Error| {
        RootPackagesError::new(format!(
            "could not read GOROOT directory {}: {e}",
            src.display()
        ))
    };

    let mut names = Vec::new();
    for entry in std::fs::read_dir(&src).map_err(read_error)? {
        let entry = entry.map_err(read_error)?;
        if !entry.file_type().map_err(read_error)?.is_dir() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            names.push(name.to_string());
        }
    }
    names.sort();
    debug!(goroot = %goroot.display(), count = names.len(), "Scanned GOROOT");
    Ok(names)
}
