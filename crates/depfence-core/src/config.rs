//! Configuration loading.
//!
//! Reads TOML, JSON or YAML text into [`RawSettings`]. The top level of every
//! format is a map from list name to list body:
//!
//! ```toml
//! [main]
//! files = ["$all", "!$test"]
//! allow = ["$gostd", "github.com/"]
//!
//! [main.deny]
//! "github.com/pkg/errors" = "use the standard errors package"
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config_dto::RawSettings;

/// Supported configuration formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigFormat {
    /// TOML.
    Toml,
    /// JSON.
    Json,
    /// YAML.
    Yaml,
}

impl ConfigFormat {
    /// Detects the format from a file extension (`toml`, `json`, `yaml`,
    /// `yml`), ignoring case.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Toml => write!(f, "TOML"),
            Self::Json => write!(f, "JSON"),
            Self::Yaml => write!(f, "YAML"),
        }
    }
}

/// Parses configuration text.
///
/// Blank content is an empty configuration in every format.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] if the text is not valid for `format` or
/// does not have the expected shape.
pub fn parse(content: &str, format: ConfigFormat) -> Result<RawSettings, ConfigError> {
    if content.trim().is_empty() {
        return Ok(RawSettings::new());
    }

    let parse_error = |message: String| ConfigError::Parse { format, message };
    match format {
        ConfigFormat::Toml => toml::from_str(content).map_err(|e| parse_error(e.to_string())),
        ConfigFormat::Json => {
            serde_json::from_str(content).map_err(|e| parse_error(e.to_string()))
        }
        ConfigFormat::Yaml => {
            serde_yaml::from_str(content).map_err(|e| parse_error(e.to_string()))
        }
    }
}

/// Loads configuration from a file, choosing the format from its extension.
///
/// # Errors
///
/// Returns an error if the extension is not recognized, or the file cannot be
/// read or parsed.
pub fn from_file(path: &Path) -> Result<RawSettings, ConfigError> {
    let format = ConfigFormat::from_path(path).ok_or_else(|| ConfigError::UnknownFormat {
        path: path.to_path_buf(),
    })?;
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let settings = parse(&content, format)?;
    debug!(path = %path.display(), %format, lists = settings.len(), "Loaded configuration");
    Ok(settings)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse {format} config: {message}")]
    Parse {
        /// Format the text was parsed as.
        format: ConfigFormat,
        /// Parse error message.
        message: String,
    },

    /// The file extension does not name a supported format.
    #[error("Unsupported config file {path}: expected a .toml, .json, .yaml or .yml file")]
    UnknownFormat {
        /// The offending path.
        path: PathBuf,
    },
}
