//! depfence CLI tool.
//!
//! Usage:
//! ```bash
//! depfence check --config .depfence.toml --imports imports.json
//! depfence lists --config .depfence.toml cmd/main.go
//! depfence validate --config .depfence.toml
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod roots;

/// Import allow/deny list checker
#[derive(Parser)]
#[command(name = "depfence")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file (.toml, .json, .yaml or .yml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// File listing root package names, one per line
    #[arg(long, global = true, env = "DEPFENCE_ROOT_PACKAGES")]
    root_packages: Option<PathBuf>,

    /// Go installation whose `src` directories are the root packages
    #[arg(long, global = true, env = "GOROOT")]
    goroot: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check import occurrences against the rule lists
    Check {
        /// JSON array of import occurrences ("-" reads stdin)
        #[arg(short, long, default_value = "-")]
        imports: String,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Report imports in files that no rule list applies to
        #[arg(long)]
        disallow_missing: bool,
    },

    /// Show which rule lists apply to each path
    Lists {
        /// File paths to resolve
        #[arg(required = true)]
        paths: Vec<String>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Compile the configuration and report every error
    Validate,
}

/// Output format for command results.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One-line-per-issue compact format.
    Compact,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let source = roots::RootSource::from_args(cli.root_packages, cli.goroot);
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Check {
            imports,
            format,
            disallow_missing,
        } => commands::check::run(config, source, &imports, format, disallow_missing),
        Commands::Lists { paths, format } => commands::lists::run(config, source, &paths, format),
        Commands::Validate => commands::validate::run(config, source),
    }
}
