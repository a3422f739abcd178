//! # depfence-core
//!
//! Rule compilation and resolution engine for import allow/deny lists.
//!
//! A configuration is a set of named rule lists. Each list says which files it
//! applies to, which import identifiers it allows or denies, and how allow and
//! deny matches combine ([`ListMode`]). This crate provides:
//!
//! - [`config`] for reading TOML, JSON or YAML into [`RawSettings`]
//! - [`CompiledSettings`] for compiling every list and finding the lists that
//!   apply to a file
//! - [`CompiledList::import_allowed`] for the per-list [`Verdict`]
//! - [`Checker`] for turning import occurrences into a [`CheckReport`]
//!
//! ## Example
//!
//! ```
//! use depfence_core::{CompiledSettings, RawList, RawSettings, StaticRootPackages};
//!
//! let mut raw = RawSettings::new();
//! raw.insert(
//!     "main".to_string(),
//!     RawList::new()
//!         .files(["$all", "!$test"])
//!         .allow(["$gostd", "github.com/"])
//!         .deny("github.com/pkg/errors", "use the standard errors package"),
//! );
//!
//! let roots = StaticRootPackages::new(["fmt", "os"]);
//! let settings = CompiledSettings::compile(&raw, &roots)?;
//!
//! let main = settings.which_lists("cmd/main.go")[0];
//! assert!(main.import_allowed("os").allowed);
//!
//! let verdict = main.import_allowed("github.com/pkg/errors");
//! assert!(!verdict.allowed);
//! assert_eq!(verdict.suggestion, "use the standard errors package");
//! # Ok::<(), depfence_core::SettingsError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod check;
pub mod config;
mod config_dto;
mod error;
mod list;
pub mod macros;
pub mod pattern;
mod resolve;
mod settings;
mod types;

pub use check::{Checker, ImportOccurrence, MissingListPolicy};
pub use config::{ConfigError, ConfigFormat};
pub use config_dto::{RawList, RawSettings};
pub use error::{CompilationError, ListFailure, RuleError, SettingsError};
pub use list::{CompiledList, DenyRule, ListMode};
pub use macros::{CachedRootPackages, RootPackages, RootPackagesError, StaticRootPackages};
pub use pattern::{Pattern, PatternKind};
pub use resolve::Verdict;
pub use settings::{CompiledSettings, DEFAULT_LIST_NAME};
pub use types::{CheckReport, Issue, IssueKind, Location};
