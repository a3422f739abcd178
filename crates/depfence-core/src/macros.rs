//! Macro tokens expanded into literal patterns before compilation.
//!
//! Two independent domains exist, each with its own closed set of tokens:
//!
//! | Domain  | Token    | Expansion                          |
//! |---------|----------|------------------------------------|
//! | files   | `$all`   | `**/*.go`                          |
//! | files   | `$test`  | `**/*_test.go`                     |
//! | imports | `$gostd` | every well-known root package name |
//!
//! The root package names are not computed here. They come from a
//! [`RootPackages`] supplier handed to the compiler, usually wrapped in a
//! [`CachedRootPackages`] so the supplier runs at most once per process.

use std::sync::OnceLock;

use tracing::debug;

use crate::error::RuleError;

/// Leading character of every macro token.
pub const MACRO_SIGIL: char = '$';

/// Returns true if `token` is written as a macro (starts with `$`).
#[must_use]
pub fn is_macro(token: &str) -> bool {
    token.starts_with(MACRO_SIGIL)
}

/// Macros usable in a list's `files` entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileMacro {
    /// `$all`: every Go source file.
    All,
    /// `$test`: only Go test files.
    Test,
}

impl FileMacro {
    /// Looks up a file macro by its token.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "$all" => Some(Self::All),
            "$test" => Some(Self::Test),
            _ => None,
        }
    }

    /// Returns the token this macro is written as.
    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Self::All => "$all",
            Self::Test => "$test",
        }
    }

    /// Returns the literal glob patterns this macro stands for.
    #[must_use]
    pub fn expansion(self) -> &'static [&'static str] {
        match self {
            Self::All => &["**/*.go"],
            Self::Test => &["**/*_test.go"],
        }
    }
}

/// Macros usable in a list's `allow` entries and `deny` keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportMacro {
    /// `$gostd`: every well-known root package.
    RootPackages,
}

impl ImportMacro {
    /// Looks up an import macro by its token.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "$gostd" => Some(Self::RootPackages),
            _ => None,
        }
    }

    /// Returns the token this macro is written as.
    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Self::RootPackages => "$gostd",
        }
    }

    /// Expands this macro using the given supplier.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::RootPackages`] if the supplier fails.
    pub fn expand(self, roots: &dyn RootPackages) -> Result<Vec<String>, RuleError> {
        match self {
            Self::RootPackages => Ok(roots.root_packages()?),
        }
    }
}

/// Expands a single `files` token.
///
/// Non-macro tokens are returned unchanged.
///
/// # Errors
///
/// Returns [`RuleError::UnknownMacro`] for an unrecognized `$` token.
pub fn expand_file_token(token: &str) -> Result<Vec<String>, RuleError> {
    if !is_macro(token) {
        return Ok(vec![token.to_string()]);
    }
    FileMacro::parse(token)
        .map(|m| m.expansion().iter().map(|s| (*s).to_string()).collect())
        .ok_or_else(|| RuleError::UnknownMacro {
            token: token.to_string(),
        })
}

/// Expands a single `allow` entry or `deny` key.
///
/// Non-macro tokens are returned unchanged.
///
/// # Errors
///
/// Returns [`RuleError::UnknownMacro`] for an unrecognized `$` token, or
/// [`RuleError::RootPackages`] if the supplier fails.
pub fn expand_import_token(
    token: &str,
    roots: &dyn RootPackages,
) -> Result<Vec<String>, RuleError> {
    if !is_macro(token) {
        return Ok(vec![token.to_string()]);
    }
    ImportMacro::parse(token)
        .ok_or_else(|| RuleError::UnknownMacro {
            token: token.to_string(),
        })?
        .expand(roots)
}

/// Expands every token of a sequence in place.
///
/// A macro token is replaced at its own position by all of its expansions, so
/// the relative order of the surrounding literals is preserved. Tokens that
/// fail to expand are dropped from the output and their errors are returned
/// alongside it.
pub fn expand_in_place<F>(tokens: &[String], mut expand: F) -> (Vec<String>, Vec<RuleError>)
where
    F: FnMut(&str) -> Result<Vec<String>, RuleError>,
{
    let mut expanded = Vec::with_capacity(tokens.len());
    let mut errors = Vec::new();
    for token in tokens {
        match expand(token) {
            Ok(literals) => expanded.extend(literals),
            Err(e) => errors.push(e),
        }
    }
    (expanded, errors)
}

// ────────────────────────────────────────────
// Root package suppliers
// ────────────────────────────────────────────

/// Failure reported by a [`RootPackages`] supplier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("could not list root packages: {message}")]
pub struct RootPackagesError {
    message: String,
}

impl RootPackagesError {
    /// Creates a supplier error with a human-readable cause.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the cause.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Supplies the process-static list of well-known root package names used by
/// the `$gostd` macro.
pub trait RootPackages: Send + Sync {
    /// Returns every root package name.
    ///
    /// # Errors
    ///
    /// Returns an error if the names cannot be determined.
    fn root_packages(&self) -> Result<Vec<String>, RootPackagesError>;
}

impl<F> RootPackages for F
where
    F: Fn() -> Result<Vec<String>, RootPackagesError> + Send + Sync,
{
    fn root_packages(&self) -> Result<Vec<String>, RootPackagesError> {
        self()
    }
}

/// A fixed list of root package names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticRootPackages(Vec<String>);

impl StaticRootPackages {
    /// Creates a supplier that always returns `names`.
    #[must_use]
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }
}

impl RootPackages for StaticRootPackages {
    fn root_packages(&self) -> Result<Vec<String>, RootPackagesError> {
        Ok(self.0.clone())
    }
}

/// Memoizes the first successful answer of another supplier.
///
/// Concurrent first calls may each run the inner supplier; the first value
/// stored wins and every later call reads it. Failures are not cached.
#[derive(Debug)]
pub struct CachedRootPackages<S> {
    inner: S,
    cache: OnceLock<Vec<String>>,
}

impl<S: RootPackages> CachedRootPackages<S> {
    /// Wraps `inner` with a compute-once cache.
    #[must_use]
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            cache: OnceLock::new(),
        }
    }

    /// Returns true once a value has been cached.
    #[must_use]
    pub fn is_cached(&self) -> bool {
        self.cache.get().is_some()
    }
}

impl<S: RootPackages> RootPackages for CachedRootPackages<S> {
    fn root_packages(&self) -> Result<Vec<String>, RootPackagesError> {
        if let Some(cached) = self.cache.get() {
            return Ok(cached.clone());
        }
        let computed = self.inner.root_packages()?;
        debug!(count = computed.len(), "Caching root package names");
        Ok(self.cache.get_or_init(|| computed).clone())
    }
}
