//! Configuration deserialization types (DTO layer).
//!
//! These types exist solely for serde deserialization. They are compiled into
//! [`CompiledList`](crate::CompiledList) values by the list compiler, which is
//! where every field is validated.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Raw rule lists keyed by list name.
///
/// A `BTreeMap` so list names come out in ascending order.
pub type RawSettings = BTreeMap<String, RawList>;

/// One rule list as written by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawList {
    /// File patterns the list applies to; a leading `!` negates an entry.
    #[serde(default)]
    pub files: Vec<String>,

    /// Allowed import patterns.
    #[serde(default)]
    pub allow: Vec<String>,

    /// Denied import patterns mapped to an advisory message (may be empty).
    #[serde(default)]
    pub deny: BTreeMap<String, String>,

    /// Resolution mode, case-insensitive. Empty means `original`.
    #[serde(default, alias = "listMode", alias = "list-mode")]
    pub mode: String,

    /// Skip imports of root packages instead of checking them.
    #[serde(default, alias = "excludeRoot", alias = "exclude-root")]
    pub exclude_root: bool,
}

impl RawList {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the file patterns.
    #[must_use]
    pub fn files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files = files.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the allow patterns.
    #[must_use]
    pub fn allow<I, S>(mut self, allow: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allow = allow.into_iter().map(Into::into).collect();
        self
    }

    /// Adds a deny pattern with its advisory message.
    #[must_use]
    pub fn deny(mut self, pattern: impl Into<String>, message: impl Into<String>) -> Self {
        self.deny.insert(pattern.into(), message.into());
        self
    }

    /// Sets whether root package imports are skipped.
    #[must_use]
    pub fn exclude_root(mut self, exclude: bool) -> Self {
        self.exclude_root = exclude;
        self
    }

    /// Sets the resolution mode string.
    #[must_use]
    pub fn mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = mode.into();
        self
    }
}
