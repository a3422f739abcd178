//! Core types for reported issues and check results.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Source code location of an import.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Location {
    /// File path, `/`-separated, relative to the project root.
    pub file: String,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
}

impl Location {
    /// Creates a new location.
    #[must_use]
    pub fn new(file: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Why an import was reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueKind {
    /// The list has allow patterns and none of them matched.
    NotAllowed,
    /// A deny pattern rejected the import.
    Denied,
    /// No list applies to the file and missing lists are disallowed.
    NoApplicableList,
}

impl IssueKind {
    /// Returns the stable issue code.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::NotAllowed => "DG001",
            Self::Denied => "DG002",
            Self::NoApplicableList => "DG003",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAllowed => write!(f, "not-allowed"),
            Self::Denied => write!(f, "denied"),
            Self::NoApplicableList => write!(f, "no-applicable-list"),
        }
    }
}

/// A rejected import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Why the import was rejected.
    pub kind: IssueKind,
    /// Imported identifier, as written.
    pub identifier: String,
    /// List that rejected the import; `None` when no list applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list: Option<String>,
    /// Where the import appears.
    pub location: Location,
    /// Advisory from the deny rule, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Issue {
    /// Creates an issue raised by the list named `list`.
    #[must_use]
    pub fn from_list(
        kind: IssueKind,
        identifier: impl Into<String>,
        list: impl Into<String>,
        location: Location,
    ) -> Self {
        Self {
            kind,
            identifier: identifier.into(),
            list: Some(list.into()),
            location,
            suggestion: None,
        }
    }

    /// Creates an issue for an import in a file no list applies to.
    #[must_use]
    pub fn no_applicable_list(identifier: impl Into<String>, location: Location) -> Self {
        Self {
            kind: IssueKind::NoApplicableList,
            identifier: identifier.into(),
            list: None,
            location,
            suggestion: None,
        }
    }

    /// Attaches an advisory; an empty one is ignored.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        let suggestion = suggestion.into();
        self.suggestion = (!suggestion.is_empty()).then_some(suggestion);
        self
    }

    /// Returns the issue code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Returns the reason phrase that follows the identifier.
    #[must_use]
    pub fn reason(&self) -> String {
        let list = self.list.as_deref().unwrap_or_default();
        match self.kind {
            IssueKind::NotAllowed => format!("is not in the allow list of '{list}'"),
            IssueKind::Denied => format!("is in the deny list of '{list}'"),
            IssueKind::NoApplicableList => "is in a file that matches no rule list".to_string(),
        }
    }

    /// Formats the issue for multi-line terminal output.
    #[must_use]
    pub fn format(&self) -> String {
        self.format_with_label(&self.kind.to_string())
    }

    /// Like [`Issue::format`], with `label` in place of the kind name, so
    /// callers can decorate it (e.g. with terminal colors).
    #[must_use]
    pub fn format_with_label(&self, label: &str) -> String {
        use std::fmt::Write;
        let mut output = format!("{} {label} at {}\n", self.code(), self.location);
        let _ = writeln!(output, "  {} {}", self.identifier, self.reason());
        if let Some(suggestion) = &self.suggestion {
            let _ = writeln!(output, "  = help: {suggestion}");
        }
        output
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} {}", self.location, self.identifier, self.reason())?;
        if let Some(suggestion) = &self.suggestion {
            write!(f, ": {suggestion}")?;
        }
        Ok(())
    }
}

/// Result of checking a batch of import occurrences.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CheckReport {
    /// Every issue found, sorted by location.
    pub issues: Vec<Issue>,
    /// Number of occurrences checked.
    pub occurrences_checked: usize,
}

impl CheckReport {
    /// Creates a new empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if any issue was found.
    #[must_use]
    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    /// Returns issues of one kind.
    #[must_use]
    pub fn by_kind(&self, kind: IssueKind) -> Vec<&Issue> {
        self.issues.iter().filter(|i| i.kind == kind).collect()
    }

    /// Counts issues as `(not allowed, denied, no applicable list)`.
    #[must_use]
    pub fn count_by_kind(&self) -> (usize, usize, usize) {
        let count = |kind: IssueKind| self.issues.iter().filter(|i| i.kind == kind).count();
        (
            count(IssueKind::NotAllowed),
            count(IssueKind::Denied),
            count(IssueKind::NoApplicableList),
        )
    }

    /// Sorts issues by file, line, column, then list name.
    pub fn sort(&mut self) {
        self.issues.sort_by(|a, b| {
            a.location
                .cmp(&b.location)
                .then_with(|| a.list.cmp(&b.list))
                .then_with(|| a.identifier.cmp(&b.identifier))
        });
    }

    /// Formats a one-line summary of the counts.
    #[must_use]
    pub fn summary(&self) -> String {
        let (not_allowed, denied, no_list) = self.count_by_kind();
        format!(
            "Found {} issue(s): {not_allowed} not allowed, {denied} denied, {no_list} without a rule list in {} import(s)",
            self.issues.len(),
            self.occurrences_checked
        )
    }
}
