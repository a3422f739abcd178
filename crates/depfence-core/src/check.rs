//! Checking import occurrences against compiled settings.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::settings::CompiledSettings;
use crate::types::{CheckReport, Issue, IssueKind, Location};

/// One import found in a source file by the host's extraction layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImportOccurrence {
    /// Imported identifier, e.g. `github.com/pkg/errors`.
    pub identifier: String,
    /// File the import appears in.
    pub file: String,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
}

impl ImportOccurrence {
    /// Creates an occurrence.
    #[must_use]
    pub fn new(
        identifier: impl Into<String>,
        file: impl Into<String>,
        line: usize,
        column: usize,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            file: file.into(),
            line,
            column,
        }
    }

    /// Returns the occurrence's location.
    #[must_use]
    pub fn location(&self) -> Location {
        Location::new(self.file.clone(), self.line, self.column)
    }
}

/// What to do with imports in files no list applies to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MissingListPolicy {
    /// Accept them silently.
    #[default]
    Allow,
    /// Report each one as [`IssueKind::NoApplicableList`].
    Deny,
}

/// Turns per-list verdicts into reportable issues.
#[derive(Debug, Clone, Copy)]
pub struct Checker<'a> {
    settings: &'a CompiledSettings,
    missing_lists: MissingListPolicy,
}

impl<'a> Checker<'a> {
    /// Creates a checker that accepts files no list applies to.
    #[must_use]
    pub fn new(settings: &'a CompiledSettings) -> Self {
        Self {
            settings,
            missing_lists: MissingListPolicy::default(),
        }
    }

    /// Sets the policy for files no list applies to.
    #[must_use]
    pub fn missing_lists(mut self, policy: MissingListPolicy) -> Self {
        self.missing_lists = policy;
        self
    }

    /// Returns the issues raised by a single occurrence.
    ///
    /// Each applicable list that rejects the identifier contributes one issue.
    /// Lists that exclude root packages ignore imports of them.
    #[must_use]
    pub fn check_occurrence(&self, occurrence: &ImportOccurrence) -> Vec<Issue> {
        let lists = self.settings.which_lists(&occurrence.file);

        if lists.is_empty() {
            return match self.missing_lists {
                MissingListPolicy::Allow => Vec::new(),
                MissingListPolicy::Deny => vec![Issue::no_applicable_list(
                    occurrence.identifier.as_str(),
                    occurrence.location(),
                )],
            };
        }

        lists
            .into_iter()
            .filter_map(|list| {
                if list.skips_root(&occurrence.identifier) {
                    debug!(
                        identifier = %occurrence.identifier,
                        list = list.name(),
                        "Skipped root package"
                    );
                    return None;
                }
                let verdict = list.import_allowed(&occurrence.identifier);
                if verdict.allowed {
                    return None;
                }
                let kind = if verdict.is_denied_by_rule() {
                    IssueKind::Denied
                } else {
                    IssueKind::NotAllowed
                };
                debug!(
                    identifier = %occurrence.identifier,
                    list = list.name(),
                    %kind,
                    "Import rejected"
                );
                Some(
                    Issue::from_list(
                        kind,
                        occurrence.identifier.as_str(),
                        list.name(),
                        occurrence.location(),
                    )
                    .with_suggestion(verdict.suggestion),
                )
            })
            .collect()
    }

    /// Checks every occurrence and returns a report sorted by location.
    pub fn check<I>(&self, occurrences: I) -> CheckReport
    where
        I: IntoIterator<Item = ImportOccurrence>,
    {
        let mut report = CheckReport::new();
        for occurrence in occurrences {
            report.issues.extend(self.check_occurrence(&occurrence));
            report.occurrences_checked += 1;
        }
        report.sort();

        info!(
            occurrences = report.occurrences_checked,
            issues = report.issues.len(),
            "Checked imports"
        );
        report
    }
}
