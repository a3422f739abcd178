//! Compilation errors.
//!
//! Compilation never stops at the first problem: every independent error of a
//! list is collected into a [`CompilationError`], and every failing list of a
//! configuration is collected into a [`SettingsError`].

use miette::Diagnostic;

use crate::macros::RootPackagesError;

/// A single problem found while compiling one rule list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Diagnostic)]
pub enum RuleError {
    /// A glob literal was rejected by the glob grammar.
    #[error("`{pattern}` could not be compiled: {reason}")]
    #[diagnostic(code(depfence::pattern_syntax))]
    PatternSyntax {
        /// The offending literal, as written after macro expansion.
        pattern: String,
        /// Why the glob grammar rejected it.
        reason: String,
    },

    /// A `$`-prefixed token is not a known macro.
    #[error("unknown macro `{token}`")]
    #[diagnostic(
        code(depfence::unknown_macro),
        help("file macros: $all, $test; package macros: $gostd")
    )]
    UnknownMacro {
        /// The unrecognized token.
        token: String,
    },

    /// The list mode string does not name a known mode.
    #[error("{value} is not a known list mode")]
    #[diagnostic(
        code(depfence::unknown_list_mode),
        help("expected `original`, `strict` or `lax` (case-insensitive)")
    )]
    UnknownListMode {
        /// The offending mode value.
        value: String,
    },

    /// The list ended up with neither allow nor deny patterns.
    #[error("must have an allow and/or deny package list")]
    #[diagnostic(code(depfence::missing_allow_and_deny))]
    MissingAllowAndDeny,

    /// The root-package supplier failed while expanding `$gostd`.
    #[error("{0}")]
    #[diagnostic(code(depfence::root_packages))]
    RootPackages(#[from] RootPackagesError),
}

/// All errors found while compiling one rule list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Diagnostic)]
#[error("{}", join_errors(.errors))]
pub struct CompilationError {
    #[related]
    errors: Vec<RuleError>,
}

impl CompilationError {
    /// Creates a compilation error from the collected rule errors.
    #[must_use]
    pub fn new(errors: Vec<RuleError>) -> Self {
        Self { errors }
    }

    /// Returns the individual errors, in the order they were found.
    #[must_use]
    pub fn errors(&self) -> &[RuleError] {
        &self.errors
    }
}

fn join_errors(errors: &[RuleError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Compilation failure of one named list inside a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Diagnostic)]
#[error("list '{list}': {error}")]
pub struct ListFailure {
    list: String,
    #[diagnostic_source]
    error: CompilationError,
}

impl ListFailure {
    /// Tags a list compilation error with the list name.
    #[must_use]
    pub fn new(list: impl Into<String>, error: CompilationError) -> Self {
        Self {
            list: list.into(),
            error,
        }
    }

    /// Returns the name of the failing list.
    #[must_use]
    pub fn list(&self) -> &str {
        &self.list
    }

    /// Returns the underlying compilation error.
    #[must_use]
    pub fn error(&self) -> &CompilationError {
        &self.error
    }
}

/// Every list that failed to compile in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Diagnostic)]
#[error("configuration errors:\n{}", format_failures(.failures))]
#[diagnostic(code(depfence::settings))]
pub struct SettingsError {
    #[related]
    failures: Vec<ListFailure>,
}

impl SettingsError {
    /// Creates a settings error from per-list failures.
    #[must_use]
    pub fn new(failures: Vec<ListFailure>) -> Self {
        Self { failures }
    }

    /// Returns the per-list failures, ordered by list name.
    #[must_use]
    pub fn failures(&self) -> &[ListFailure] {
        &self.failures
    }

    /// Iterates over every rule error together with its list name.
    pub fn rule_errors(&self) -> impl Iterator<Item = (&str, &RuleError)> {
        self.failures
            .iter()
            .flat_map(|f| f.error.errors().iter().map(move |e| (f.list(), e)))
    }
}

fn format_failures(failures: &[ListFailure]) -> String {
    failures
        .iter()
        .flat_map(|f| {
            f.error
                .errors()
                .iter()
                .map(move |e| format!("  - list '{}': {e}", f.list))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_mode_message_names_value() {
        let err = RuleError::UnknownListMode {
            value: "MiddleOut".to_string(),
        };
        assert_eq!(err.to_string(), "MiddleOut is not a known list mode");
    }

    #[test]
    fn compilation_error_joins_all_errors() {
        let err = CompilationError::new(vec![
            RuleError::UnknownMacro {
                token: "$nope".to_string(),
            },
            RuleError::MissingAllowAndDeny,
        ]);
        let text = err.to_string();
        assert!(text.contains("unknown macro `$nope`"));
        assert!(text.contains("must have an allow and/or deny package list"));
    }

    #[test]
    fn settings_error_lists_one_line_per_rule_error() {
        let err = SettingsError::new(vec![
            ListFailure::new(
                "Main",
                CompilationError::new(vec![RuleError::MissingAllowAndDeny]),
            ),
            ListFailure::new(
                "Test",
                CompilationError::new(vec![
                    RuleError::UnknownListMode {
                        value: "MiddleOut".to_string(),
                    },
                    RuleError::UnknownMacro {
                        token: "$x".to_string(),
                    },
                ]),
            ),
        ]);

        let text = err.to_string();
        assert_eq!(text.lines().count(), 4);
        assert!(text.contains("  - list 'Main': must have an allow and/or deny package list"));
        assert!(text.contains("  - list 'Test': MiddleOut is not a known list mode"));
        assert_eq!(err.rule_errors().count(), 3);
    }
}
