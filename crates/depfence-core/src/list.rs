//! Rule list compilation.
//!
//! A [`RawList`] is compiled in a fixed order so the result is deterministic:
//!
//! 1. the mode string is parsed;
//! 2. file entries are split on a leading `!`, expanded and compiled;
//! 3. allow entries are expanded, sorted, deduplicated and compiled;
//! 4. deny keys are expanded (each expansion keeps its key's advisory) and
//!    compiled in key order;
//! 5. a list left with neither allow nor deny patterns is rejected;
//! 6. a list that excludes root packages takes their names from the supplier.
//!
//! Every step runs even when an earlier one failed, and all errors are
//! returned together.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::debug;

use crate::config_dto::RawList;
use crate::error::{CompilationError, RuleError};
use crate::macros::{
    expand_file_token, expand_import_token, expand_in_place, is_macro, RootPackages,
};
use crate::pattern::Pattern;

/// Leading character that moves a `files` entry into the negated set.
pub const NEGATION_SIGIL: char = '!';

/// How allow and deny matches combine into a verdict.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListMode {
    /// A deny match always wins; an empty allow set allows everything.
    #[default]
    Original,
    /// Only allow matches pass; the more specific pattern wins a conflict.
    Strict,
    /// Everything passes unless denied; the more specific pattern wins a
    /// conflict.
    Lax,
}

impl FromStr for ListMode {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "" | "original" => Ok(Self::Original),
            "strict" => Ok(Self::Strict),
            "lax" => Ok(Self::Lax),
            _ => Err(RuleError::UnknownListMode {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ListMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Original => write!(f, "original"),
            Self::Strict => write!(f, "strict"),
            Self::Lax => write!(f, "lax"),
        }
    }
}

/// A deny pattern paired with its advisory message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenyRule {
    pattern: Pattern,
    suggestion: String,
}

impl DenyRule {
    /// Pairs a compiled pattern with its advisory.
    #[must_use]
    pub fn new(pattern: Pattern, suggestion: impl Into<String>) -> Self {
        Self {
            pattern,
            suggestion: suggestion.into(),
        }
    }

    /// Returns the compiled pattern.
    #[must_use]
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Returns the advisory message, possibly empty.
    #[must_use]
    pub fn suggestion(&self) -> &str {
        &self.suggestion
    }
}

/// An immutable, validated rule list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledList {
    pub(crate) name: String,
    pub(crate) files: Vec<Pattern>,
    pub(crate) negated_files: Vec<Pattern>,
    pub(crate) allow: Vec<Pattern>,
    pub(crate) deny: Vec<DenyRule>,
    pub(crate) mode: ListMode,
    pub(crate) exclude_root: bool,
    pub(crate) root_packages: Vec<String>,
}

impl CompiledList {
    /// Compiles a raw list, expanding `$gostd` through `roots`.
    ///
    /// The returned list has an empty name; see [`CompiledList::with_name`].
    ///
    /// # Errors
    ///
    /// Returns every problem found in the list: unknown mode, unknown macro,
    /// supplier failure, invalid glob, or neither allow nor deny patterns.
    pub fn compile(raw: &RawList, roots: &dyn RootPackages) -> Result<Self, CompilationError> {
        let mut errors = Vec::new();

        let mode = match raw.mode.parse::<ListMode>() {
            Ok(mode) => mode,
            Err(e) => {
                errors.push(e);
                ListMode::default()
            }
        };

        let (files, negated_files) = compile_files(&raw.files, &mut errors);

        let (mut allow_literals, allow_errors) =
            expand_in_place(&raw.allow, |token| expand_import_token(token, roots));
        errors.extend(allow_errors);
        allow_literals.sort();
        allow_literals.dedup();

        let deny_literals = expand_deny(&raw.deny, roots, &mut errors);

        if allow_literals.is_empty() && deny_literals.is_empty() {
            errors.push(RuleError::MissingAllowAndDeny);
        }

        let allow = compile_imports(&allow_literals, &mut errors);
        let deny = deny_literals
            .into_iter()
            .filter_map(|(literal, (suggestion, _))| match Pattern::import(&literal) {
                Ok(pattern) => Some(DenyRule::new(pattern, suggestion)),
                Err(e) => {
                    errors.push(e);
                    None
                }
            })
            .collect::<Vec<_>>();

        let root_packages = if raw.exclude_root {
            match roots.root_packages() {
                Ok(mut names) => {
                    names.sort();
                    names.dedup();
                    names
                }
                Err(e) => {
                    errors.push(e.into());
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        if !errors.is_empty() {
            return Err(CompilationError::new(errors));
        }

        debug!(
            %mode,
            files = files.len(),
            negated_files = negated_files.len(),
            allow = allow.len(),
            deny = deny.len(),
            exclude_root = raw.exclude_root,
            "Compiled rule list"
        );

        Ok(Self {
            name: String::new(),
            files,
            negated_files,
            allow,
            deny,
            mode,
            exclude_root: raw.exclude_root,
            root_packages,
        })
    }

    /// Sets the list name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Returns the list name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the resolution mode.
    #[must_use]
    pub fn mode(&self) -> ListMode {
        self.mode
    }

    /// Returns the positive file patterns, in declaration order.
    #[must_use]
    pub fn files(&self) -> &[Pattern] {
        &self.files
    }

    /// Returns the negated file patterns, in declaration order.
    #[must_use]
    pub fn negated_files(&self) -> &[Pattern] {
        &self.negated_files
    }

    /// Returns the allow patterns, sorted by literal.
    #[must_use]
    pub fn allow(&self) -> &[Pattern] {
        &self.allow
    }

    /// Returns the deny rules, sorted by literal.
    #[must_use]
    pub fn deny(&self) -> &[DenyRule] {
        &self.deny
    }

    /// Returns true if imports of root packages are skipped by this list.
    #[must_use]
    pub fn excludes_root(&self) -> bool {
        self.exclude_root
    }
}

fn compile_files(tokens: &[String], errors: &mut Vec<RuleError>) -> (Vec<Pattern>, Vec<Pattern>) {
    let mut files = Vec::new();
    let mut negated_files = Vec::new();

    for token in tokens {
        let (target, token) = match token.strip_prefix(NEGATION_SIGIL) {
            Some(rest) => (&mut negated_files, rest),
            None => (&mut files, token.as_str()),
        };
        match expand_file_token(token) {
            Ok(literals) => {
                for literal in literals {
                    match Pattern::file(&literal) {
                        Ok(pattern) => target.push(pattern),
                        Err(e) => errors.push(e),
                    }
                }
            }
            Err(e) => errors.push(e),
        }
    }

    (files, negated_files)
}

fn compile_imports(literals: &[String], errors: &mut Vec<RuleError>) -> Vec<Pattern> {
    literals
        .iter()
        .filter_map(|literal| match Pattern::import(literal) {
            Ok(pattern) => Some(pattern),
            Err(e) => {
                errors.push(e);
                None
            }
        })
        .collect()
}

/// Expands deny keys into `literal -> (advisory, written explicitly)`.
///
/// An explicitly written key replaces a macro expansion of the same literal.
/// Between two macro expansions the first key in order is kept.
fn expand_deny(
    deny: &BTreeMap<String, String>,
    roots: &dyn RootPackages,
    errors: &mut Vec<RuleError>,
) -> BTreeMap<String, (String, bool)> {
    let mut literals: BTreeMap<String, (String, bool)> = BTreeMap::new();

    for (key, message) in deny {
        let suggestion = message.trim();
        let explicit = !is_macro(key);
        let expanded = match expand_import_token(key, roots) {
            Ok(expanded) => expanded,
            Err(e) => {
                errors.push(e);
                continue;
            }
        };
        for literal in expanded {
            match literals.entry(literal) {
                Entry::Vacant(slot) => {
                    slot.insert((suggestion.to_string(), explicit));
                }
                Entry::Occupied(mut slot) => {
                    if explicit && !slot.get().1 {
                        slot.insert((suggestion.to_string(), explicit));
                    }
                }
            }
        }
    }

    literals
}
