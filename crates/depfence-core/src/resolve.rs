//! Resolution of files and import identifiers against a compiled list.

use serde::Serialize;

use crate::list::{CompiledList, DenyRule, ListMode};
use crate::pattern::Pattern;

/// Outcome of checking one identifier against one list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Verdict {
    /// Whether the identifier may be imported.
    pub allowed: bool,
    /// Advisory of the deny rule behind a negative verdict, else empty.
    pub suggestion: String,
    /// Whether any deny rule matched the identifier.
    pub deny_matched: bool,
}

impl Verdict {
    /// Returns true if a deny rule, rather than a missing allow, rejected the
    /// identifier.
    #[must_use]
    pub fn is_denied_by_rule(&self) -> bool {
        !self.allowed && self.deny_matched
    }
}

impl CompiledList {
    /// Returns true if this list applies to `path`.
    ///
    /// A negated pattern match always excludes the file. Otherwise a list
    /// without positive patterns applies everywhere.
    #[must_use]
    pub fn file_matches(&self, path: &str) -> bool {
        if self.negated_files.iter().any(|p| p.matches(path)) {
            return false;
        }
        self.files.is_empty() || self.files.iter().any(|p| p.matches(path))
    }

    /// Decides whether `identifier` may be imported under this list.
    #[must_use]
    pub fn import_allowed(&self, identifier: &str) -> Verdict {
        let allow_match = first_allow(&self.allow, identifier);
        let deny_match = first_deny(&self.deny, identifier);

        let allowed = match self.mode {
            ListMode::Original => {
                (self.allow.is_empty() || allow_match.is_some()) && deny_match.is_none()
            }
            ListMode::Strict => match (allow_match, deny_match) {
                (Some(_), None) => true,
                (Some(allow), Some(deny)) => outranks(allow, deny),
                (None, _) => false,
            },
            ListMode::Lax => match (allow_match, deny_match) {
                (_, None) => true,
                (Some(allow), Some(deny)) => outranks(allow, deny),
                (None, Some(_)) => false,
            },
        };

        let suggestion = match deny_match {
            Some(rule) if !allowed => rule.suggestion().to_string(),
            _ => String::new(),
        };

        Verdict {
            allowed,
            suggestion,
            deny_matched: deny_match.is_some(),
        }
    }

    /// Returns true if this list excludes root packages and `identifier`
    /// names one of them or a package below one.
    #[must_use]
    pub fn skips_root(&self, identifier: &str) -> bool {
        self.exclude_root
            && self
                .root_packages
                .iter()
                .any(|root| is_root(root, identifier))
    }
}

/// `archive` covers `archive` and `archive/zip`, never `archive.com/x`.
fn is_root(root: &str, identifier: &str) -> bool {
    identifier
        .strip_prefix(root)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

fn first_allow<'a>(patterns: &'a [Pattern], identifier: &str) -> Option<&'a Pattern> {
    patterns.iter().find(|p| p.matches(identifier))
}

fn first_deny<'a>(rules: &'a [DenyRule], identifier: &str) -> Option<&'a DenyRule> {
    rules.iter().find(|r| r.pattern().matches(identifier))
}

/// Strictly longer allow literal beats the deny literal; ties go to deny.
fn outranks(allow: &Pattern, deny: &DenyRule) -> bool {
    allow.specificity() > deny.pattern().specificity()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config_dto::RawList;
    use crate::macros::StaticRootPackages;

    fn compile(raw: &RawList) -> CompiledList {
        CompiledList::compile(raw, &StaticRootPackages::default()).unwrap()
    }

    fn verdict(allowed: bool, suggestion: &str) -> (bool, String) {
        (allowed, suggestion.to_string())
    }

    fn check(list: &CompiledList, identifier: &str) -> (bool, String) {
        let v = list.import_allowed(identifier);
        (v.allowed, v.suggestion)
    }

    fn mixed(mode: &str) -> CompiledList {
        compile(
            &RawList::new()
                .allow(["some/pkg/a/foo"])
                .deny("some/pkg/a", "msg")
                .mode(mode),
        )
    }

    // ────────────────────────────────────────────
    // File applicability
    // ────────────────────────────────────────────

    #[test]
    fn negated_files_veto_positive_files() {
        let list = compile(
            &RawList::new()
                .files(["**/*.go", "!**/*_test.go"])
                .allow(["os"]),
        );
        assert!(list.file_matches("pkg/file.go"));
        assert!(!list.file_matches("pkg/file_test.go"));
    }

    #[test]
    fn negation_order_does_not_matter() {
        let list = compile(
            &RawList::new()
                .files(["!**/*_test.go", "**/*.go"])
                .allow(["os"]),
        );
        assert!(!list.file_matches("pkg/file_test.go"));
        assert!(list.file_matches("pkg/file.go"));
    }

    #[test]
    fn no_positive_files_applies_everywhere() {
        let list = compile(&RawList::new().allow(["os"]));
        assert!(list.file_matches("anything/at/all.go"));
        assert!(list.file_matches(""));

        let only_negated = compile(&RawList::new().files(["!$test"]).allow(["os"]));
        assert!(only_negated.file_matches("main.go"));
        assert!(!only_negated.file_matches("main_test.go"));
    }

    #[test]
    fn positive_files_must_match() {
        let list = compile(&RawList::new().files(["cmd/", "internal/**/*.go"]).allow(["os"]));
        assert!(list.file_matches("cmd/tool/main.go"));
        assert!(list.file_matches("internal/a/b.go"));
        assert!(!list.file_matches("pkg/a.go"));
    }

    // ────────────────────────────────────────────
    // Original mode
    // ────────────────────────────────────────────

    #[test]
    fn original_deny_dominates_specific_allow() {
        let list = mixed("original");
        assert_eq!(check(&list, "some/pkg/a/foo/bar"), verdict(false, "msg"));
        assert_eq!(check(&list, "some/pkg/a/baz"), verdict(false, "msg"));
        assert_eq!(check(&list, "other"), verdict(false, ""));
    }

    #[test]
    fn original_allow_only_list() {
        let list = compile(&RawList::new().allow(["os", "github.com/", "some/pkg/b$"]));
        assert_eq!(check(&list, "os"), verdict(true, ""));
        assert_eq!(check(&list, "github.com/foo/bar"), verdict(true, ""));
        assert_eq!(check(&list, "some/pkg/b"), verdict(true, ""));
        assert_eq!(check(&list, "some/pkg/b/foo"), verdict(false, ""));
        assert_eq!(check(&list, "net/http"), verdict(false, ""));
    }

    #[test]
    fn original_deny_only_list() {
        let list = compile(
            &RawList::new()
                .deny("github.com/pkg/errors", "use the standard errors package")
                .deny("some/*/a$", ""),
        );
        assert_eq!(
            check(&list, "github.com/pkg/errors"),
            verdict(false, "use the standard errors package")
        );
        assert_eq!(check(&list, "some/foo/a"), verdict(false, ""));
        assert_eq!(check(&list, "some/foo/a/b"), verdict(true, ""));
        assert_eq!(check(&list, "fmt"), verdict(true, ""));
    }

    #[test]
    fn identifier_before_every_pattern_is_a_clean_miss() {
        let list = compile(&RawList::new().allow(["some/pkg"]).deny("zzz", "z"));
        assert_eq!(check(&list, "aaa/"), verdict(false, ""));
        assert_eq!(check(&list, ""), verdict(false, ""));
    }

    // ────────────────────────────────────────────
    // Strict mode
    // ────────────────────────────────────────────

    #[test]
    fn strict_more_specific_allow_wins() {
        let list = mixed("strict");
        assert_eq!(check(&list, "some/pkg/a/foo/bar"), verdict(true, ""));
        assert_eq!(check(&list, "some/pkg/a/baz"), verdict(false, "msg"));
        assert_eq!(check(&list, "unrelated"), verdict(false, ""));
    }

    #[test]
    fn strict_more_specific_deny_wins() {
        let list = compile(
            &RawList::new()
                .allow(["some/pkg"])
                .deny("some/pkg/internal", "internal only")
                .mode("strict"),
        );
        assert_eq!(check(&list, "some/pkg/public"), verdict(true, ""));
        assert_eq!(
            check(&list, "some/pkg/internal/x"),
            verdict(false, "internal only")
        );
    }

    #[test]
    fn strict_equal_specificity_goes_to_deny() {
        let list = compile(
            &RawList::new()
                .allow(["some/pkg/*"])
                .deny("some/*/pkg", "tie")
                .mode("strict"),
        );
        assert_eq!(check(&list, "some/pkg/pkg"), verdict(false, "tie"));
    }

    #[test]
    fn strict_without_allow_never_allows() {
        let list = compile(
            &RawList::new()
                .deny("github.com/", "no third party")
                .mode("strict"),
        );
        for identifier in ["os", "github.com/foo", "", "aaa/"] {
            assert!(!list.import_allowed(identifier).allowed, "{identifier}");
        }
    }

    // ────────────────────────────────────────────
    // Lax mode
    // ────────────────────────────────────────────

    #[test]
    fn lax_unmatched_identifiers_are_allowed() {
        let list = mixed("lax");
        for identifier in ["os", "github.com/foo", "", "aaa/", "some/pkg/b"] {
            assert_eq!(check(&list, identifier), verdict(true, ""), "{identifier}");
        }
    }

    #[test]
    fn lax_resolves_conflicts_by_specificity() {
        let list = mixed("lax");
        assert_eq!(check(&list, "some/pkg/a/foo/bar"), verdict(true, ""));
        assert_eq!(check(&list, "some/pkg/a/baz"), verdict(false, "msg"));
    }

    #[test]
    fn lax_without_deny_allows_everything() {
        let list = compile(&RawList::new().allow(["os"]).mode("lax"));
        assert!(list.import_allowed("github.com/anything").allowed);
    }

    // ────────────────────────────────────────────
    // Verdict details
    // ────────────────────────────────────────────

    #[test]
    fn deny_matched_tells_deny_from_missing_allow() {
        let list = compile(&RawList::new().allow(["os"]).deny("net/", "no network"));
        let denied = list.import_allowed("net/http");
        assert!(denied.is_denied_by_rule());

        let not_allowed = list.import_allowed("fmt");
        assert!(!not_allowed.allowed);
        assert!(!not_allowed.is_denied_by_rule());
    }

    #[test]
    fn allowed_verdict_carries_no_suggestion() {
        let list = mixed("strict");
        let v = list.import_allowed("some/pkg/a/foo");
        assert!(v.allowed);
        assert!(v.deny_matched);
        assert_eq!(v.suggestion, "");
    }

    #[test]
    fn recompiling_yields_identical_verdicts() {
        let raw = RawList::new()
            .allow(["github.com/**/lib", "os", "some/*/a$"])
            .deny("github.com/", "pinned")
            .deny("some/**", "no some")
            .mode("strict");
        let first = compile(&raw);
        let second = compile(&raw);
        for identifier in [
            "github.com/org/lib",
            "github.com/org/lib/x",
            "github.com/org/other",
            "os",
            "some/x/a",
            "some/x/a/b",
            "",
        ] {
            assert_eq!(
                first.import_allowed(identifier),
                second.import_allowed(identifier),
                "{identifier}"
            );
        }
    }

    // ────────────────────────────────────────────
    // Root exclusion
    // ────────────────────────────────────────────

    fn excluding_roots() -> CompiledList {
        CompiledList::compile(
            &RawList::new().allow(["github.com/"]).exclude_root(true),
            &StaticRootPackages::new(["archive", "net", "os"]),
        )
        .unwrap()
    }

    #[test]
    fn root_packages_and_their_subpackages_are_skipped() {
        let list = excluding_roots();
        assert!(list.skips_root("os"));
        assert!(list.skips_root("net/http"));
        assert!(list.skips_root("archive/zip"));
    }

    #[test]
    fn root_skip_stops_at_segment_boundary() {
        let list = excluding_roots();
        assert!(!list.skips_root("archive.com/x"));
        assert!(!list.skips_root("netflix.com/api"));
        assert!(!list.skips_root("osx"));
        assert!(!list.skips_root("github.com/org/os"));
    }

    #[test]
    fn roots_are_checked_unless_excluded() {
        let list = CompiledList::compile(
            &RawList::new().allow(["github.com/"]),
            &StaticRootPackages::new(["os"]),
        )
        .unwrap();
        assert!(!list.skips_root("os"));
        assert!(!list.import_allowed("os").allowed);
    }
}
