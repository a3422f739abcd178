//! Compilation of a whole configuration and lookup of applicable lists.

use tracing::{debug, info};

use crate::config_dto::{RawList, RawSettings};
use crate::error::{ListFailure, SettingsError};
use crate::list::CompiledList;
use crate::macros::{ImportMacro, RootPackages};

/// Name of the list synthesized for an empty configuration.
pub const DEFAULT_LIST_NAME: &str = "Main";

/// Every compiled rule list of a configuration, ordered by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledSettings {
    lists: Vec<CompiledList>,
}

impl CompiledSettings {
    /// Compiles every list of `raw`.
    ///
    /// An empty configuration yields the default list, see
    /// [`CompiledSettings::zero_config`].
    ///
    /// # Errors
    ///
    /// Returns a [`SettingsError`] holding the errors of every list that
    /// failed, each tagged with its list name.
    pub fn compile(raw: &RawSettings, roots: &dyn RootPackages) -> Result<Self, SettingsError> {
        if raw.is_empty() {
            return Self::zero_config(roots);
        }

        let mut lists = Vec::with_capacity(raw.len());
        let mut failures = Vec::new();

        for (name, list) in raw {
            match CompiledList::compile(list, roots) {
                Ok(compiled) => lists.push(compiled.with_name(name.as_str())),
                Err(e) => failures.push(ListFailure::new(name.as_str(), e)),
            }
        }

        if !failures.is_empty() {
            return Err(SettingsError::new(failures));
        }

        info!(lists = lists.len(), "Compiled rule lists");
        Ok(Self { lists })
    }

    /// Compiles the default configuration: one list named
    /// [`DEFAULT_LIST_NAME`] that allows every root package and applies to
    /// every file.
    ///
    /// # Errors
    ///
    /// Returns a [`SettingsError`] if the root packages cannot be listed or
    /// the supplier returns none.
    pub fn zero_config(roots: &dyn RootPackages) -> Result<Self, SettingsError> {
        debug!("No rule lists configured, using the default list");
        let raw = RawList::new().allow([ImportMacro::RootPackages.token()]);
        let list = CompiledList::compile(&raw, roots)
            .map_err(|e| SettingsError::new(vec![ListFailure::new(DEFAULT_LIST_NAME, e)]))?;
        Ok(Self {
            lists: vec![list.with_name(DEFAULT_LIST_NAME)],
        })
    }

    /// Returns the lists that apply to `path`, in name order.
    #[must_use]
    pub fn which_lists(&self, path: &str) -> Vec<&CompiledList> {
        let applicable: Vec<&CompiledList> = self
            .lists
            .iter()
            .filter(|list| list.file_matches(path))
            .collect();
        debug!(path, count = applicable.len(), "Resolved applicable lists");
        applicable
    }

    /// Looks up a list by name.
    #[must_use]
    pub fn list(&self, name: &str) -> Option<&CompiledList> {
        self.lists.iter().find(|list| list.name() == name)
    }

    /// Returns every list, in name order.
    #[must_use]
    pub fn lists(&self) -> &[CompiledList] {
        &self.lists
    }

    /// Returns the number of lists.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lists.len()
    }

    /// Returns true if there are no lists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RuleError;
    use crate::list::ListMode;
    use crate::macros::StaticRootPackages;
    use crate::pattern::Pattern;

    fn roots() -> StaticRootPackages {
        StaticRootPackages::new(["FIND ME", "FIND ME TOO"])
    }

    fn settings(entries: Vec<(&str, RawList)>) -> RawSettings {
        entries
            .into_iter()
            .map(|(name, list)| (name.to_string(), list))
            .collect()
    }

    #[test]
    fn empty_settings_yield_default_list() {
        let compiled = CompiledSettings::compile(&RawSettings::new(), &roots()).unwrap();
        assert_eq!(compiled.len(), 1);

        let main = &compiled.lists()[0];
        assert_eq!(main.name(), DEFAULT_LIST_NAME);
        assert_eq!(main.mode(), ListMode::Original);
        assert!(main.files().is_empty());
        assert!(main.negated_files().is_empty());
        assert!(main.deny().is_empty());
        let allow: Vec<&str> = main.allow().iter().map(Pattern::as_str).collect();
        assert_eq!(allow, vec!["FIND ME", "FIND ME TOO"]);

        assert!(main.file_matches("any/path/at/all.go"));
        assert!(main.file_matches("README.md"));
    }

    #[test]
    fn default_list_fails_without_root_packages() {
        let err = CompiledSettings::zero_config(&StaticRootPackages::default()).unwrap_err();
        assert_eq!(err.failures()[0].list(), DEFAULT_LIST_NAME);
        assert!(err
            .rule_errors()
            .any(|(_, e)| matches!(e, RuleError::MissingAllowAndDeny)));
    }

    #[test]
    fn lists_are_named_and_sorted() {
        let raw = settings(vec![
            ("zeta", RawList::new().allow(["os"])),
            ("alpha", RawList::new().deny("net", "")),
            ("Main", RawList::new().allow(["fmt"])),
        ]);
        let compiled = CompiledSettings::compile(&raw, &roots()).unwrap();
        let names: Vec<&str> = compiled.lists().iter().map(CompiledList::name).collect();
        assert_eq!(names, vec!["Main", "alpha", "zeta"]);
        assert_eq!(compiled.list("alpha").unwrap().deny().len(), 1);
        assert!(compiled.list("missing").is_none());
    }

    #[test]
    fn which_lists_filters_by_file() {
        let raw = settings(vec![
            (
                "main",
                RawList::new().files(["$all", "!$test"]).allow(["os"]),
            ),
            ("tests", RawList::new().files(["$test"]).allow(["testing"])),
            ("everywhere", RawList::new().deny("unsafe", "")),
        ]);
        let compiled = CompiledSettings::compile(&raw, &roots()).unwrap();

        let names = |path: &str| -> Vec<String> {
            compiled
                .which_lists(path)
                .iter()
                .map(|l| l.name().to_string())
                .collect()
        };
        assert_eq!(names("pkg/a.go"), vec!["everywhere", "main"]);
        assert_eq!(names("pkg/a_test.go"), vec!["everywhere", "tests"]);
        assert_eq!(names("README.md"), vec!["everywhere"]);
    }

    #[test]
    fn which_lists_may_be_empty() {
        let raw = settings(vec![("go", RawList::new().files(["$all"]).allow(["os"]))]);
        let compiled = CompiledSettings::compile(&raw, &roots()).unwrap();
        assert!(compiled.which_lists("script.sh").is_empty());
    }

    #[test]
    fn failures_of_sibling_lists_are_all_reported() {
        let raw = settings(vec![
            ("good", RawList::new().allow(["os"])),
            ("no-rules", RawList::new().files(["$all"])),
            ("bad-mode", RawList::new().allow(["os"]).mode("MiddleOut")),
        ]);
        let err = CompiledSettings::compile(&raw, &roots()).unwrap_err();

        let failed: Vec<&str> = err.failures().iter().map(ListFailure::list).collect();
        assert_eq!(failed, vec!["bad-mode", "no-rules"]);

        let text = err.to_string();
        assert!(text.contains("list 'bad-mode': MiddleOut is not a known list mode"));
        assert!(text.contains("list 'no-rules': must have an allow and/or deny package list"));
    }

    #[test]
    fn compiled_settings_are_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CompiledSettings>();
        assert_send_sync::<CompiledList>();
    }
}
