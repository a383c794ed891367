//! Ordered namespace pattern lists with a compiled-regex cache.

use super::{NamespaceKind, NamespacePattern, Namespaces};
use crate::error::NamespaceError;
use regex::Regex;
use std::collections::HashMap;
use tracing::debug;

/// The namespaces claimed by one appservice.
///
/// Regexes are compiled when a pattern is added and cached by source
/// text, so identical sources across kinds share one compiled regex.
///
/// Patterns use the [`regex`] crate's syntax. Lookaround (`(?=`, `(?!`,
/// `(?<=`, `(?<!`) and backreferences (`\1`) are not supported and are
/// rejected with [`NamespaceError::InvalidRegex`], so a registration file
/// written for a backtracking engine may fail to load.
#[derive(Debug, Clone, Default)]
pub struct NamespaceRegistry {
    users: Vec<NamespacePattern>,
    aliases: Vec<NamespacePattern>,
    rooms: Vec<NamespacePattern>,
    compiled: HashMap<String, Regex>,
}

impl NamespaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from the serialized pattern lists.
    ///
    /// Fails on the first pattern that cannot be inserted.
    pub fn from_namespaces(namespaces: &Namespaces) -> Result<Self, NamespaceError> {
        let mut registry = Self::new();
        for kind in NamespaceKind::ALL {
            for pattern in namespaces.get(kind) {
                registry.add_pattern(kind, &pattern.regex, pattern.exclusive)?;
            }
        }
        Ok(registry)
    }

    /// Append a pattern to the list for `kind`.
    ///
    /// The regex is compiled (or fetched from the cache) before the pattern
    /// is stored. On error nothing is inserted.
    pub fn add_pattern(
        &mut self,
        kind: NamespaceKind,
        regex: &str,
        exclusive: bool,
    ) -> Result<(), NamespaceError> {
        if regex.is_empty() {
            return Err(NamespaceError::EmptyPattern { kind });
        }

        if !self.compiled.contains_key(regex) {
            let compiled = Regex::new(regex).map_err(|e| NamespaceError::InvalidRegex {
                kind,
                pattern: regex.to_string(),
                reason: e.to_string(),
            })?;
            self.compiled.insert(regex.to_string(), compiled);
        }

        debug!(kind = %kind, regex, exclusive, "Namespace pattern added");
        self.list_mut(kind)
            .push(NamespacePattern::new(regex, exclusive));
        Ok(())
    }

    /// Like [`add_pattern`](Self::add_pattern) with the kind given as text.
    pub fn add_pattern_str(
        &mut self,
        kind: &str,
        regex: &str,
        exclusive: bool,
    ) -> Result<(), NamespaceError> {
        self.add_pattern(kind.parse()?, regex, exclusive)
    }

    /// First pattern for `kind` that matches `sample`.
    ///
    /// With `only_exclusive`, non-exclusive patterns are skipped.
    pub fn find_match(
        &self,
        kind: NamespaceKind,
        sample: &str,
        only_exclusive: bool,
    ) -> Option<&NamespacePattern> {
        self.patterns(kind).iter().find(|pattern| {
            if only_exclusive && !pattern.exclusive {
                return false;
            }
            self.compiled
                .get(&pattern.regex)
                .is_some_and(|re| re.is_match(sample))
        })
    }

    /// Whether `sample` is claimed under `kind`.
    pub fn matches(&self, kind: NamespaceKind, sample: &str, only_exclusive: bool) -> bool {
        self.find_match(kind, sample, only_exclusive).is_some()
    }

    /// Patterns for `kind`, in insertion order.
    pub fn patterns(&self, kind: NamespaceKind) -> &[NamespacePattern] {
        match kind {
            NamespaceKind::Users => &self.users,
            NamespaceKind::Aliases => &self.aliases,
            NamespaceKind::Rooms => &self.rooms,
        }
    }

    /// Snapshot of all pattern lists in their serialized form.
    pub fn to_namespaces(&self) -> Namespaces {
        Namespaces {
            users: self.users.clone(),
            aliases: self.aliases.clone(),
            rooms: self.rooms.clone(),
        }
    }

    /// True when no kind has any pattern.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty() && self.aliases.is_empty() && self.rooms.is_empty()
    }

    /// Number of distinct regex sources compiled so far.
    pub fn compiled_count(&self) -> usize {
        self.compiled.len()
    }

    fn list_mut(&mut self, kind: NamespaceKind) -> &mut Vec<NamespacePattern> {
        match kind {
            NamespaceKind::Users => &mut self.users,
            NamespaceKind::Aliases => &mut self.aliases,
            NamespaceKind::Rooms => &mut self.rooms,
        }
    }
}

impl PartialEq for NamespaceRegistry {
    fn eq(&self, other: &Self) -> bool {
        self.users == other.users && self.aliases == other.aliases && self.rooms == other.rooms
    }
}

impl Eq for NamespaceRegistry {}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn scenario_registry() -> NamespaceRegistry {
        let mut registry = NamespaceRegistry::new();
        registry
            .add_pattern(NamespaceKind::Users, "@foobar.+", true)
            .unwrap();
        registry
            .add_pattern(NamespaceKind::Users, "@barbaz.+", false)
            .unwrap();
        registry
            .add_pattern(NamespaceKind::Rooms, "!foo", true)
            .unwrap();
        registry
            .add_pattern(NamespaceKind::Aliases, "#foo.+", false)
            .unwrap();
        registry
    }

    #[test]
    fn test_exclusive_user_match() {
        let registry = scenario_registry();
        assert!(registry.matches(NamespaceKind::Users, "@foobar1", true));
        assert!(registry.matches(NamespaceKind::Users, "@foobar1", false));
    }

    #[test]
    fn test_non_exclusive_user_match() {
        let registry = scenario_registry();
        assert!(registry.matches(NamespaceKind::Users, "@barbaz1", false));
        assert!(!registry.matches(NamespaceKind::Users, "@barbaz1", true));
    }

    #[test]
    fn test_no_cross_kind_match() {
        let registry = scenario_registry();
        assert!(!registry.matches(NamespaceKind::Aliases, "@foobar1", false));
        assert!(registry.matches(NamespaceKind::Rooms, "!foo:example.org", true));
        assert!(registry.matches(NamespaceKind::Aliases, "#foobar", false));
        assert!(!registry.matches(NamespaceKind::Aliases, "#foobar", true));
    }

    #[test]
    fn test_unanchored_search() {
        let registry = scenario_registry();
        // `!foo` has no anchors, so it matches anywhere in the sample
        assert!(registry.matches(NamespaceKind::Rooms, "prefix!foo", false));
    }

    #[test]
    fn test_first_match_wins() {
        let mut registry = NamespaceRegistry::new();
        registry.add_pattern(NamespaceKind::Users, "@a.+", false).unwrap();
        registry.add_pattern(NamespaceKind::Users, "@ab.+", true).unwrap();

        let hit = registry.find_match(NamespaceKind::Users, "@abc", false).unwrap();
        assert_eq!(hit.regex, "@a.+");

        let exclusive_hit = registry.find_match(NamespaceKind::Users, "@abc", true).unwrap();
        assert_eq!(exclusive_hit.regex, "@ab.+");
    }

    #[test]
    fn test_empty_registry_matches_nothing() {
        let registry = NamespaceRegistry::new();
        for kind in NamespaceKind::ALL {
            assert!(!registry.matches(kind, "@anything", false));
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn test_rejects_unknown_kind() {
        let mut registry = NamespaceRegistry::new();
        let err = registry.add_pattern_str("groups", "+foo", true).unwrap_err();
        assert_eq!(err, NamespaceError::UnknownKind("groups".into()));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_rejects_empty_regex() {
        let mut registry = NamespaceRegistry::new();
        let err = registry.add_pattern(NamespaceKind::Rooms, "", false).unwrap_err();
        assert_eq!(
            err,
            NamespaceError::EmptyPattern {
                kind: NamespaceKind::Rooms
            }
        );
    }

    #[test]
    fn test_rejects_invalid_regex_without_inserting() {
        let mut registry = NamespaceRegistry::new();
        let err = registry
            .add_pattern(NamespaceKind::Users, "@foo(", true)
            .unwrap_err();
        assert!(matches!(err, NamespaceError::InvalidRegex { .. }));
        assert!(registry.patterns(NamespaceKind::Users).is_empty());
        assert_eq!(registry.compiled_count(), 0);
    }

    #[test]
    fn test_rejects_lookaround_and_backreferences() {
        let mut registry = NamespaceRegistry::new();
        for pattern in ["@irc_(?!admin).*", "@(?<=x)bot", "@(a)\\1"] {
            let err = registry
                .add_pattern(NamespaceKind::Users, pattern, true)
                .unwrap_err();
            assert!(
                matches!(err, NamespaceError::InvalidRegex { .. }),
                "{pattern} should be rejected"
            );
        }
        assert!(registry.patterns(NamespaceKind::Users).is_empty());
    }

    #[test]
    fn test_cache_shared_by_source() {
        let mut registry = NamespaceRegistry::new();
        registry.add_pattern(NamespaceKind::Users, "foo.+", true).unwrap();
        registry.add_pattern(NamespaceKind::Aliases, "foo.+", false).unwrap();
        registry.add_pattern(NamespaceKind::Rooms, "bar", false).unwrap();
        assert_eq!(registry.compiled_count(), 2);
    }

    #[test]
    fn test_namespaces_conversion() {
        let registry = scenario_registry();
        let namespaces = registry.to_namespaces();
        assert_eq!(namespaces.users.len(), 2);

        let rebuilt = NamespaceRegistry::from_namespaces(&namespaces).unwrap();
        assert_eq!(rebuilt, registry);
    }

    proptest! {
        #[test]
        fn prop_exclusive_pattern_matches_both_modes(
            prefix in "[a-z]{1,12}",
            suffix in "[a-z0-9]{1,12}",
        ) {
            let mut registry = NamespaceRegistry::new();
            let regex = format!("@{}.+", regex::escape(&prefix));
            registry.add_pattern(NamespaceKind::Users, &regex, true).unwrap();

            let sample = format!("@{prefix}{suffix}");
            prop_assert!(registry.matches(NamespaceKind::Users, &sample, true));
            prop_assert!(registry.matches(NamespaceKind::Users, &sample, false));
        }

        #[test]
        fn prop_non_exclusive_pattern_only_matches_inclusive_mode(
            prefix in "[a-z]{1,12}",
            suffix in "[a-z0-9]{1,12}",
        ) {
            let mut registry = NamespaceRegistry::new();
            let regex = format!("#{}.+", regex::escape(&prefix));
            registry.add_pattern(NamespaceKind::Aliases, &regex, false).unwrap();

            let sample = format!("#{prefix}{suffix}");
            prop_assert!(!registry.matches(NamespaceKind::Aliases, &sample, true));
            prop_assert!(registry.matches(NamespaceKind::Aliases, &sample, false));
        }

        #[test]
        fn prop_empty_kind_never_matches(sample in ".*") {
            let mut registry = NamespaceRegistry::new();
            registry.add_pattern(NamespaceKind::Users, ".*", true).unwrap();
            prop_assert!(!registry.matches(NamespaceKind::Rooms, &sample, false));
        }
    }
}
