//! Incremental diff between a source locale and a previously written target.

use std::collections::BTreeSet;

use crate::LocaleMap;

/// What a target language needs, given its current file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocaleDiff {
    /// Source entries with no usable translation yet
    pub to_translate: LocaleMap,
    /// Existing translations carried over unchanged
    pub to_keep: LocaleMap,
    /// Keys present in the target file but gone from the source
    pub removed: BTreeSet<String>,
}

impl LocaleDiff {
    /// Nothing to send and nothing to drop: the target file stays as it is
    pub fn is_noop(&self) -> bool {
        self.to_translate.is_empty() && self.removed.is_empty()
    }

    /// Final target content: kept entries plus fresh translations
    pub fn merge(self, translated: LocaleMap) -> LocaleMap {
        let mut merged = self.to_keep;
        merged.extend(translated);
        merged
    }
}

fn has_text(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Compare `source` with the target file's current content.
///
/// Only presence is checked: any existing non-empty translation is kept, even
/// whitespace, and even when its source text has since changed. Blank source
/// values are never queued for translation.
pub fn diff(source: &LocaleMap, existing: Option<&LocaleMap>) -> LocaleDiff {
    let Some(existing) = existing else {
        return LocaleDiff {
            to_translate: source
                .iter()
                .filter(|(_, v)| has_text(v))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            ..LocaleDiff::default()
        };
    };

    let removed: BTreeSet<String> = existing
        .keys()
        .filter(|key| !source.contains_key(*key))
        .cloned()
        .collect();

    let to_translate: LocaleMap = source
        .iter()
        .filter(|(key, value)| {
            has_text(value) && existing.get(*key).is_none_or(String::is_empty)
        })
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    let to_keep: LocaleMap = existing
        .iter()
        .filter(|(key, _)| !removed.contains(*key) && !to_translate.contains_key(*key))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    LocaleDiff {
        to_translate,
        to_keep,
        removed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, &str)]) -> LocaleMap {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn keys(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|k| (*k).to_string()).collect()
    }

    #[test]
    fn test_first_run_translates_everything() {
        let source = map(&[("a", "Hello"), ("b", "World")]);
        let result = diff(&source, None);

        assert_eq!(result.to_translate, source);
        assert!(result.to_keep.is_empty());
        assert!(result.removed.is_empty());
    }

    #[test]
    fn test_keep_add_and_remove() {
        let source = map(&[("a", "Hello"), ("b", "World")]);
        let existing = map(&[("a", "Bonjour"), ("c", "Stale")]);
        let result = diff(&source, Some(&existing));

        assert_eq!(result.to_translate, map(&[("b", "World")]));
        assert_eq!(result.to_keep, map(&[("a", "Bonjour")]));
        assert_eq!(result.removed, keys(&["c"]));
    }

    #[test]
    fn test_superset_existing_removes_exactly_extra_keys() {
        let source = map(&[("a", "A"), ("b", "B")]);
        let existing = map(&[("a", "x"), ("b", "y"), ("c", "z"), ("d", "w")]);
        let result = diff(&source, Some(&existing));

        assert_eq!(result.removed, keys(&["c", "d"]));
        assert!(result.to_translate.is_empty());
        assert!(!result.is_noop());
    }

    #[test]
    fn test_empty_translation_is_retranslated() {
        let source = map(&[("a", "Hello")]);
        let existing = map(&[("a", "")]);
        let result = diff(&source, Some(&existing));

        assert_eq!(result.to_translate, source);
        assert!(result.to_keep.is_empty());
    }

    #[test]
    fn test_whitespace_translation_counts_as_present() {
        let source = map(&[("a", "Hello")]);
        let existing = map(&[("a", " ")]);
        let result = diff(&source, Some(&existing));

        assert!(result.to_translate.is_empty());
        assert_eq!(result.to_keep, existing);
        assert!(result.is_noop());
    }

    #[test]
    fn test_changed_source_text_is_not_retranslated() {
        // Presence-only rule: an edited source string keeps its old translation.
        let source = map(&[("a", "Hello there")]);
        let existing = map(&[("a", "Bonjour")]);
        let result = diff(&source, Some(&existing));

        assert!(result.to_translate.is_empty());
        assert_eq!(result.to_keep, existing);
        assert!(result.is_noop());
    }

    #[test]
    fn test_blank_source_values_are_not_sent() {
        let source = map(&[("a", "  "), ("b", "World")]);
        assert_eq!(diff(&source, None).to_translate, map(&[("b", "World")]));

        let existing = map(&[("a", "")]);
        let result = diff(&source, Some(&existing));
        assert_eq!(result.to_translate, map(&[("b", "World")]));
        assert_eq!(result.to_keep, map(&[("a", "")]));
    }

    #[test]
    fn test_merge_combines_kept_and_translated() {
        let source = map(&[("a", "Hello"), ("b", "World")]);
        let existing = map(&[("a", "Bonjour"), ("c", "Stale")]);
        let merged = diff(&source, Some(&existing)).merge(map(&[("b", "Monde")]));

        assert_eq!(merged, map(&[("a", "Bonjour"), ("b", "Monde")]));
    }
}
