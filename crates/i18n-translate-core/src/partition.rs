//! Splitting pending entries into size-bounded request batches.

use crate::LocaleMap;
use crate::error::{Error, Result};
use crate::util::text_len;

/// A group of entries sent together in one remote request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    entries: LocaleMap,
    length: usize,
}

impl Batch {
    fn push(&mut self, key: String, value: String, len: usize) {
        self.entries.insert(key, value);
        self.length += len;
    }

    /// Summed character length of all values
    pub const fn length(&self) -> usize {
        self.length
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub const fn entries(&self) -> &LocaleMap {
        &self.entries
    }

    pub fn into_entries(self) -> LocaleMap {
        self.entries
    }
}

/// Split `map` into the fewest in-order batches whose summed value length
/// stays within `max_len`.
///
/// An entry that would overflow the current batch starts the next one. A
/// single value longer than `max_len` is an error, never split.
pub fn partition(map: &LocaleMap, max_len: usize) -> Result<Vec<Batch>> {
    let mut batches = Vec::new();
    let mut current = Batch::default();

    for (key, value) in map {
        let len = text_len(value);
        if len > max_len {
            return Err(Error::ContentTooLong {
                key: key.clone(),
                length: len,
                limit: max_len,
            });
        }

        if current.length + len > max_len && !current.is_empty() {
            batches.push(std::mem::take(&mut current));
        }
        current.push(key.clone(), value.clone(), len);
    }

    if !current.is_empty() {
        batches.push(current);
    }

    Ok(batches)
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

    #[test]
    fn test_small_map_is_one_batch() {
        let source = map(&[("a", "Hi"), ("b", "Yo")]);
        let batches = partition(&source, 10).unwrap();

        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].entries(), &source);
        assert_eq!(batches[0].length(), 4);
    }

    #[test]
    fn test_oversized_value_is_rejected() {
        let source = map(&[("a", "Hello"), ("b", "World")]);
        let err = partition(&source, 4).unwrap_err();

        assert!(matches!(
            err,
            Error::ContentTooLong { ref key, length: 5, limit: 4 } if key == "a"
        ));
    }

    #[test]
    fn test_overflowing_entry_starts_next_batch() {
        let source = map(&[("a", "aaaa"), ("b", "bbbb"), ("c", "cc"), ("d", "dddd")]);
        let batches = partition(&source, 10).unwrap();

        let keys: Vec<Vec<&str>> = batches
            .iter()
            .map(|b| b.entries().keys().map(String::as_str).collect())
            .collect();
        assert_eq!(keys, vec![vec!["a", "b", "c"], vec!["d"]]);
        assert_eq!(batches[0].length(), 10);
    }

    #[test]
    fn test_value_exactly_at_limit_fits_alone() {
        let source = map(&[("a", "x"), ("b", "yyyy")]);
        let batches = partition(&source, 4).unwrap();

        assert_eq!(batches.len(), 2);
        assert_eq!(batches[1].length(), 4);
    }

    #[test]
    fn test_partition_covers_every_key_once_within_limit() {
        let source: LocaleMap = (0..200)
            .map(|i| (format!("key{i:03}"), "x".repeat(i % 37 + 1)))
            .collect();
        let limit = 64;

        let batches = partition(&source, limit).unwrap();
        let again = partition(&source, limit).unwrap();
        assert_eq!(batches, again);

        let mut seen = LocaleMap::new();
        for batch in &batches {
            assert!(batch.length() <= limit);
            for (k, v) in batch.entries() {
                assert!(seen.insert(k.clone(), v.clone()).is_none(), "duplicate key {k}");
            }
        }
        assert_eq!(seen, source);
    }

    #[test]
    fn test_multibyte_text_counts_chars() {
        let source = map(&[("a", "你好世界")]);
        assert_eq!(partition(&source, 4).unwrap().len(), 1);
    }

    #[test]
    fn test_empty_map_has_no_batches() {
        assert!(partition(&LocaleMap::new(), 10).unwrap().is_empty());
    }
}
