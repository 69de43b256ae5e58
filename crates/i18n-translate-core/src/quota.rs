//! Process-wide character quota.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::LocaleMap;
use crate::config::QuotaConfig;
use crate::error::{Error, Result};
use crate::util::text_len;

/// Cumulative character counter guarded by an optional ceiling.
///
/// Share one tracker (behind an `Arc`) across every language of a run.
/// Checks reserve atomically, so concurrent callers never overshoot.
#[derive(Debug)]
pub struct QuotaTracker {
    consumed: AtomicU64,
    ceiling: Option<u64>,
}

impl QuotaTracker {
    pub const fn new(ceiling: Option<u64>, consumed: u64) -> Self {
        Self {
            consumed: AtomicU64::new(consumed),
            ceiling,
        }
    }

    pub const fn unbounded() -> Self {
        Self::new(None, 0)
    }

    pub const fn from_config(config: &QuotaConfig) -> Self {
        Self::new(config.ceiling, config.consumed)
    }

    pub fn consumed(&self) -> u64 {
        self.consumed.load(Ordering::SeqCst)
    }

    pub const fn ceiling(&self) -> Option<u64> {
        self.ceiling
    }

    /// Remaining characters, or `None` when unbounded
    pub fn remaining(&self) -> Option<u64> {
        self.ceiling
            .map(|ceiling| ceiling.saturating_sub(self.consumed()))
    }

    /// Reserve the summed value length of `entries`.
    ///
    /// Returns false and leaves the counter untouched when the reservation
    /// would pass the ceiling. Unbounded trackers always accept and do not count.
    pub fn check(&self, entries: &LocaleMap) -> bool {
        self.reserve(entries).is_ok()
    }

    /// Like [`check`](Self::check), but reports why a reservation failed
    pub fn reserve(&self, entries: &LocaleMap) -> Result<()> {
        let Some(ceiling) = self.ceiling else {
            return Ok(());
        };

        let requested: u64 = entries
            .values()
            .map(|v| u64::try_from(text_len(v)).unwrap_or(u64::MAX))
            .fold(0, u64::saturating_add);

        self.consumed
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |consumed| {
                consumed
                    .checked_add(requested)
                    .filter(|total| *total <= ceiling)
            })
            .map(|_| ())
            .map_err(|consumed| Error::QuotaExceeded {
                requested,
                consumed,
                ceiling,
            })
    }
}

impl Default for QuotaTracker {
    fn default() -> Self {
        Self::unbounded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn entries(values: &[&str]) -> LocaleMap {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| (format!("k{i}"), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_unbounded_always_accepts_without_counting() {
        let quota = QuotaTracker::unbounded();
        assert!(quota.check(&entries(&["x".repeat(1_000_000).as_str()])));
        assert_eq!(quota.consumed(), 0);
        assert_eq!(quota.remaining(), None);
    }

    #[test]
    fn test_exact_ceiling_then_one_more() {
        let quota = QuotaTracker::new(Some(10), 0);

        assert!(quota.check(&entries(&["Hello", "World"])));
        assert_eq!(quota.consumed(), 10);
        assert_eq!(quota.remaining(), Some(0));

        assert!(!quota.check(&entries(&["!"])));
        assert_eq!(quota.consumed(), 10);
    }

    #[test]
    fn test_rejection_does_not_mutate() {
        let quota = QuotaTracker::new(Some(8), 3);

        let err = quota.reserve(&entries(&["abcdef"])).unwrap_err();
        assert!(matches!(
            err,
            Error::QuotaExceeded { requested: 6, consumed: 3, ceiling: 8 }
        ));
        assert_eq!(quota.consumed(), 3);

        assert!(quota.check(&entries(&["abcde"])));
        assert_eq!(quota.consumed(), 8);
    }

    #[test]
    fn test_starting_consumption_counts() {
        let quota = QuotaTracker::from_config(&QuotaConfig {
            ceiling: Some(100),
            consumed: 95,
            ..Default::default()
        });
        assert!(!quota.check(&entries(&["abcdef"])));
        assert!(quota.check(&entries(&["abcde"])));
    }

    #[test]
    fn test_concurrent_reservations_never_overshoot() {
        let quota = Arc::new(QuotaTracker::new(Some(1000), 0));
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let quota = Arc::clone(&quota);
                std::thread::spawn(move || {
                    (0..100)
                        .filter(|_| quota.check(&entries(&["abc"])))
                        .count()
                })
            })
            .collect();

        let accepted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(accepted, 333);
        assert_eq!(quota.consumed(), 999);
    }
}
