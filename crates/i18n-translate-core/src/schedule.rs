//! Rate-limited dispatch of batches in timed windows.

use std::future::Future;
use std::time::Duration;

use futures::future::try_join_all;
use tokio::time::{Instant, sleep_until};
use tracing::debug;

use crate::LocaleMap;
use crate::error::Result;
use crate::partition::Batch;

/// Batches fired together, at most one window's worth of requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    pub index: usize,
    pub batches: Vec<Batch>,
}

impl Window {
    /// Offset from the start of dispatch at which this window may fire
    pub fn offset(&self, spacing: Duration) -> Duration {
        spacing.saturating_mul(u32::try_from(self.index).unwrap_or(u32::MAX))
    }
}

/// Group batches into windows of at most `per_window`, keeping their order.
pub fn schedule(batches: Vec<Batch>, per_window: usize) -> Vec<Window> {
    let per_window = per_window.max(1);
    let mut windows = Vec::with_capacity(batches.len().div_ceil(per_window));
    let mut iter = batches.into_iter().peekable();

    while iter.peek().is_some() {
        windows.push(Window {
            index: windows.len(),
            batches: iter.by_ref().take(per_window).collect(),
        });
    }

    windows
}

/// Send every window and merge the translations.
///
/// Window `i` starts no earlier than `i * spacing` after this call and never
/// before window `i - 1` has fully completed. The first failing batch aborts
/// the whole dispatch and its error is returned; nothing is merged.
pub async fn run_windows<F, Fut>(windows: Vec<Window>, spacing: Duration, send: F) -> Result<LocaleMap>
where
    F: Fn(Batch) -> Fut,
    Fut: Future<Output = Result<LocaleMap>>,
{
    let start = Instant::now();
    let mut merged = LocaleMap::new();

    for window in windows {
        if window.index > 0 {
            sleep_until(start + window.offset(spacing)).await;
        }

        debug!(
            "Sending window {} ({} batches) at +{}ms",
            window.index,
            window.batches.len(),
            start.elapsed().as_millis()
        );

        let results = try_join_all(window.batches.into_iter().map(&send)).await?;
        for translated in results {
            merged.extend(translated);
        }
    }

    Ok(merged)
}
