//! Progress reporting
//!
//! The downloader never talks to a console directly. It reports through a
//! `ProgressSink` handed to it by the caller.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Receives progress signals from a download run
///
/// `start` is called once with the number of requests, then `advance` once
/// per resolved request (success, failure or skip alike), then `finish`.
pub trait ProgressSink: Send + Sync {
    /// Announces the total number of requests in the run
    fn start(&self, total: usize);

    /// Marks `n` more requests as resolved
    fn advance(&self, n: usize);

    /// Called once after the last request resolved
    fn finish(&self) {}
}

/// Discards all progress signals
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn start(&self, _total: usize) {}

    fn advance(&self, _n: usize) {}
}

/// Reports progress through `tracing`
///
/// Every advance is logged at debug level; an info line is emitted every
/// `log_every` resolved requests and when the run completes.
#[derive(Debug)]
pub struct LogProgress {
    total: AtomicUsize,
    resolved: AtomicUsize,
    log_every: usize,
}

impl LogProgress {
    pub fn new(log_every: usize) -> Self {
        Self {
            total: AtomicUsize::new(0),
            resolved: AtomicUsize::new(0),
            log_every: log_every.max(1),
        }
    }

    /// Number of requests resolved so far
    pub fn resolved(&self) -> usize {
        self.resolved.load(Ordering::SeqCst)
    }
}

impl Default for LogProgress {
    fn default() -> Self {
        Self::new(10)
    }
}

impl ProgressSink for LogProgress {
    fn start(&self, total: usize) {
        self.total.store(total, Ordering::SeqCst);
        self.resolved.store(0, Ordering::SeqCst);
        tracing::info!("Downloads starting: {} queued", total);
    }

    fn advance(&self, n: usize) {
        let resolved = self.resolved.fetch_add(n, Ordering::SeqCst) + n;
        let total = self.total.load(Ordering::SeqCst);

        tracing::debug!("Progress: {}/{}", resolved, total);

        // Log when a multiple of log_every is crossed, not only hit exactly
        if (resolved / self.log_every) > ((resolved - n) / self.log_every) && resolved < total {
            let percent = if total > 0 {
                resolved as f64 / total as f64 * 100.0
            } else {
                100.0
            };
            tracing::info!("Progress: {}/{} resolved ({:.0}%)", resolved, total, percent);
        }
    }

    fn finish(&self) {
        tracing::info!(
            "Progress: {}/{} resolved",
            self.resolved.load(Ordering::SeqCst),
            self.total.load(Ordering::SeqCst)
        );
    }
}
