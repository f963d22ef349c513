//! Outcome aggregation
//!
//! Classifies terminal outcomes as they arrive: successes are counted,
//! failures and skips are collected. The aggregator is fed by a single
//! consumer (the scheduler loop), so it needs no locking.

use crate::downloader::fetcher::FetchOutcome;
use crate::output::{FailureRecord, FailureReport, ProgressSink};

/// A response that was fetched but not saved because of its media type
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SkippedRecord {
    pub url: String,
    pub content_type: Option<String>,
}

/// Final classification of a run's outcomes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    /// Number of requests resolved
    pub resolved: usize,

    /// Number of payloads written
    pub succeeded: usize,

    /// Failures in input order
    pub report: FailureReport,

    /// Content-type skips in input order
    pub skipped: Vec<SkippedRecord>,
}

/// Collects outcomes and drives progress reporting
#[derive(Debug, Default)]
pub struct Aggregator {
    resolved: usize,
    succeeded: usize,
    failures: Vec<(usize, FailureRecord)>,
    skipped: Vec<(usize, SkippedRecord)>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the outcome of the request at input position `index`
    ///
    /// Advances `progress` by one for every outcome, skips included.
    pub fn record(&mut self, index: usize, outcome: FetchOutcome, progress: &dyn ProgressSink) {
        match outcome {
            FetchOutcome::Success { .. } => {
                self.succeeded += 1;
            }
            FetchOutcome::Failure {
                url,
                status,
                reason,
            } => {
                self.failures.push((
                    index,
                    FailureRecord {
                        url,
                        status,
                        reason,
                    },
                ));
            }
            FetchOutcome::Skipped { url, content_type } => {
                self.skipped
                    .push((index, SkippedRecord { url, content_type }));
            }
        }

        self.resolved += 1;
        progress.advance(1);
    }

    /// Number of outcomes recorded so far
    pub fn resolved(&self) -> usize {
        self.resolved
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Produces the final tally, with failures and skips in input order
    pub fn finish(mut self) -> Tally {
        self.failures.sort_by_key(|(index, _)| *index);
        self.skipped.sort_by_key(|(index, _)| *index);

        Tally {
            resolved: self.resolved,
            succeeded: self.succeeded,
            report: self.failures.into_iter().map(|(_, record)| record).collect(),
            skipped: self.skipped.into_iter().map(|(_, record)| record).collect(),
        }
    }
}
