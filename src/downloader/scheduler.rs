//! Download fan-out
//!
//! Launches one fetch worker per request, all admitted through the same
//! rate gate, and feeds their outcomes to the aggregator as they complete.
//! Completion order is unconstrained and no worker can cancel another.

use crate::downloader::aggregator::{Aggregator, Tally};
use crate::downloader::fetcher::{fetch_url, DownloadRequest, FetchContext, FetchOutcome};
use crate::downloader::gate::RateGate;
use crate::output::ProgressSink;
use crate::storage::MediaStore;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

/// Gate and validation settings for a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerSettings {
    /// Gate capacity (requests started per release window)
    pub capacity: usize,

    /// Delay before an admitted token becomes reusable
    pub release_delay: Duration,

    /// Media type responses must declare
    pub expected_content_type: String,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            capacity: 5,
            release_delay: Duration::from_secs(3),
            expected_content_type: "image/gif".to_string(),
        }
    }
}

/// Runs a batch of downloads against one shared gate
pub struct Scheduler {
    ctx: Arc<FetchContext>,
}

impl Scheduler {
    /// Creates a scheduler and the gate its workers will share
    pub fn new(client: Client, store: Arc<dyn MediaStore>, settings: SchedulerSettings) -> Self {
        let gate = Arc::new(RateGate::new(settings.capacity, settings.release_delay));

        Self {
            ctx: Arc::new(FetchContext {
                client,
                gate,
                store,
                expected_content_type: settings.expected_content_type,
            }),
        }
    }

    /// Returns the shared gate
    pub fn gate(&self) -> &Arc<RateGate> {
        &self.ctx.gate
    }

    /// Downloads every request and returns the aggregated outcomes
    ///
    /// Waits until every worker has reached a terminal outcome. A worker
    /// that panics is recorded as a failure without a status code.
    pub async fn run(&self, requests: Vec<DownloadRequest>, progress: &dyn ProgressSink) -> Tally {
        let total = requests.len();
        progress.start(total);

        tracing::info!(
            "Scheduling {} downloads: {} per {:?} window",
            total,
            self.ctx.gate.capacity(),
            self.ctx.gate.release_delay()
        );

        let mut unresolved: HashMap<usize, String> = HashMap::with_capacity(total);
        let mut tasks = JoinSet::new();

        for request in requests {
            unresolved.insert(request.index, request.url.clone());
            let ctx = Arc::clone(&self.ctx);
            tasks.spawn(async move {
                let index = request.index;
                let outcome = fetch_url(&ctx, request).await;
                (index, outcome)
            });
        }

        let mut aggregator = Aggregator::new();

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => {
                    unresolved.remove(&index);
                    aggregator.record(index, outcome, progress);
                }
                Err(e) => {
                    // The index is lost with the task; it is picked up below
                    tracing::error!("Download task failed: {}", e);
                }
            }
        }

        let mut orphans: Vec<_> = unresolved.into_iter().collect();
        orphans.sort_by_key(|(index, _)| *index);
        for (index, url) in orphans {
            aggregator.record(
                index,
                FetchOutcome::Failure {
                    url,
                    status: None,
                    reason: "download task failed".to_string(),
                },
                progress,
            );
        }

        progress.finish();
        aggregator.finish()
    }
}
