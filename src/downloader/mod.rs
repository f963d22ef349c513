//! Downloader module for fetching favorited media
//!
//! This module contains the core download logic, including:
//! - A rate gate capping how many requests start per time window
//! - The per-URL fetch worker
//! - Concurrent fan-out over the whole URL list
//! - Outcome aggregation and progress reporting

mod aggregator;
mod fetcher;
mod gate;
mod scheduler;

pub use aggregator::{Aggregator, SkippedRecord, Tally};
pub use fetcher::{
    build_http_client, content_type_matches, fetch_url, DownloadRequest, FetchContext,
    FetchOutcome,
};
pub use gate::{GateToken, RateGate};
pub use scheduler::{Scheduler, SchedulerSettings};

use crate::archive::{ensure_package_exists, load_media_urls, MediaList};
use crate::config::Config;
use crate::output::{FailureReport, ProgressSink};
use crate::storage::FsMediaStore;
use crate::{GrabError, PrecheckError};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Result of a completed download run
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// URLs queued for download
    pub total: usize,

    /// Favorites found in the package before host filtering
    pub favorites_found: usize,

    pub succeeded: usize,

    /// Failed downloads, as written to the report file
    pub report: FailureReport,

    /// Downloads dropped for declaring the wrong media type
    pub skipped: Vec<SkippedRecord>,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunSummary {
    pub fn failed(&self) -> usize {
        self.report.len()
    }

    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

impl SchedulerSettings {
    /// Extracts the gate and validation settings from a configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            capacity: config.downloader.max_concurrent_requests as usize,
            release_delay: config.downloader.release_delay(),
            expected_content_type: config.filter.expected_content_type.clone(),
        }
    }
}

/// File extension used for stored media, taken from the expected media type
///
/// `image/gif` becomes `gif`; `image/svg+xml` becomes `svg`.
pub fn extension_for(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .and_then(|media| media.trim().split_once('/'))
        .map(|(_, subtype)| subtype.split('+').next().unwrap_or(subtype))
        .filter(|ext| !ext.is_empty())
        .unwrap_or("bin")
        .to_ascii_lowercase()
}

/// Checks the fatal pre-flight conditions, in order
///
/// 1. The output directory must not exist yet
/// 2. The report file's directory must exist
/// 3. The data package must exist
pub fn precheck(config: &Config) -> Result<(), PrecheckError> {
    let output_dir = &config.paths.output_dir;
    if output_dir.exists() {
        return Err(PrecheckError::OutputDirExists(output_dir.clone()));
    }

    // A bare file name lands in the working directory
    if let Some(report_dir) = config.paths.report_path.parent() {
        if !report_dir.as_os_str().is_empty() && !report_dir.is_dir() {
            return Err(PrecheckError::ReportDirMissing(report_dir.to_path_buf()));
        }
    }

    ensure_package_exists(&config.paths.package_path)
}

/// Runs the prechecks and loads the URL list without downloading anything
///
/// Creates no files or directories.
pub fn plan(config: &Config) -> Result<MediaList, GrabError> {
    precheck(config)?;

    tracing::info!("Found {}", config.paths.package_path.display());

    load_media_urls(
        &config.paths.package_path,
        &config.paths.member_path,
        &config.filter.target_host,
    )
}

/// Runs a complete download operation
///
/// This is the main entry point. It will:
/// 1. Check that no previous output exists and the report and package
///    locations are usable
/// 2. Load the favorite URLs from the package
/// 3. Create the output directory
/// 4. Download every URL through the shared rate gate
/// 5. Write the failure report
///
/// Errors before step 3 leave the filesystem untouched. Per-download
/// errors never surface here; they end up in the report.
///
/// # Example
///
/// ```no_run
/// use gifgrab::config::Config;
/// use gifgrab::downloader::run;
/// use gifgrab::output::LogProgress;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let summary = run(&Config::default(), &LogProgress::default()).await?;
/// println!("{} downloaded", summary.succeeded);
/// # Ok(())
/// # }
/// ```
pub async fn run(config: &Config, progress: &dyn ProgressSink) -> Result<RunSummary, GrabError> {
    let media = plan(config)?;

    let output_dir = &config.paths.output_dir;
    std::fs::create_dir_all(output_dir)?;
    tracing::debug!("Created output directory {}", output_dir.display());

    let client = build_http_client(&config.downloader, &config.user_agent)?;
    let store = Arc::new(FsMediaStore::new(
        output_dir,
        extension_for(&config.filter.expected_content_type),
    ));
    let scheduler = Scheduler::new(client, store, SchedulerSettings::from_config(config));

    let started_at = Utc::now();
    let total = media.urls.len();
    let tally = scheduler
        .run(DownloadRequest::from_urls(media.urls), progress)
        .await;
    let finished_at = Utc::now();

    tally.report.write_to(&config.paths.report_path)?;

    tracing::info!(
        "Completed: {} saved, {} failed, {} skipped",
        tally.succeeded,
        tally.report.len(),
        tally.skipped.len()
    );

    Ok(RunSummary {
        total,
        favorites_found: media.favorites_found,
        succeeded: tally.succeeded,
        report: tally.report,
        skipped: tally.skipped,
        started_at,
        finished_at,
    })
}
