//! Gifgrab: a polite bulk downloader for favorited GIFs
//!
//! This crate reads the favorite GIF list out of a personal data package,
//! downloads every media file it references through a rate-limited gate,
//! and records the downloads that failed so they can be retried by hand.

pub mod archive;
pub mod config;
pub mod downloader;
pub mod output;
pub mod storage;
pub mod url;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Gifgrab operations
#[derive(Debug, Error)]
pub enum GrabError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Precheck(#[from] PrecheckError),

    #[error("Archive error: {0}")]
    Archive(#[from] archive::ArchiveError),

    #[error("Report error: {0}")]
    Report(#[from] output::ReportError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Fatal conditions detected before any download starts
#[derive(Debug, Error)]
pub enum PrecheckError {
    #[error(
        "The {0} folder already exists and your GIFs may already be downloaded. \
         Rename or delete it to avoid creating duplicates."
    )]
    OutputDirExists(PathBuf),

    #[error("Cannot write the failure report: folder {0} does not exist.")]
    ReportDirMissing(PathBuf),

    #[error("{0} not found. Place your data package next to this program.")]
    PackageMissing(PathBuf),

    #[error("{member} not found in {package}. The data package may be corrupted.")]
    MemberMissing { member: String, package: PathBuf },
}

/// Result type alias for Gifgrab operations
pub type Result<T> = std::result::Result<T, GrabError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use downloader::{DownloadRequest, FetchOutcome, RateGate, RunSummary};
pub use output::{FailureRecord, FailureReport, ProgressSink};
