//! Data package loading
//!
//! This module turns a zipped personal data package into the list of media
//! URLs to download:
//! - Opening the package and reading the user settings member
//! - Parsing the settings JSON
//! - Keeping only favorites hosted on the target media host

mod favorites;
mod package;

pub use favorites::extract_favorite_urls;
pub use package::{ensure_package_exists, read_member};

use crate::GrabError;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while reading the data package
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to decode zip archive {path}: {source}")]
    Zip {
        path: PathBuf,
        source: zip::result::ZipError,
    },

    #[error("Failed to parse user settings JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing field in user settings: {0}")]
    MissingField(String),
}

/// Media URLs extracted from a data package
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaList {
    /// Number of favorites in the package, before host filtering
    pub favorites_found: usize,

    /// URLs on the target host, in document order
    pub urls: Vec<String>,
}

/// Loads the favorite media URLs from a data package
///
/// # Arguments
///
/// * `package` - Path to the zipped data package
/// * `member` - Archive member holding the user settings
/// * `target_host` - Host substring a URL must match to be kept
///
/// # Returns
///
/// * `Ok(MediaList)` - The URLs to download
/// * `Err(GrabError)` - Precheck failure (missing package or member) or archive error
pub fn load_media_urls(
    package: &Path,
    member: &str,
    target_host: &str,
) -> Result<MediaList, GrabError> {
    let content = read_member(package, member)?;
    let list = extract_favorite_urls(&content, target_host)?;

    tracing::info!(
        "Loaded favorites list with {} entries, {} hosted on {}",
        list.favorites_found,
        list.urls.len(),
        target_host
    );

    Ok(list)
}
