//! Storage traits and error types
//!
//! This module defines the trait interface for media storage backends and
//! associated error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error writing {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("No free file name for '{stem}' after {attempts} attempts")]
    NamesExhausted { stem: String, attempts: u32 },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for media storage backends
///
/// Fetch workers call `store` once per successful download, from the
/// blocking pool, so implementations must be thread-safe. Picking a free
/// name and creating the file must happen as one step: two workers storing
/// the same stem concurrently must end up with two distinct files.
pub trait MediaStore: Send + Sync {
    /// Persists a downloaded payload
    ///
    /// # Arguments
    ///
    /// * `stem` - File name without extension, derived from the source URL
    /// * `bytes` - The full response body
    ///
    /// # Returns
    ///
    /// The path the payload was written to
    fn store(&self, stem: &str, bytes: &[u8]) -> StorageResult<PathBuf>;
}
