//! Failure report persistence
//!
//! Failed downloads are written as a pretty-printed JSON list of
//! `{"url": ..., "status": ...}` objects so they can be retried by hand.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while writing the failure report
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write report to {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

/// One failed download
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FailureRecord {
    /// The URL that could not be downloaded
    pub url: String,

    /// HTTP status code; `None` when no response was received
    pub status: Option<u16>,

    /// Human-readable cause, kept for logs only
    #[serde(skip)]
    pub reason: String,
}

/// Ordered list of failed downloads
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FailureReport {
    entries: Vec<FailureRecord>,
}

impl FailureReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: FailureRecord) {
        self.entries.push(record);
    }

    pub fn entries(&self) -> &[FailureRecord] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serializes the report with four-space indentation
    pub fn to_json(&self) -> Result<String, ReportError> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer)?;
        // serde_json only ever emits valid UTF-8
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Writes the report to `path`, replacing any previous report
    pub fn write_to(&self, path: &Path) -> Result<(), ReportError> {
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|source| ReportError::Io {
            path: path.display().to_string(),
            source,
        })?;

        tracing::info!(
            "Saved {} failed downloads to {}",
            self.entries.len(),
            path.display()
        );
        Ok(())
    }
}

impl FromIterator<FailureRecord> for FailureReport {
    fn from_iter<I: IntoIterator<Item = FailureRecord>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
