//! Output module for reporting download results
//!
//! This module handles:
//! - Progress reporting while downloads run
//! - Persisting the failed download list
//! - Printing the end-of-run summary

mod progress;
mod report;
mod summary;

pub use progress::{LogProgress, NoopProgress, ProgressSink};
pub use report::{FailureRecord, FailureReport, ReportError};
pub use summary::{print_summary, success_rate};
