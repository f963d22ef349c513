//! URL handling module for Gifgrab
//!
//! Host filtering for the download list and file-name derivation for
//! downloaded media.

mod domain;
mod filename;

pub use domain::{extract_host, is_target_host};
pub use filename::{file_stem, FALLBACK_STEM};
