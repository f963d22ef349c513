//! Storage module for persisting downloaded media
//!
//! This module handles writing fetched payloads to disk, including
//! collision-free file naming when several downloads share a stem.

mod fs;
mod traits;

pub use fs::FsMediaStore;
pub use traits::{MediaStore, StorageError, StorageResult};
