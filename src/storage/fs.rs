use crate::storage::traits::{MediaStore, StorageError, StorageResult};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Upper bound on numeric suffixes tried for one stem
const MAX_SUFFIX_ATTEMPTS: u32 = 10_000;

/// Stores media files in a single flat directory
///
/// Name collisions are resolved by appending a counter to the stem:
/// `cat.gif`, then `cat0.gif`, `cat1.gif`, and so on.
#[derive(Debug, Clone)]
pub struct FsMediaStore {
    dir: PathBuf,
    extension: String,
}

impl FsMediaStore {
    /// Creates a store writing `<stem>.<extension>` files into `dir`
    ///
    /// The directory must already exist.
    pub fn new(dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        let extension = extension.into();
        Self {
            dir: dir.into(),
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    /// Returns the directory files are written into
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn candidate(&self, stem: &str, suffix: Option<u32>) -> PathBuf {
        let name = match suffix {
            None => format!("{}.{}", stem, self.extension),
            Some(n) => format!("{}{}.{}", stem, n, self.extension),
        };
        self.dir.join(name)
    }
}

impl MediaStore for FsMediaStore {
    fn store(&self, stem: &str, bytes: &[u8]) -> StorageResult<PathBuf> {
        let suffixes = std::iter::once(None).chain((0..MAX_SUFFIX_ATTEMPTS).map(Some));

        for suffix in suffixes {
            let path = self.candidate(stem, suffix);

            // create_new makes the existence check and the creation atomic
            let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(source) => return Err(StorageError::Io { path, source }),
            };

            if let Err(source) = file.write_all(bytes).and_then(|_| file.flush()) {
                // Don't leave a truncated file behind to shadow the name
                let _ = fs::remove_file(&path);
                return Err(StorageError::Io { path, source });
            }

            tracing::debug!("Stored {} bytes at {}", bytes.len(), path.display());
            return Ok(path);
        }

        Err(StorageError::NamesExhausted {
            stem: stem.to_string(),
            attempts: MAX_SUFFIX_ATTEMPTS + 1,
        })
    }
}
