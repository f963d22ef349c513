use crate::archive::{ArchiveError, MediaList};
use crate::url::is_target_host;
use serde_json::Value;

/// Location of the favorite GIF map inside the user settings JSON
const FAVORITES_PATH: [&str; 4] = ["settings", "frecency", "favoriteGifs", "gifs"];

/// Extracts favorite media URLs hosted on `target_host`
///
/// The favorites are stored as an object mapping an opaque key to an entry
/// with a `src` URL. Entries keep their document order; entries without a
/// string `src` are ignored. Duplicate URLs are kept.
///
/// # Arguments
///
/// * `json` - The user settings document
/// * `target_host` - Host substring a URL must match to be kept
///
/// # Returns
///
/// * `Ok(MediaList)` - The number of favorites and the matching URLs
/// * `Err(ArchiveError)` - Invalid JSON or the favorites map is missing
pub fn extract_favorite_urls(json: &str, target_host: &str) -> Result<MediaList, ArchiveError> {
    let root: Value = serde_json::from_str(json)?;

    let mut node = &root;
    for (depth, key) in FAVORITES_PATH.iter().enumerate() {
        node = node
            .get(key)
            .ok_or_else(|| ArchiveError::MissingField(FAVORITES_PATH[..=depth].join(".")))?;
    }

    let favorites = node
        .as_object()
        .ok_or_else(|| ArchiveError::MissingField(FAVORITES_PATH.join(".")))?;

    let urls: Vec<String> = favorites
        .values()
        .filter_map(|entry| entry.get("src").and_then(Value::as_str))
        .filter(|src| is_target_host(src, target_host))
        .map(str::to_string)
        .collect();

    Ok(MediaList {
        favorites_found: favorites.len(),
        urls,
    })
}
