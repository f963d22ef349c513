use url::Url;

/// Stem used when nothing usable can be derived from a URL
pub const FALLBACK_STEM: &str = "download";

/// Derives a file stem (name without extension) from a URL
///
/// Takes the last non-empty path segment, drops its final extension and
/// replaces characters outside `[A-Za-z0-9._-]` with `_`. Query strings and
/// fragments never contribute to the name.
///
/// # Examples
///
/// ```
/// use gifgrab::url::file_stem;
///
/// assert_eq!(file_stem("https://media.discordapp.net/attachments/1/2/dance.gif?width=200"), "dance");
/// assert_eq!(file_stem("https://example.com/"), "download");
/// ```
pub fn file_stem(url: &str) -> String {
    let segment = Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .path_segments()
                .and_then(|segments| segments.filter(|s| !s.is_empty()).last().map(str::to_string))
        })
        .unwrap_or_default();

    let stem = match segment.rsplit_once('.') {
        Some((stem, _ext)) if !stem.is_empty() => stem,
        _ => segment.as_str(),
    };

    let sanitized: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.is_empty() || sanitized.chars().all(|c| c == '.') {
        FALLBACK_STEM.to_string()
    } else {
        sanitized
    }
}
