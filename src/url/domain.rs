use url::Url;

/// Extracts the host from a URL
///
/// The host is lowercased. URLs without a host (which shouldn't happen for
/// valid HTTP(S) URLs) yield `None`.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use gifgrab::url::extract_host;
///
/// let url = Url::parse("https://MEDIA.discordapp.net/a.gif").unwrap();
/// assert_eq!(extract_host(&url), Some("media.discordapp.net".to_string()));
/// ```
pub fn extract_host(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Checks whether a URL string points at the target media host
///
/// The host must contain `target` (case-insensitive). Strings that do not
/// parse as URLs never match.
///
/// # Examples
///
/// ```
/// use gifgrab::url::is_target_host;
///
/// assert!(is_target_host("https://media.discordapp.net/a/b.gif", "media.discordapp.net"));
/// assert!(!is_target_host("https://tenor.com/view/b.gif", "media.discordapp.net"));
/// assert!(!is_target_host("not a url", "media.discordapp.net"));
/// ```
pub fn is_target_host(url: &str, target: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };

    match extract_host(&parsed) {
        Some(host) => host.contains(&target.to_lowercase()),
        None => false,
    }
}
