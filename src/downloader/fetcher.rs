//! Fetch worker
//!
//! This module handles the download of a single URL:
//! - Admission through the shared rate gate
//! - The HTTP GET itself, bounded by the client timeout
//! - Status and Content-Type validation
//! - Handing the payload to the media store
//!
//! Every error is turned into a `FetchOutcome` here; nothing a single
//! download does can abort its siblings.

use crate::config::{DownloaderConfig, UserAgentConfig};
use crate::downloader::gate::RateGate;
use crate::storage::MediaStore;
use crate::url::{extract_host, file_stem};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::path::PathBuf;
use std::sync::Arc;

/// One URL to download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    /// Position in the input list; duplicates of a URL get distinct indices
    pub index: usize,

    /// The source URL
    pub url: String,
}

impl DownloadRequest {
    pub fn new(index: usize, url: impl Into<String>) -> Self {
        Self {
            index,
            url: url.into(),
        }
    }

    /// Builds requests for a list of URLs, indexed in input order
    pub fn from_urls<I, S>(urls: I) -> Vec<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        urls.into_iter()
            .enumerate()
            .map(|(index, url)| Self::new(index, url))
            .collect()
    }
}

/// Terminal result of one download
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Payload fetched and written to storage
    Success {
        url: String,
        /// Where the payload was written
        path: PathBuf,
    },

    /// Non-success status, transport fault or storage failure
    Failure {
        url: String,
        /// HTTP status code, absent when no response was received
        status: Option<u16>,
        reason: String,
    },

    /// Response succeeded but declared the wrong media type; nothing written
    Skipped {
        url: String,
        content_type: Option<String>,
    },
}

impl FetchOutcome {
    pub fn url(&self) -> &str {
        match self {
            Self::Success { url, .. } | Self::Failure { url, .. } | Self::Skipped { url, .. } => {
                url
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Everything a fetch worker needs, shared by all workers of a run
pub struct FetchContext {
    pub client: Client,
    pub gate: Arc<RateGate>,
    pub store: Arc<dyn MediaStore>,
    /// Media type a response must declare, e.g. `image/gif`
    pub expected_content_type: String,
}

/// Builds the HTTP client used for all downloads
///
/// The overall timeout bounds each fetch, body included, so a stalled
/// server cannot hold a worker forever.
pub fn build_http_client(
    downloader: &DownloaderConfig,
    user_agent: &UserAgentConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(downloader.request_timeout())
        .connect_timeout(downloader.connect_timeout())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Checks a Content-Type header value against the expected media type
///
/// Parameters such as `; charset=...` are ignored and the comparison is
/// case-insensitive. A missing header never matches.
pub fn content_type_matches(header: Option<&str>, expected: &str) -> bool {
    let Some(header) = header else {
        return false;
    };

    let media_type = header.split(';').next().unwrap_or("").trim();
    media_type.eq_ignore_ascii_case(expected.trim())
}

/// Downloads a single URL
///
/// # Request Flow
///
/// 1. Wait for gate admission; the token's release is scheduled at once
/// 2. Derive the file stem from the URL
/// 3. Send the GET request
/// 4. Non-success status → `Failure` with the status code
/// 5. Content-Type mismatch → `Skipped`
/// 6. Read the body and store it → `Success`
///
/// | Condition | Outcome |
/// |-----------|---------|
/// | HTTP 2xx, expected type | Success |
/// | HTTP non-2xx | Failure { status: Some(code) } |
/// | HTTP 2xx, other type | Skipped |
/// | Timeout / connect / body error | Failure { status: None } |
/// | Storage error | Failure { status: None } |
/// | Gate closed | Failure { status: None } |
pub async fn fetch_url(ctx: &FetchContext, request: DownloadRequest) -> FetchOutcome {
    if !ctx.gate.admit().await {
        tracing::warn!("Rate gate closed, dropping {}", request.url);
        return FetchOutcome::Failure {
            url: request.url,
            status: None,
            reason: "rate gate closed".to_string(),
        };
    }

    let url = request.url;
    let stem = file_stem(&url);
    let host = ::url::Url::parse(&url)
        .ok()
        .and_then(|parsed| extract_host(&parsed))
        .unwrap_or_default();

    tracing::debug!("Fetching {} (#{})", url, request.index);

    let response = match ctx.client.get(&url).send().await {
        Ok(response) => response,
        Err(e) => {
            let reason = classify_transport_error(&e);
            tracing::warn!(host = %host, file = %stem, "Download failed: {}", reason);
            return FetchOutcome::Failure {
                url,
                status: None,
                reason,
            };
        }
    };

    let status = response.status();
    if !status.is_success() {
        tracing::warn!(
            host = %host,
            file = %stem,
            status = status.as_u16(),
            "Download failed on file {} ({})",
            stem,
            status.as_u16()
        );
        return FetchOutcome::Failure {
            url,
            status: Some(status.as_u16()),
            reason: format!("HTTP {}", status),
        };
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    if !content_type_matches(content_type.as_deref(), &ctx.expected_content_type) {
        tracing::warn!(
            host = %host,
            file = %stem,
            "Skipping {}: expected {}, got {}",
            stem,
            ctx.expected_content_type,
            content_type.as_deref().unwrap_or("no content type")
        );
        return FetchOutcome::Skipped { url, content_type };
    }

    let body = match response.bytes().await {
        Ok(body) => body,
        Err(e) => {
            let reason = classify_transport_error(&e);
            tracing::warn!(host = %host, file = %stem, "Download failed: {}", reason);
            return FetchOutcome::Failure {
                url,
                status: None,
                reason,
            };
        }
    };

    let store = Arc::clone(&ctx.store);
    let stored = tokio::task::spawn_blocking(move || store.store(&stem, &body)).await;

    match stored {
        Ok(Ok(path)) => {
            tracing::debug!("Saved {} to {}", url, path.display());
            FetchOutcome::Success { url, path }
        }
        Ok(Err(e)) => {
            tracing::error!("Failed to save {}: {}", url, e);
            FetchOutcome::Failure {
                url,
                status: None,
                reason: e.to_string(),
            }
        }
        Err(e) => {
            tracing::error!("Storage task for {} failed: {}", url, e);
            FetchOutcome::Failure {
                url,
                status: None,
                reason: format!("storage task failed: {}", e),
            }
        }
    }
}

/// Describes a transport-level error for logs and the failure record
fn classify_transport_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        "Connection failed".to_string()
    } else if e.is_body() || e.is_decode() {
        format!("Failed to read response body: {}", e)
    } else {
        e.to_string()
    }
}
