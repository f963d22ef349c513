use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for Gifgrab
///
/// Every section is optional; a missing file or section falls back to the
/// defaults that match a stock data package layout.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub downloader: DownloaderConfig,
    pub filter: FilterConfig,
    pub paths: PathsConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
}

/// Download gate and HTTP client behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DownloaderConfig {
    /// Number of requests that may be started within one release window
    #[serde(rename = "max-concurrent-requests")]
    pub max_concurrent_requests: u32,

    /// Time after admission before a gate token becomes reusable (milliseconds)
    #[serde(rename = "release-delay-ms")]
    pub release_delay_ms: u64,

    /// Overall deadline for a single fetch, body included (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Deadline for establishing a connection (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,
}

impl DownloaderConfig {
    pub fn release_delay(&self) -> Duration {
        Duration::from_millis(self.release_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            max_concurrent_requests: 5,
            release_delay_ms: 3000,
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

/// Which URLs are downloaded and which responses are accepted
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Media type a response must declare to be saved
    #[serde(rename = "expected-content-type")]
    pub expected_content_type: String,

    /// Substring a URL's host must contain to be queued
    #[serde(rename = "target-host")]
    pub target_host: String,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            expected_content_type: "image/gif".to_string(),
            target_host: "media.discordapp.net".to_string(),
        }
    }
}

/// Input and output locations
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Path to the zipped data package
    #[serde(rename = "package-path")]
    pub package_path: PathBuf,

    /// Archive member holding the user settings JSON
    #[serde(rename = "member-path")]
    pub member_path: String,

    /// Directory downloads are written into; must not exist yet
    #[serde(rename = "output-dir")]
    pub output_dir: PathBuf,

    /// Where the failed download list is written
    #[serde(rename = "report-path")]
    pub report_path: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            package_path: PathBuf::from("package.zip"),
            member_path: "account/user.json".to_string(),
            output_dir: PathBuf::from("gifs"),
            report_path: PathBuf::from("failed_downloads.json"),
        }
    }
}

/// Client identification sent with every request
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    pub name: String,
    pub version: String,
}

impl UserAgentConfig {
    /// Formats the User-Agent header value
    pub fn header_value(&self) -> String {
        format!("{}/{}", self.name, self.version)
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            name: "gifgrab".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
