use crate::config::types::{Config, DownloaderConfig, FilterConfig, PathsConfig, UserAgentConfig};
use crate::ConfigError;

/// Longest accepted token release delay (milliseconds)
const MAX_RELEASE_DELAY_MS: u64 = 10 * 60 * 1000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_downloader_config(&config.downloader)?;
    validate_filter_config(&config.filter)?;
    validate_paths_config(&config.paths)?;
    validate_user_agent_config(&config.user_agent)?;
    Ok(())
}

/// Validates gate and client settings
fn validate_downloader_config(config: &DownloaderConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_requests < 1 || config.max_concurrent_requests > 100 {
        return Err(ConfigError::Validation(format!(
            "max-concurrent-requests must be between 1 and 100, got {}",
            config.max_concurrent_requests
        )));
    }

    if config.release_delay_ms > MAX_RELEASE_DELAY_MS {
        return Err(ConfigError::Validation(format!(
            "release-delay-ms must be <= {}ms, got {}ms",
            MAX_RELEASE_DELAY_MS, config.release_delay_ms
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request-timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "connect-timeout-secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_filter_config(config: &FilterConfig) -> Result<(), ConfigError> {
    let content_type = config.expected_content_type.trim();
    if content_type.is_empty() {
        return Err(ConfigError::Validation(
            "expected-content-type cannot be empty".to_string(),
        ));
    }

    // A bare media type such as "image/gif"
    match content_type.split_once('/') {
        Some((kind, subtype)) if !kind.is_empty() && !subtype.is_empty() => {}
        _ => {
            return Err(ConfigError::Validation(format!(
                "expected-content-type must look like 'type/subtype', got '{}'",
                config.expected_content_type
            )));
        }
    }

    if config.target_host.trim().is_empty() {
        return Err(ConfigError::Validation(
            "target-host cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_paths_config(config: &PathsConfig) -> Result<(), ConfigError> {
    if config.package_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "package-path cannot be empty".to_string(),
        ));
    }

    if config.member_path.is_empty() {
        return Err(ConfigError::Validation(
            "member-path cannot be empty".to_string(),
        ));
    }

    if config.output_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "output-dir cannot be empty".to_string(),
        ));
    }

    if config.report_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "report-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.name.is_empty() {
        return Err(ConfigError::Validation(
            "user-agent name cannot be empty".to_string(),
        ));
    }

    if !config.name.chars().all(|c| c.is_alphanumeric() || c == '-') {
        return Err(ConfigError::Validation(format!(
            "user-agent name must contain only alphanumeric characters and hyphens, got '{}'",
            config.name
        )));
    }

    if config.version.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent version cannot be empty".to_string(),
        ));
    }

    Ok(())
}
