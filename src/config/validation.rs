use crate::config::types::{
    Config, DetectConfig, FetchConfig, PathsConfig, PublisherEntry, SnapshotConfig,
};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_paths(&config.paths)?;
    validate_fetch(&config.fetch)?;
    validate_detect(&config.detect)?;
    validate_publishers(&config.publishers)?;
    validate_snapshots(&config.snapshots)?;
    Ok(())
}

/// Validates that every configured path is non-empty
fn validate_paths(paths: &PathsConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("input-csv", &paths.input_csv),
        ("catalog", &paths.catalog),
        ("review-csv", &paths.review_csv),
        ("snapshot-csv", &paths.snapshot_csv),
        ("head-cache-dir", &paths.head_cache_dir),
    ] {
        if value.trim().is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }
    }

    Ok(())
}

/// Validates fetch configuration
fn validate_fetch(fetch: &FetchConfig) -> Result<(), ConfigError> {
    if fetch.timeout_secs < 1 || fetch.timeout_secs > 300 {
        return Err(ConfigError::Validation(format!(
            "timeout-secs must be between 1 and 300, got {}",
            fetch.timeout_secs
        )));
    }

    if fetch.sleep_max_ms > 60_000 {
        return Err(ConfigError::Validation(format!(
            "sleep-max-ms must be <= 60000ms, got {}ms",
            fetch.sleep_max_ms
        )));
    }

    if fetch.max_redirects < 1 || fetch.max_redirects > 30 {
        return Err(ConfigError::Validation(format!(
            "max-redirects must be between 1 and 30, got {}",
            fetch.max_redirects
        )));
    }

    if fetch.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates detection thresholds and configured markers
fn validate_detect(detect: &DetectConfig) -> Result<(), ConfigError> {
    if detect.scan_bytes < 64 {
        return Err(ConfigError::Validation(format!(
            "scan-bytes must be >= 64, got {}",
            detect.scan_bytes
        )));
    }

    for marker in &detect.markers {
        if marker.token.is_empty()
            || !marker
                .token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(ConfigError::Validation(format!(
                "marker token must be non-empty [A-Za-z0-9_], got '{}'",
                marker.token
            )));
        }

        if marker.needle.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "marker '{}' has an empty needle",
                marker.token
            )));
        }
    }

    Ok(())
}

/// Validates publisher table entries
fn validate_publishers(publishers: &[PublisherEntry]) -> Result<(), ConfigError> {
    for entry in publishers {
        validate_domain_pattern(&entry.domain)?;

        if entry.source.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "publisher '{}' must name a source",
                entry.domain
            )));
        }
    }

    Ok(())
}

/// Validates snapshot import locations
fn validate_snapshots(snapshots: &SnapshotConfig) -> Result<(), ConfigError> {
    if snapshots.input_dir.trim().is_empty() || snapshots.index_csv.trim().is_empty() {
        return Err(ConfigError::Validation(
            "snapshot input-dir and index-csv cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates a domain pattern (supports a leading `*.` wildcard)
fn validate_domain_pattern(pattern: &str) -> Result<(), ConfigError> {
    let domain = pattern.strip_prefix("*.").unwrap_or(pattern);

    if domain.is_empty() {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain pattern '{}' has no domain",
            pattern
        )));
    }

    if !domain
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' contains invalid characters",
            domain
        )));
    }

    if domain.starts_with('.')
        || domain.ends_with('.')
        || domain.starts_with('-')
        || domain.ends_with('-')
        || domain.contains("..")
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' is malformed",
            domain
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' must contain at least one dot (e.g., 'example.com')",
            domain
        )));
    }

    Ok(())
}
