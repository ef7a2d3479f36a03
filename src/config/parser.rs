use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use news_catalog::config::load_config;
///
/// let config = load_config(Path::new("news.toml")).unwrap();
/// println!("Catalog: {}", config.paths.catalog);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so a run can be tied to the exact configuration it used.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&content);
    Ok(hex::encode(hasher.finalize()))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_full_config() {
        let config_content = r#"
[paths]
input-csv = "in.csv"
catalog = "out/catalog.yml"
review-csv = "out/review.csv"
snapshot-csv = "out/snapshot.csv"
head-cache-dir = "cache/heads"

[fetch]
sleep-max-ms = 0
timeout-secs = 5
max-redirects = 4
user-agent = "TestAgent/1.0"
accept-language = "en"

[detect]
scan-bytes = 1024
min-body-bytes = 2048

[[detect.markers]]
token = "datadome"
needle = "datadome"

[[publishers]]
domain = "*.example.com"
source = "Example Times"
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.paths.catalog, "out/catalog.yml");
        assert_eq!(config.fetch.timeout_secs, 5);
        assert_eq!(config.fetch.max_redirects, 4);
        assert_eq!(config.detect.markers.len(), 1);
        assert_eq!(config.publishers[0].source, "Example Times");
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.paths.catalog, "data/in_the_news.yml");
        assert_eq!(config.fetch.sleep_max_ms, 1000);
        assert_eq!(config.detect.min_body_bytes, 5120);
        assert!(config.publishers.is_empty());
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config = parse_config("[fetch]\ntimeout-secs = 3\n").unwrap();
        assert_eq!(config.fetch.timeout_secs, 3);
        assert_eq!(config.fetch.max_redirects, 10);
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/news.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result = parse_config("[fetch]\nretries = 3\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let result = parse_config("[fetch]\ntimeout-secs = 0\n");
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_compute_config_hash() {
        let file = create_temp_config("test content");

        let hash1 = compute_config_hash(file.path()).unwrap();
        let hash2 = compute_config_hash(file.path()).unwrap();

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_different_content_different_hash() {
        let file1 = create_temp_config("content 1");
        let file2 = create_temp_config("content 2");

        assert_ne!(
            compute_config_hash(file1.path()).unwrap(),
            compute_config_hash(file2.path()).unwrap()
        );
    }
}
