use serde::Deserialize;

/// Main configuration structure for News-Catalog
///
/// Every section is optional; a missing section takes the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub detect: DetectConfig,
    #[serde(default)]
    pub publishers: Vec<PublisherEntry>,
    #[serde(default)]
    pub snapshots: SnapshotConfig,
}

/// File locations for inputs, the catalog, side outputs and the head cache
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// CSV file with a `url` column
    #[serde(rename = "input-csv")]
    pub input_csv: String,

    /// YAML catalog of stories and pending URLs
    pub catalog: String,

    /// CSV of URLs that need a human look
    #[serde(rename = "review-csv")]
    pub review_csv: String,

    /// CSV of blocked URLs queued for manual snapshot capture
    #[serde(rename = "snapshot-csv")]
    pub snapshot_csv: String,

    /// Directory of minimized `<key>.head.html` documents
    #[serde(rename = "head-cache-dir")]
    pub head_cache_dir: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input_csv: "data/in_the_news.csv".to_string(),
            catalog: "data/in_the_news.yml".to_string(),
            review_csv: "data/in_the_news_needs_review.csv".to_string(),
            snapshot_csv: "data/in_the_news_needs_snapshot.csv".to_string(),
            head_cache_dir: "cache/news_head".to_string(),
        }
    }
}

/// HTTP fetch behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetchConfig {
    /// Upper bound of the random politeness sleep before each request (milliseconds)
    #[serde(rename = "sleep-max-ms")]
    pub sleep_max_ms: u64,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Maximum redirect hops followed before giving up with `redirect_loop`
    #[serde(rename = "max-redirects")]
    pub max_redirects: usize,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Accept-Language header sent with every request
    #[serde(rename = "accept-language")]
    pub accept_language: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            sleep_max_ms: 1000,
            timeout_secs: 20,
            max_redirects: 10,
            user_agent: concat!(
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) ",
                "AppleWebKit/537.36 (KHTML, like Gecko) ",
                "Chrome/120.0.0.0 Safari/537.36"
            )
            .to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
        }
    }
}

/// Block/quality detection thresholds and extra markers
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DetectConfig {
    /// How much of the body prefix is scanned for block markers (bytes)
    #[serde(rename = "scan-bytes")]
    pub scan_bytes: usize,

    /// HTML bodies smaller than this (and non-empty) are treated as suspicious (bytes)
    #[serde(rename = "min-body-bytes")]
    pub min_body_bytes: usize,

    /// Markers appended after the built-in table
    pub markers: Vec<MarkerEntry>,
}

impl Default for DetectConfig {
    fn default() -> Self {
        Self {
            scan_bytes: 2048,
            min_body_bytes: 5120,
            markers: Vec::new(),
        }
    }
}

/// A configured block marker
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MarkerEntry {
    /// Token written into the pending reason, e.g. `datadome`
    pub token: String,

    /// Case-insensitive substring searched for in the body prefix
    pub needle: String,
}

/// Maps a host pattern to a publisher name
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PublisherEntry {
    /// Domain pattern (e.g., "dailyherald.com" or "*.dailyherald.com")
    pub domain: String,

    /// Source name used when a page does not name its publisher
    pub source: String,
}

/// Locations used by the snapshot import tool
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SnapshotConfig {
    /// Directory of manually saved full-page HTML snapshots
    #[serde(rename = "input-dir")]
    pub input_dir: String,

    /// Index CSV written after each import
    #[serde(rename = "index-csv")]
    pub index_csv: String,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            input_dir: "snapshots/news_full".to_string(),
            index_csv: "snapshots/news_full/index.csv".to_string(),
        }
    }
}
