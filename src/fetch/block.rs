use crate::config::DetectConfig;
use crate::fetch::FetchOutcome;

/// Built-in block markers, evaluated in order
///
/// Each entry is `(token, needle)`; the needle is matched case-insensitively against the
/// start of the body.
pub const BUILTIN_MARKERS: &[(&str, &str)] = &[
    ("enable_javascript", "enable javascript"),
    ("captcha", "captcha"),
    ("access_denied", "access denied"),
    ("incident_id", "incident id"),
    ("incapsula", "incapsula"),
    ("imperva", "imperva"),
    ("bot_check", "are you a robot"),
    ("cloudflare", "cf-browser-verification"),
];

/// Reason token for HTML bodies under the size floor
pub const BODY_TOO_SMALL: &str = "body_too_small";

/// One entry of the marker table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockMarker {
    pub token: String,
    /// Lowercased needle
    pub needle: String,
}

/// Result of block detection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockVerdict {
    pub blocked: bool,
    /// Marker tokens in table order, then `body_too_small`
    pub reasons: Vec<String>,
}

impl BlockVerdict {
    /// Pending reason: `blocked`, or `blocked:` followed by the `;`-joined reasons
    pub fn reason(&self) -> String {
        if self.reasons.is_empty() {
            "blocked".to_string()
        } else {
            format!("blocked:{}", self.reasons.join(";"))
        }
    }
}

/// Flags bot-block pages and undersized bodies
#[derive(Debug, Clone)]
pub struct BlockDetector {
    markers: Vec<BlockMarker>,
    scan_bytes: usize,
    min_body_bytes: usize,
}

impl BlockDetector {
    /// Builds a detector from the built-in markers plus any configured ones
    pub fn new(config: &DetectConfig) -> Self {
        let mut markers: Vec<BlockMarker> = BUILTIN_MARKERS
            .iter()
            .map(|(token, needle)| BlockMarker {
                token: token.to_string(),
                needle: needle.to_string(),
            })
            .collect();

        for extra in &config.markers {
            if markers.iter().any(|m| m.token == extra.token) {
                continue;
            }
            markers.push(BlockMarker {
                token: extra.token.clone(),
                needle: extra.needle.to_lowercase(),
            });
        }

        Self {
            markers,
            scan_bytes: config.scan_bytes,
            min_body_bytes: config.min_body_bytes,
        }
    }

    /// Marker tokens found in the first `scan_bytes` of a body, in table order
    pub fn detect_markers(&self, snippet: &str) -> Vec<String> {
        let mut end = snippet.len().min(self.scan_bytes);
        while !snippet.is_char_boundary(end) {
            end -= 1;
        }
        let haystack = snippet[..end].to_lowercase();

        self.markers
            .iter()
            .filter(|m| haystack.contains(&m.needle))
            .map(|m| m.token.clone())
            .collect()
    }

    /// Returns true for a non-empty body under the size floor
    pub fn is_too_small(&self, byte_count: usize) -> bool {
        byte_count > 0 && byte_count < self.min_body_bytes
    }

    /// Returns true when a body is large enough to be worth caching
    ///
    /// An empty body never qualifies, whatever the configured floor.
    pub fn meets_size_floor(&self, byte_count: usize) -> bool {
        byte_count > 0 && byte_count >= self.min_body_bytes
    }

    /// Classifies an HTML body prefix
    ///
    /// The caller is responsible for only asking about HTML responses.
    pub fn is_blocked(&self, snippet: &str, byte_count: usize) -> BlockVerdict {
        let mut reasons = self.detect_markers(snippet);
        if self.is_too_small(byte_count) {
            reasons.push(BODY_TOO_SMALL.to_string());
        }

        BlockVerdict {
            blocked: !reasons.is_empty(),
            reasons,
        }
    }

    /// Classifies a fetch outcome
    ///
    /// Non-HTML responses and transport failures are never blocked.
    pub fn inspect(&self, outcome: &FetchOutcome) -> BlockVerdict {
        if outcome.status_code == 0 || !is_html_content_type(&outcome.content_type) {
            return BlockVerdict::default();
        }

        self.is_blocked(&outcome.snippet, outcome.byte_count)
    }
}

impl Default for BlockDetector {
    fn default() -> Self {
        Self::new(&DetectConfig::default())
    }
}

/// Returns true for HTML media types; a missing content type counts as HTML
pub fn is_html_content_type(content_type: &str) -> bool {
    let content_type = content_type.trim().to_lowercase();
    content_type.is_empty()
        || content_type.contains("text/html")
        || content_type.contains("application/xhtml+xml")
}
