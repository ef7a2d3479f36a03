use crate::extract::json_ld_scripts;
use crate::storage::{read_text_lossy, write_if_changed, StorageResult};
use crate::text::normalize_text;
use crate::url::{https_variant, normalize_url};
use scraper::{Html, Selector};
use serde_json::Value;
use sha1::{Digest, Sha1};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Length of a cache key in hex characters
pub const KEY_LEN: usize = 12;

/// Cache file suffix
pub const HEAD_SUFFIX: &str = ".head.html";

/// JSON-LD keys removed before caching (compared lowercased)
const IMAGE_KEYS: &[&str] = &["image", "thumbnail", "thumbnailurl", "logo"];

/// Content-addressed store of minimized head documents
///
/// One file per URL: `<dir>/<key>.head.html`, where the key is the first 12 hex
/// characters of the SHA-1 of the normalized URL.
#[derive(Debug, Clone)]
pub struct HeadCache {
    dir: PathBuf,
}

impl HeadCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Cache key of a URL
    ///
    /// # Examples
    ///
    /// ```
    /// use news_catalog::cache::HeadCache;
    ///
    /// let key = HeadCache::key_for(" https://example.com/a ");
    /// assert_eq!(key, HeadCache::key_for("https://example.com/a"));
    /// assert_eq!(key.len(), 12);
    /// ```
    pub fn key_for(url: &str) -> String {
        let digest = Sha1::digest(normalize_url(url).as_bytes());
        let mut key = hex::encode(digest);
        key.truncate(KEY_LEN);
        key
    }

    /// Cache file path of a URL
    pub fn path_for(&self, url: &str) -> PathBuf {
        self.dir
            .join(format!("{}{}", Self::key_for(url), HEAD_SUFFIX))
    }

    /// Candidate cache paths for a set of URLs, in priority order
    ///
    /// Each non-empty URL contributes its own path followed by the path of its `https`
    /// twin. Duplicate paths are dropped.
    pub fn candidates(&self, urls: &[&str]) -> Vec<PathBuf> {
        let mut out: Vec<PathBuf> = Vec::new();
        for url in urls {
            let url = normalize_url(url);
            if url.is_empty() {
                continue;
            }

            let variant = https_variant(&url);
            for candidate in std::iter::once(url).chain(variant) {
                let path = self.path_for(&candidate);
                if !out.contains(&path) {
                    out.push(path);
                }
            }
        }
        out
    }

    /// First existing cache file among the candidates of `urls`
    ///
    /// A canonical URL discovered today may differ from the URL a page was cached
    /// under on an earlier run, so every alias of the page is worth trying.
    pub fn find_existing(&self, urls: &[&str]) -> Option<PathBuf> {
        self.candidates(urls).into_iter().find(|p| p.is_file())
    }

    /// Builds and stores the head document of a page
    ///
    /// # Returns
    ///
    /// `true` if the file changed on disk
    pub fn write(&self, path: &Path, full_html: &str) -> StorageResult<bool> {
        write_if_changed(path, &build_head_document(full_html))
    }

    /// Reads a cached head document, `None` if missing or unreadable
    pub fn read(&self, path: &Path) -> Option<String> {
        match read_text_lossy(path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to read head cache {}: {}", path.display(), e);
                None
            }
        }
    }
}

/// Builds a minimal HTML document holding only the head metadata worth keeping
///
/// Includes:
/// - `<title>`
/// - every `<meta>` except image-related ones
/// - every `<link>` except icons and images
/// - every JSON-LD script that parses, with image fields removed
///
/// Attributes are written sorted by name and empty values are skipped, so the same
/// page always produces the same bytes.
pub fn build_head_document(full_html: &str) -> String {
    let document = Html::parse_document(full_html);
    let mut lines = vec![
        "<!doctype html>".to_string(),
        "<html>".to_string(),
        "<head>".to_string(),
    ];

    if let Some(title) = first_text(&document, "title") {
        lines.push(format!("<title>{}</title>", escape_html(&title)));
    }

    push_tags(&document, "meta", keep_meta, &mut lines);
    push_tags(&document, "link", keep_link, &mut lines);

    for raw in json_ld_scripts(&document) {
        let Ok(value) = serde_json::from_str::<Value>(&raw) else {
            continue;
        };
        let Ok(pretty) = serde_json::to_string_pretty(&strip_images(value)) else {
            continue;
        };
        lines.push("<script type=\"application/ld+json\">".to_string());
        lines.push(pretty.replace("</", "<\\/"));
        lines.push("</script>".to_string());
    }

    lines.push("</head>".to_string());
    lines.push("</html>".to_string());

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn first_text(document: &Html, tag: &str) -> Option<String> {
    let selector = Selector::parse(tag).ok()?;
    document
        .select(&selector)
        .next()
        .map(|e| normalize_text(&e.text().collect::<String>()))
        .filter(|t| !t.is_empty())
}

fn push_tags(
    document: &Html,
    tag: &str,
    keep: fn(&BTreeMap<String, String>) -> bool,
    lines: &mut Vec<String>,
) {
    let Ok(selector) = Selector::parse(tag) else {
        return;
    };

    for element in document.select(&selector) {
        let attrs: BTreeMap<String, String> = element
            .value()
            .attrs()
            .map(|(k, v)| (k.to_lowercase(), v.to_string()))
            .collect();
        if keep(&attrs) {
            lines.push(emit_tag(tag, &attrs));
        }
    }
}

fn attr(attrs: &BTreeMap<String, String>, key: &str) -> String {
    normalize_text(attrs.get(key).map(String::as_str).unwrap_or("")).to_lowercase()
}

fn keep_meta(attrs: &BTreeMap<String, String>) -> bool {
    let property = attr(attrs, "property");
    let key = if property.is_empty() {
        attr(attrs, "name")
    } else {
        property
    };

    !(key.starts_with("og:image")
        || key.starts_with("twitter:image")
        || matches!(key.as_str(), "image" | "thumbnail" | "thumbnailurl"))
}

fn keep_link(attrs: &BTreeMap<String, String>) -> bool {
    attr(attrs, "as") != "image" && !attr(attrs, "rel").contains("icon")
}

fn emit_tag(tag: &str, attrs: &BTreeMap<String, String>) -> String {
    let mut parts = vec![tag.to_string()];
    for (key, value) in attrs {
        if value.is_empty() {
            continue;
        }
        parts.push(format!("{}=\"{}\"", key, escape_html(value)));
    }
    format!("<{}>", parts.join(" "))
}

/// Recursively drops image-bearing keys from a JSON-LD value
fn strip_images(value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.into_iter().map(strip_images).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(k, _)| !IMAGE_KEYS.contains(&k.to_lowercase().as_str()))
                .map(|(k, v)| (k, strip_images(v)))
                .collect(),
        ),
        other => other,
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
