use crate::extract::HeadData;
use crate::text::{looks_like_html, normalize_text, teaser_truncate, TEASER_WORDS};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

/// How much of the page the byline scan looks at (characters)
const BYLINE_SCAN_CHARS: usize = 8000;

/// Longest byline accepted from the raw-text scan
const BYLINE_MAX_CHARS: usize = 60;

static RE_SCRIPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script.*?</script>").unwrap());
static RE_STYLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<style.*?</style>").unwrap());
static RE_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());
static RE_BYLINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[Bb][Yy]\s+([A-Z][A-Za-z.'\-]+(?:\s+[A-Z][A-Za-z.'\-]+){0,4})\b").unwrap()
});

/// Normalized article fields; `None` means no source provided a usable value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub published_time: Option<String>,
    pub modified_time: Option<String>,
    pub source: Option<String>,
    /// Word-truncated description
    pub teaser: Option<String>,
}

/// Extracts article metadata from a full page or a cached head document
///
/// # Priority
///
/// For every field the first non-empty value wins:
///
/// 1. JSON-LD `Article`/`NewsArticle` (`headline`, `datePublished`, `dateModified`,
///    `author`, `publisher.name`, `description`)
/// 2. Meta tags (`author`, `sailthru.author`, `article:published_time`, `parsely-pub-date`,
///    `sailthru.date`, `article:modified_time`, `og:title`, `og:site_name`, `og:description`)
/// 3. The `<title>` tag, and a `By <Name>` scan near the top of the page
///
/// Values that are really leaked HTML markup are discarded.
pub fn extract_metadata(html: &str) -> ArticleMetadata {
    let head = HeadData::parse(html);
    let mut meta = head.article().map(from_json_ld).unwrap_or_default();

    let from_name = |key: &str| clean(head.name(key).unwrap_or(""));
    let from_property = |key: &str| clean(head.property(key).unwrap_or(""));

    meta.author = meta
        .author
        .or_else(|| from_name("author"))
        .or_else(|| from_name("sailthru.author"));
    meta.published_time = meta
        .published_time
        .or_else(|| from_property("article:published_time"))
        .or_else(|| from_name("parsely-pub-date"))
        .or_else(|| from_name("sailthru.date"));
    meta.modified_time = meta
        .modified_time
        .or_else(|| from_property("article:modified_time"));
    meta.title = meta.title.or_else(|| from_property("og:title"));
    meta.source = meta.source.or_else(|| from_property("og:site_name"));
    meta.teaser = meta
        .teaser
        .or_else(|| teaser(head.property("og:description").unwrap_or("")));

    meta.title = meta.title.or_else(|| clean(&head.title));
    meta.author = meta.author.or_else(|| byline_fallback(html));

    meta
}

fn from_json_ld(article: &Map<String, Value>) -> ArticleMetadata {
    let text = |key: &str| clean(article.get(key).and_then(Value::as_str).unwrap_or(""));

    let author = match article.get("author") {
        Some(Value::Object(a)) => a.get("name").and_then(Value::as_str).and_then(clean),
        Some(Value::Array(list)) => match list.first() {
            Some(Value::Object(a)) => a.get("name").and_then(Value::as_str).and_then(clean),
            Some(Value::String(s)) => clean(s),
            _ => None,
        },
        Some(Value::String(s)) => clean(s),
        _ => None,
    };

    let source = article
        .get("publisher")
        .and_then(|p| p.get("name"))
        .and_then(Value::as_str)
        .and_then(clean);

    ArticleMetadata {
        title: text("headline"),
        author,
        published_time: text("datePublished"),
        modified_time: text("dateModified"),
        source,
        teaser: teaser(article.get("description").and_then(Value::as_str).unwrap_or("")),
    }
}

/// Normalizes a value and drops it if empty or HTML-looking
fn clean(value: &str) -> Option<String> {
    let value = normalize_text(value);
    (!value.is_empty() && !looks_like_html(&value)).then_some(value)
}

fn teaser(description: &str) -> Option<String> {
    clean(description).map(|d| teaser_truncate(&d, TEASER_WORDS))
}

/// Removes scripts, styles and tags, leaving whitespace-normalized text
fn strip_tags(html: &str) -> String {
    let text = RE_SCRIPT.replace_all(html, " ");
    let text = RE_STYLE.replace_all(&text, " ");
    let text = RE_TAG.replace_all(&text, " ");
    normalize_text(&text)
}

/// Finds a `By <Capitalized Name>` byline near the top of the page
fn byline_fallback(html: &str) -> Option<String> {
    let snippet: String = html.chars().take(BYLINE_SCAN_CHARS).collect();
    let plain = strip_tags(&snippet);

    let caps = RE_BYLINE.captures(&plain)?;
    let name = normalize_text(&caps[1]);
    (!name.is_empty() && name.chars().count() <= BYLINE_MAX_CHARS).then_some(name)
}
