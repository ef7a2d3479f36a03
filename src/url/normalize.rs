use crate::text::normalize_text;
use url::Url;

/// Normalizes a URL string as it arrives from CSV files and HTML attributes
///
/// Decodes HTML entities (`&amp;` in hrefs is common) and trims whitespace. Scheme, host
/// case, query and fragment are left exactly as written, because URLs are compared
/// byte-for-byte when deduplicating a story's URL list and hashed for head-cache keys.
///
/// # Examples
///
/// ```
/// use news_catalog::url::normalize_url;
///
/// assert_eq!(
///     normalize_url("  https://example.com/a?x=1&amp;y=2 "),
///     "https://example.com/a?x=1&y=2"
/// );
/// ```
pub fn normalize_url(url: &str) -> String {
    normalize_text(url)
}

/// Returns the `https://` twin of an `http://` URL
pub fn https_variant(url: &str) -> Option<String> {
    url.strip_prefix("http://")
        .map(|rest| format!("https://{}", rest))
}

/// Resolves an href found in a page against that page's URL
///
/// Returns `None` if the link should be ignored:
/// - empty hrefs
/// - `javascript:`, `mailto:`, `tel:` and `data:` links
/// - hrefs that do not resolve to an HTTP(S) URL
///
/// Protocol-relative hrefs (`//host/path`) are upgraded to `https:`.
pub fn resolve_link(href: &str, base_url: &str) -> Option<String> {
    let href = normalize_url(href);
    if href.is_empty() {
        return None;
    }

    let lower = href.to_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
    {
        return None;
    }

    if let Some(rest) = href.strip_prefix("//") {
        return Some(format!("https://{}", rest));
    }

    // absolute hrefs are kept as written so they hash to the same cache key every run
    if let Ok(absolute) = Url::parse(&href) {
        return matches!(absolute.scheme(), "http" | "https").then_some(href);
    }

    let resolved = Url::parse(base_url).ok()?.join(&href).ok()?;
    match resolved.scheme() {
        "http" | "https" => Some(resolved.to_string()),
        _ => None,
    }
}
