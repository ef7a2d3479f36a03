use url::Url;

/// Extracts the network location (lowercase host plus any explicit port) from a URL
///
/// Returns `None` for strings that do not parse or carry no host.
///
/// # Examples
///
/// ```
/// use news_catalog::url::extract_host;
///
/// assert_eq!(extract_host("https://WWW.DailyHerald.com/x"), Some("www.dailyherald.com".to_string()));
/// assert_eq!(extract_host("http://127.0.0.1:8080/a"), Some("127.0.0.1:8080".to_string()));
/// assert_eq!(extract_host("not a url"), None);
/// ```
pub fn extract_host(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_lowercase();

    match parsed.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host),
    }
}

/// Checks a host against a domain pattern
///
/// `"*.example.com"` matches `example.com` and every subdomain of it; a pattern without
/// the wildcard prefix matches only that exact host. Any port on the host is ignored.
pub fn host_matches(pattern: &str, host: &str) -> bool {
    let host = host.split(':').next().unwrap_or_default();

    match pattern.strip_prefix("*.") {
        Some(base) => {
            host == base
                || host
                    .strip_suffix(base)
                    .is_some_and(|rest| rest.ends_with('.'))
        }
        None => host == pattern,
    }
}
