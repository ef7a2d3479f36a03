use crate::url::normalize_url;

/// Where a URL was seen during one observation of a page
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlContext<'a> {
    /// URL the page's head claims for itself (canonical, og:url, ...)
    pub head_url: Option<&'a str>,
    /// URL after redirects
    pub final_url: &'a str,
    /// URL from the input list
    pub input_url: &'a str,
}

/// Scores a URL as a story's primary URL
///
/// | Condition | Score |
/// |-----------|-------|
/// | equals the head URL and is `https` | 30 |
/// | equals the post-redirect URL | 20 |
/// | is `https` | 15 |
/// | equals the input URL | 10 |
/// | anything else | 5 |
pub fn primary_url_score(url: &str, ctx: &UrlContext<'_>) -> u8 {
    let url = normalize_url(url);
    let same = |other: &str| {
        let other = normalize_url(other);
        !url.is_empty() && url == other
    };
    let https = url.starts_with("https://");

    if https && ctx.head_url.map(same).unwrap_or(false) {
        30
    } else if same(ctx.final_url) {
        20
    } else if https {
        15
    } else if same(ctx.input_url) {
        10
    } else {
        5
    }
}

/// The URL a new observation proposes as primary
///
/// First of: the head URL (only when `https`), the post-redirect URL, the input URL.
pub fn primary_candidate(ctx: &UrlContext<'_>) -> Option<String> {
    let head = ctx
        .head_url
        .map(normalize_url)
        .filter(|u| u.starts_with("https://"));

    head.into_iter()
        .chain([normalize_url(ctx.final_url), normalize_url(ctx.input_url)])
        .find(|u| !u.is_empty())
}

/// Replaces `current` with `candidate` only when it scores strictly higher
///
/// Ties keep the existing value. Returns true if the primary changed.
pub fn rescore_primary(
    current: &mut Option<String>,
    candidate: Option<&str>,
    ctx: &UrlContext<'_>,
) -> bool {
    let Some(candidate) = candidate.filter(|c| !c.trim().is_empty()) else {
        return false;
    };

    match current.as_deref().filter(|c| !c.trim().is_empty()) {
        None => {
            *current = Some(candidate.to_string());
            true
        }
        Some(existing) => {
            if primary_url_score(candidate, ctx) > primary_url_score(existing, ctx) {
                *current = Some(candidate.to_string());
                true
            } else {
                false
            }
        }
    }
}
