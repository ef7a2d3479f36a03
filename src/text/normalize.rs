use scraper::Html;
use std::borrow::Cow;

/// Number of words kept in a story teaser
pub const TEASER_WORDS: usize = 12;

/// Lowercase words kept lowercase in a title guess (unless first)
const SMALL_WORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "to", "of", "in", "on", "at", "for", "with", "by",
];

/// Decodes HTML character references (`&amp;`, `&#8217;`, ...)
///
/// Text without an ampersand is returned untouched. Text that also carries a `<` is left
/// alone, since handing it to the HTML parser could swallow it as markup.
pub fn decode_entities(text: &str) -> Cow<'_, str> {
    if !text.contains('&') || text.contains('<') {
        return Cow::Borrowed(text);
    }

    let fragment = Html::parse_fragment(text);
    Cow::Owned(fragment.root_element().text().collect())
}

/// Normalizes extracted text: decodes entities, collapses whitespace, trims
///
/// # Examples
///
/// ```
/// use news_catalog::text::normalize_text;
///
/// assert_eq!(normalize_text("  LEGO &amp; Trains\n\tShow "), "LEGO & Trains Show");
/// ```
pub fn normalize_text(text: &str) -> String {
    decode_entities(text)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Drops every non-ASCII character
pub fn safe_ascii(text: &str) -> String {
    text.chars().filter(|c| c.is_ascii()).collect()
}

/// Makes a URL-ish slug: lowercase ASCII letters, digits and single hyphens
///
/// # Examples
///
/// ```
/// use news_catalog::text::slugify;
///
/// assert_eq!(slugify("LEGO Show -- Draws Crowds!"), "lego-show-draws-crowds");
/// ```
pub fn slugify(text: &str) -> String {
    let lower = safe_ascii(&normalize_text(text)).to_lowercase();

    let mut slug = String::with_capacity(lower.len());
    for c in lower.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }

    slug.trim_matches('-').to_string()
}

/// Makes a deterministic source key (lowercase alphanumerics only)
///
/// `"Daily Herald"` and `"daily-herald"` both become `"dailyherald"`.
pub fn keyify_source(source: &str) -> String {
    slugify(source).replace('-', "")
}

/// Canonicalizes text for story fingerprinting
///
/// Lowercases, folds unicode dashes and hyphens into spaces, replaces everything that is
/// not `a-z0-9` with a space, and collapses runs of whitespace.
pub fn normalize_fingerprint_text(text: &str) -> String {
    let lower = normalize_text(text).to_lowercase();

    let spaced: String = lower
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                c
            } else {
                // dashes, unicode dashes and punctuation all separate words
                ' '
            }
        })
        .collect();

    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncates a description to `max_words` words, adding `...` when something was cut
pub fn teaser_truncate(description: &str, max_words: usize) -> String {
    let description = normalize_text(description);
    if description.is_empty() {
        return description;
    }

    let words: Vec<&str> = description.split(' ').collect();
    if words.len() <= max_words {
        return description;
    }

    format!("{}...", words[..max_words].join(" "))
}

/// Detects extracted values that are really leaked HTML markup
pub fn looks_like_html(text: &str) -> bool {
    if !text.contains('<') || !text.contains('>') {
        return false;
    }

    let lower = text.to_lowercase();
    ["<meta", "<html", "<head", "<title"]
        .iter()
        .any(|tag| lower.contains(tag))
}

/// Derives a readable title from the last path segment of a URL
///
/// Used only as a hint for human review when a page yields no title.
///
/// # Examples
///
/// ```
/// use news_catalog::text::title_from_url;
///
/// assert_eq!(
///     title_from_url("https://example.com/news/lego-lovers-check-out-train-displays/"),
///     "LEGO Lovers Check Out Train Displays"
/// );
/// ```
pub fn title_from_url(url: &str) -> String {
    let path = match ::url::Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.to_string(),
    };

    let Some(last) = path.split('/').filter(|p| !p.is_empty()).last() else {
        return String::new();
    };

    let decoded = urlencoding::decode(last)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| last.to_string());
    let mut slug = decoded.as_str();
    let lower = slug.to_lowercase();
    if lower.ends_with(".html") || lower.ends_with(".htm") {
        if let Some((stem, _)) = slug.rsplit_once('.') {
            slug = stem;
        }
    }

    if slug.is_empty() || slug.chars().all(|c| c.is_ascii_digit()) {
        return String::new();
    }

    let slug = slug.replace('_', "-");
    let mut words = Vec::new();
    for (i, raw) in slug.split('-').filter(|w| !w.is_empty()).enumerate() {
        let clean: String = raw.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
        if clean.is_empty() {
            continue;
        }

        let lower = clean.to_lowercase();
        if lower == "lego" || lower == "niltc" {
            words.push(lower.to_uppercase());
        } else if clean.len() <= 5 && clean.chars().all(|c| !c.is_ascii_lowercase()) {
            words.push(clean);
        } else if i != 0 && SMALL_WORDS.contains(&lower.as_str()) {
            words.push(lower);
        } else {
            let mut chars = lower.chars();
            let capitalized = match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            };
            words.push(capitalized);
        }
    }

    normalize_text(&words.join(" "))
}
