use crate::text::{is_iso_date, keyify_source, normalize_fingerprint_text, normalize_text};

/// Deterministic dedup key of a story
///
/// `published_date|source key|normalized title`. The source key keeps only lowercase
/// alphanumerics, the title is lowercased with punctuation and dashes folded to single
/// spaces, so case, spacing and punctuation changes on a page do not split a story.
///
/// # Examples
///
/// ```
/// use news_catalog::catalog::story_fingerprint;
///
/// assert_eq!(
///     story_fingerprint("2025-12-13", "Daily Herald", "LEGO Show Draws Crowds"),
///     "2025-12-13|dailyherald|lego show draws crowds"
/// );
/// ```
pub fn story_fingerprint(published_date: &str, source: &str, title: &str) -> String {
    format!(
        "{}|{}|{}",
        normalize_text(published_date),
        keyify_source(source),
        normalize_fingerprint_text(title)
    )
}

/// Fingerprint of a story record, `None` unless date, source and title are all usable
pub fn fingerprint_fields(published_date: &str, source: &str, title: &str) -> Option<String> {
    let usable = is_iso_date(published_date.trim())
        && !keyify_source(source).is_empty()
        && !normalize_fingerprint_text(title).is_empty();

    usable.then(|| story_fingerprint(published_date, source, title))
}
