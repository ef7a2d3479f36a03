use crate::text::is_iso_date;
use std::collections::HashSet;

/// Date part used for stories without a valid published date
pub const UNKNOWN_DATE_KEY: &str = "00000000";

/// The `n`th id suffix (0-based): `a`..`z`, `aa`..`az`, `ba`.., `zz`, `aaa`..
///
/// # Examples
///
/// ```
/// use news_catalog::catalog::id_suffix;
///
/// assert_eq!(id_suffix(0), "a");
/// assert_eq!(id_suffix(25), "z");
/// assert_eq!(id_suffix(26), "aa");
/// assert_eq!(id_suffix(52), "ba");
/// ```
pub fn id_suffix(n: usize) -> String {
    let mut n = n + 1;
    let mut out = Vec::new();
    while n > 0 {
        n -= 1;
        out.push(b'a' + (n % 26) as u8);
        n /= 26;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// `YYYYMMDD` form of a published date
pub fn date_key(published_date: &str) -> String {
    let date = published_date.trim();
    if is_iso_date(date) {
        date.replace('-', "")
    } else {
        UNKNOWN_DATE_KEY.to_string()
    }
}

/// Allocates the first unused id for a date and records it as used
pub fn allocate_story_id(published_date: &str, used_ids: &mut HashSet<String>) -> String {
    let key = date_key(published_date);
    let mut n = 0;
    loop {
        let candidate = format!("{}{}", key, id_suffix(n));
        if used_ids.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}
