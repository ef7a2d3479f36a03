use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use std::sync::LazyLock;

static RE_COMPACT_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/(20\d{2})(\d{2})(\d{2})(?:/|$)").unwrap());
static RE_SLASHED_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/(20\d{2})/(\d{2})/(\d{2})(?:/|$)").unwrap());

/// Returns true for a real calendar date written as `YYYY-MM-DD`
pub fn is_iso_date(text: &str) -> bool {
    let bytes = text.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return false;
    }

    let digits_ok = bytes
        .iter()
        .enumerate()
        .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());

    digits_ok && NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok()
}

/// Extracts `YYYY-MM-DD` from the front of an ISO-ish datetime string
///
/// # Examples
///
/// ```
/// use news_catalog::text::date_from_time_text;
///
/// assert_eq!(date_from_time_text("2025-12-13T09:00:00Z"), Some("2025-12-13".to_string()));
/// assert_eq!(date_from_time_text("December 13, 2025"), None);
/// ```
pub fn date_from_time_text(time_text: &str) -> Option<String> {
    let date_part = time_text.trim().get(..10)?;
    is_iso_date(date_part).then(|| date_part.to_string())
}

/// Best-effort date extraction from a URL path
///
/// Supported patterns are `/YYYYMMDD/` and `/YYYY/MM/DD/`.
pub fn date_from_url(url: &str) -> Option<String> {
    let path = match ::url::Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.to_string(),
    };

    [&*RE_COMPACT_DATE, &*RE_SLASHED_DATE]
        .iter()
        .find_map(|re| {
            let caps = re.captures(&path)?;
            Some(format!("{}-{}-{}", &caps[1], &caps[2], &caps[3]))
        })
        .filter(|date| is_iso_date(date))
}

/// Formats a UTC instant the way catalog and CSV timestamps are written
///
/// The result looks like `2025-12-14T15:59:55Z`.
pub fn utc_timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_is_iso_date() {
        assert!(is_iso_date("2025-12-13"));
        assert!(!is_iso_date("2025-13-01"));
        assert!(!is_iso_date("2025-1-013"));
        assert!(!is_iso_date("20251213"));
    }

    #[test]
    fn test_date_from_time_text() {
        assert_eq!(
            date_from_time_text("2025-03-24T05:00:00-05:00"),
            Some("2025-03-24".to_string())
        );
        assert_eq!(date_from_time_text("2025-03"), None);
        assert_eq!(date_from_time_text(""), None);
    }

    #[test]
    fn test_date_from_compact_url() {
        assert_eq!(
            date_from_url("https://www.dailyherald.com/20251213/news/lego-lovers/"),
            Some("2025-12-13".to_string())
        );
    }

    #[test]
    fn test_date_from_slashed_url() {
        assert_eq!(
            date_from_url("https://www.chicagotribune.com/2025/03/24/for-lego-fans/"),
            Some("2025-03-24".to_string())
        );
    }

    #[test]
    fn test_date_from_url_without_date() {
        assert_eq!(date_from_url("https://example.com/news/lego/"), None);
    }

    #[test]
    fn test_utc_timestamp_format() {
        let when = Utc.with_ymd_and_hms(2025, 12, 14, 15, 59, 55).unwrap();
        assert_eq!(utc_timestamp(when), "2025-12-14T15:59:55Z");
    }
}
