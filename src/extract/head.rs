//! Head parsing
//!
//! Pulls the pieces of an HTML head the rest of the crate cares about:
//! - `<title>` text
//! - `<meta name=...>` and `<meta property=...>` content
//! - `<link rel="canonical">`
//! - parsed JSON-LD blocks

use crate::text::normalize_text;
use crate::url::resolve_link;
use scraper::{Html, Selector};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Head metadata of one HTML document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeadData {
    /// Normalized `<title>` text, empty if absent
    pub title: String,

    /// Meta content keyed by lowercased `name` (later tags win)
    pub meta_name: HashMap<String, String>,

    /// Meta content keyed by lowercased `property` (later tags win)
    pub meta_property: HashMap<String, String>,

    /// `href` of `<link rel="canonical">`, empty if absent
    pub canonical_url: String,

    /// Every JSON-LD script that parsed as JSON, in document order
    pub json_ld: Vec<Value>,
}

impl HeadData {
    /// Parses an HTML document (full page or cached head)
    pub fn parse(html: &str) -> Self {
        let document = Html::parse_document(html);
        let mut head = HeadData {
            title: extract_title(&document).unwrap_or_default(),
            json_ld: extract_json_ld(&document),
            ..HeadData::default()
        };

        if let Ok(selector) = Selector::parse("meta") {
            for element in document.select(&selector) {
                let attrs = element.value();
                let content = normalize_text(attrs.attr("content").unwrap_or(""));
                if content.is_empty() {
                    continue;
                }

                let name = normalize_text(attrs.attr("name").unwrap_or("")).to_lowercase();
                let property =
                    normalize_text(attrs.attr("property").unwrap_or("")).to_lowercase();

                if !name.is_empty() {
                    head.meta_name.insert(name, content.clone());
                }
                if !property.is_empty() {
                    head.meta_property.insert(property, content);
                }
            }
        }

        if let Ok(selector) = Selector::parse("link") {
            for element in document.select(&selector) {
                let attrs = element.value();
                let rel = normalize_text(attrs.attr("rel").unwrap_or("")).to_lowercase();
                let href = normalize_text(attrs.attr("href").unwrap_or(""));
                if rel == "canonical" && !href.is_empty() {
                    head.canonical_url = href;
                }
            }
        }

        head
    }

    /// Meta content by `name`
    pub fn name(&self, key: &str) -> Option<&str> {
        self.meta_name.get(key).map(String::as_str)
    }

    /// Meta content by `property`
    pub fn property(&self, key: &str) -> Option<&str> {
        self.meta_property.get(key).map(String::as_str)
    }

    /// The first JSON-LD object typed `Article` or `NewsArticle`
    pub fn article(&self) -> Option<&Map<String, Value>> {
        self.json_ld.iter().find_map(find_article)
    }

    /// The page's own idea of its URL
    ///
    /// # Priority
    ///
    /// 1. `<link rel="canonical">`
    /// 2. `meta property="og:url"`
    /// 3. `meta name="twitter:url"`
    /// 4. JSON-LD `mainEntityOfPage.@id` or `url`
    ///
    /// Relative values are resolved against `base_url`; protocol-relative values become
    /// `https:`. Returns `None` if no candidate yields an HTTP(S) URL.
    pub fn best_url(&self, base_url: &str) -> Option<String> {
        let candidates = [
            Some(self.canonical_url.as_str()),
            self.property("og:url"),
            self.name("twitter:url"),
            self.json_ld.iter().find_map(json_ld_url),
        ];

        candidates
            .into_iter()
            .flatten()
            .filter(|c| !c.is_empty())
            .find_map(|c| resolve_link(c, base_url))
    }
}

/// Parses `html` and returns its best URL, see [`HeadData::best_url`]
pub fn best_url(html: &str, base_url: &str) -> Option<String> {
    HeadData::parse(html).best_url(base_url)
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| normalize_text(&element.text().collect::<String>()))
        .filter(|s| !s.is_empty())
}

/// Raw text of every `application/ld+json` script, trimmed, non-empty
pub(crate) fn json_ld_scripts(document: &Html) -> Vec<String> {
    let Ok(selector) = Selector::parse("script") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter(|script| {
            script
                .value()
                .attr("type")
                .map(|t| t.trim().eq_ignore_ascii_case("application/ld+json"))
                .unwrap_or(false)
        })
        .map(|script| script.text().collect::<String>().trim().to_string())
        .filter(|raw| !raw.is_empty())
        .collect()
}

/// Every JSON-LD script that parses as JSON
fn extract_json_ld(document: &Html) -> Vec<Value> {
    json_ld_scripts(document)
        .iter()
        .filter_map(|raw| serde_json::from_str::<Value>(raw).ok())
        .collect()
}

/// Candidate objects of a JSON-LD value: itself, list members, and `@graph` members
fn json_ld_objects(value: &Value) -> Vec<&Map<String, Value>> {
    let mut out = Vec::new();
    match value {
        Value::Object(map) => {
            out.push(map);
            if let Some(graph) = map.get("@graph") {
                out.extend(json_ld_objects(graph));
            }
        }
        Value::Array(items) => {
            for item in items {
                out.extend(json_ld_objects(item));
            }
        }
        _ => {}
    }
    out
}

fn is_article(object: &Map<String, Value>) -> bool {
    let types: Vec<&str> = match object.get("@type") {
        Some(Value::String(t)) => vec![t.as_str()],
        Some(Value::Array(ts)) => ts.iter().filter_map(Value::as_str).collect(),
        _ => return false,
    };

    types.iter().any(|t| {
        let t = t.to_lowercase();
        t == "article" || t == "newsarticle"
    })
}

/// Finds the first `Article`/`NewsArticle` object inside a JSON-LD value
pub fn find_article(value: &Value) -> Option<&Map<String, Value>> {
    json_ld_objects(value).into_iter().find(|o| is_article(o))
}

/// `mainEntityOfPage.@id`, else `url`, of the first object carrying either
fn json_ld_url(value: &Value) -> Option<&str> {
    json_ld_objects(value).into_iter().find_map(|object| {
        let main_entity = object
            .get("mainEntityOfPage")
            .and_then(|m| m.get("@id"))
            .and_then(Value::as_str);

        main_entity
            .or_else(|| object.get("url").and_then(Value::as_str))
            .filter(|u| !u.trim().is_empty())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!doctype html>
<html><head>
<title>  LEGO Show &amp; Trains | Daily Herald </title>
<meta name="author" content="Jane Doe">
<meta property="og:title" content="LEGO Show Draws Crowds">
<meta property="og:url" content="https://www.dailyherald.com/og">
<meta name="twitter:url" content="https://www.dailyherald.com/tw">
<meta name="empty" content="">
<link rel="canonical" href="/20251213/news/lego-show/">
<script type="application/ld+json">
{"@context":"https://schema.org","@graph":[
  {"@type":"WebSite","name":"Daily Herald"},
  {"@type":["NewsArticle"],"headline":"LEGO Show Draws Crowds",
   "mainEntityOfPage":{"@id":"https://www.dailyherald.com/jsonld"}}
]}
</script>
<script type="application/ld+json">not json</script>
</head><body></body></html>"#;

    #[test]
    fn test_parse_head() {
        let head = HeadData::parse(PAGE);
        assert_eq!(head.title, "LEGO Show & Trains | Daily Herald");
        assert_eq!(head.name("author"), Some("Jane Doe"));
        assert_eq!(head.property("og:title"), Some("LEGO Show Draws Crowds"));
        assert_eq!(head.name("empty"), None);
        assert_eq!(head.canonical_url, "/20251213/news/lego-show/");
        assert_eq!(head.json_ld.len(), 1);
    }

    #[test]
    fn test_article_found_inside_graph() {
        let head = HeadData::parse(PAGE);
        let article = head.article().unwrap();
        assert_eq!(
            article.get("headline").and_then(Value::as_str),
            Some("LEGO Show Draws Crowds")
        );
    }

    #[test]
    fn test_best_url_prefers_canonical() {
        let url = best_url(PAGE, "http://dailyherald.com/x").unwrap();
        assert_eq!(url, "http://dailyherald.com/20251213/news/lego-show/");
    }

    #[test]
    fn test_best_url_fallback_order() {
        let html = r#"<head><meta name="twitter:url" content="//example.com/tw"></head>"#;
        assert_eq!(
            best_url(html, "https://example.com/"),
            Some("https://example.com/tw".to_string())
        );

        let html = r#"<head><script type="application/ld+json">
            {"@type":"NewsArticle","url":"https://example.com/ld"}</script></head>"#;
        assert_eq!(
            best_url(html, "https://example.com/"),
            Some("https://example.com/ld".to_string())
        );

        assert_eq!(best_url("<head></head>", "https://example.com/"), None);
    }

    #[test]
    fn test_later_meta_wins() {
        let html = r#"<head><meta name="author" content="A"><meta name="author" content="B"></head>"#;
        assert_eq!(HeadData::parse(html).name("author"), Some("B"));
    }
}
