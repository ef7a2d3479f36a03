//! Migration of the older `{schema: 1, items: [...]}` catalog shape

use crate::catalog::{allocate_story_id, fingerprint_fields, Story};
use crate::text::{date_from_time_text, date_from_url, normalize_text};
use crate::url::{normalize_url, PublisherTable};
use serde::Deserialize;
use std::collections::HashSet;
use tracing::debug;

/// One record of the legacy catalog. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LegacyItem {
    pub url: Option<String>,
    pub final_url: Option<String>,
    pub canonical_url: Option<String>,
    pub source: Option<String>,
    pub title: Option<String>,
    pub published_time: Option<String>,
    pub author: Option<String>,
    pub teaser: Option<String>,
}

fn field(value: &Option<String>) -> String {
    value.as_deref().map(normalize_text).unwrap_or_default()
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

impl LegacyItem {
    /// Converts the item into a story without an id
    ///
    /// Returns `None` when no title or published date can be recovered.
    fn into_story(self, publishers: &PublisherTable) -> Option<Story> {
        let mut urls: Vec<String> = Vec::new();
        for url in [&self.url, &self.final_url, &self.canonical_url] {
            let url = url.as_deref().map(normalize_url).unwrap_or_default();
            if !url.is_empty() && !urls.contains(&url) {
                urls.push(url);
            }
        }
        let first_url = urls.first().map(String::as_str).unwrap_or("");

        let title = field(&self.title);
        let published_date = date_from_time_text(&field(&self.published_time))
            .or_else(|| date_from_url(first_url))?;
        if title.is_empty() {
            return None;
        }

        let source = match field(&self.source) {
            s if s.is_empty() => publishers.source_guess(first_url),
            s => s,
        };

        Some(Story {
            id: String::new(),
            fingerprint: fingerprint_fields(&published_date, &source, &title).unwrap_or_default(),
            primary_url: urls.first().cloned(),
            source,
            published_date,
            title,
            author: non_empty(field(&self.author)),
            teaser: non_empty(field(&self.teaser)),
            urls,
        })
    }
}

/// Converts legacy items into stories with freshly allocated ids
///
/// Items without a title or date are dropped. Ids are allocated per date in
/// `(published_date, title, source)` order.
pub fn migrate_legacy_items(items: Vec<LegacyItem>, publishers: &PublisherTable) -> Vec<Story> {
    let total = items.len();
    let mut stories: Vec<Story> = items
        .into_iter()
        .filter_map(|item| item.into_story(publishers))
        .collect();

    stories.sort_by(|a, b| {
        (&a.published_date, &a.title, &a.source).cmp(&(&b.published_date, &b.title, &b.source))
    });

    let mut used_ids = HashSet::new();
    for story in &mut stories {
        story.id = allocate_story_id(&story.published_date, &mut used_ids);
    }

    debug!("Migrated {} of {} legacy items", stories.len(), total);
    stories
}
