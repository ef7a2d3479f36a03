//! Run and catalog statistics
//!
//! This module provides the counters reported at the end of an enrichment run and a
//! summary of a catalog's contents for the `check` command.

use crate::catalog::Catalog;
use std::collections::BTreeMap;

/// Counters for one enrichment run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Input URLs processed
    pub processed: usize,

    /// Stories in the catalog after the run
    pub stories: usize,

    /// Stories created by this run
    pub stories_created: usize,

    /// Existing stories that received a new observation
    pub stories_updated: usize,

    /// Pending entries after the run
    pub pending: usize,

    /// Fetches recognized as bot-block pages
    pub blocked: usize,

    /// Head documents read back from the cache
    pub cache_hits: usize,

    /// Head cache files created or changed
    pub cache_writes: usize,

    pub needs_snapshot: usize,
    pub needs_review: usize,

    pub wrote_catalog: bool,
    pub wrote_review: bool,
    pub wrote_snapshot: bool,
}

/// Prints a run summary to stdout
pub fn print_run_summary(summary: &RunSummary) {
    println!("=== Enrichment Summary ===\n");

    println!("Processed: {}", summary.processed);
    println!(
        "Stories: {} ({} new, {} updated)",
        summary.stories, summary.stories_created, summary.stories_updated
    );
    println!("Pending: {}", summary.pending);
    println!("Blocked: {}", summary.blocked);
    println!(
        "Head cache: {} read, {} written",
        summary.cache_hits, summary.cache_writes
    );
    println!("Needs snapshot: {}", summary.needs_snapshot);
    println!("Needs review: {}", summary.needs_review);
    println!();

    println!("Wrote catalog: {}", summary.wrote_catalog);
    println!("Wrote needs_snapshot CSV: {}", summary.wrote_snapshot);
    println!("Wrote needs_review CSV: {}", summary.wrote_review);
}

/// What a catalog holds
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogStatistics {
    pub schema: u32,
    pub stories: usize,
    pub urls: usize,
    pub pending: usize,

    /// Story count per source
    pub stories_by_source: BTreeMap<String, usize>,

    /// Pending count per reason
    pub pending_by_reason: BTreeMap<String, usize>,

    /// Stories a renderer would skip (no published date or title)
    pub incomplete_stories: usize,

    /// Stories without an id
    pub unassigned_ids: usize,

    /// Earliest and latest published date
    pub date_range: Option<(String, String)>,
}

impl CatalogStatistics {
    pub fn from_catalog(catalog: &Catalog) -> Self {
        let mut stats = CatalogStatistics {
            schema: catalog.schema,
            stories: catalog.stories.len(),
            pending: catalog.pending.len(),
            ..Default::default()
        };

        for story in &catalog.stories {
            stats.urls += story.urls.len();
            *stats
                .stories_by_source
                .entry(story.source.clone())
                .or_insert(0) += 1;

            if story.published_date.trim().is_empty() || story.title.trim().is_empty() {
                stats.incomplete_stories += 1;
            }
            if story.id.trim().is_empty() {
                stats.unassigned_ids += 1;
            }
        }

        for pending in &catalog.pending {
            // `blocked:captcha;...` counts under `blocked`
            let reason = pending.reason.split(':').next().unwrap_or("").to_string();
            *stats.pending_by_reason.entry(reason).or_insert(0) += 1;
        }

        let mut dates = catalog
            .stories
            .iter()
            .map(|s| s.published_date.trim())
            .filter(|d| !d.is_empty());
        if let Some(first) = dates.next() {
            let (min, max) = dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
            stats.date_range = Some((min.to_string(), max.to_string()));
        }

        stats
    }
}

/// Prints catalog statistics to stdout
pub fn print_catalog_statistics(stats: &CatalogStatistics) {
    println!("=== Catalog Statistics ===\n");

    println!("Overview:");
    println!("  Schema: {}", stats.schema);
    println!("  Stories: {}", stats.stories);
    println!("  URLs: {}", stats.urls);
    println!("  Pending: {}", stats.pending);
    if let Some((first, last)) = &stats.date_range {
        println!("  Published: {} .. {}", first, last);
    }
    println!();

    if !stats.stories_by_source.is_empty() {
        println!("Stories by Source:");
        let mut by_count: Vec<_> = stats.stories_by_source.iter().collect();
        by_count.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        for (source, count) in by_count {
            let source = if source.is_empty() { "(none)" } else { source };
            println!("  {}: {}", source, count);
        }
        println!();
    }

    if !stats.pending_by_reason.is_empty() {
        println!("Pending by Reason:");
        for (reason, count) in &stats.pending_by_reason {
            println!("  {}: {}", reason, count);
        }
        println!();
    }

    if stats.incomplete_stories > 0 {
        println!(
            "Warning: {} stories lack a title or published date",
            stats.incomplete_stories
        );
    }
    if stats.unassigned_ids > 0 {
        println!("Warning: {} stories have no id", stats.unassigned_ids);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Pending, Story};

    #[test]
    fn test_catalog_statistics() {
        let story = |id: &str, date: &str, source: &str, urls: usize| Story {
            id: id.to_string(),
            source: source.to_string(),
            published_date: date.to_string(),
            title: "T".to_string(),
            urls: (0..urls).map(|i| format!("https://a.test/{}", i)).collect(),
            ..Story::default()
        };
        let pending = |url: &str, reason: &str| Pending {
            url: url.to_string(),
            reason: reason.to_string(),
            ..Pending::default()
        };

        let catalog = Catalog {
            stories: vec![
                story("20251213a", "2025-12-13", "Daily Herald", 2),
                story("20240301a", "2024-03-01", "KETV", 1),
                story("", "", "KETV", 1),
            ],
            pending: vec![
                pending("https://b.test/1", "blocked:captcha"),
                pending("https://b.test/2", "blocked"),
                pending("https://b.test/3", "404"),
            ],
            ..Catalog::default()
        };

        let stats = CatalogStatistics::from_catalog(&catalog);
        assert_eq!(stats.stories, 3);
        assert_eq!(stats.urls, 4);
        assert_eq!(stats.stories_by_source.get("KETV"), Some(&2));
        assert_eq!(stats.pending_by_reason.get("blocked"), Some(&2));
        assert_eq!(stats.pending_by_reason.get("404"), Some(&1));
        assert_eq!(stats.incomplete_stories, 1);
        assert_eq!(stats.unassigned_ids, 1);
        assert_eq!(
            stats.date_range,
            Some(("2024-03-01".to_string(), "2025-12-13".to_string()))
        );
    }
}
