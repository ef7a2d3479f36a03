//! In-memory state of one enrichment run
//!
//! The catalog is mutated here across the whole run and flushed once at the end.

use crate::catalog::{Catalog, Pending, StoryIndex};
use crate::output::{ReviewRow, RunSummary, SnapshotQueueRow};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Stories, the pending queue and side-output rows accumulated during a run
#[derive(Debug, Default)]
pub(crate) struct RunState {
    pub index: StoryIndex,
    schema: u32,
    pending: BTreeMap<String, Pending>,
    previous_pending: HashMap<String, Pending>,
    /// Review rows, with the index of the story whose id they should carry
    review: Vec<(ReviewRow, Option<usize>)>,
    pub snapshots: Vec<SnapshotQueueRow>,
    created: HashSet<usize>,
    updated: HashSet<usize>,
    pub summary: RunSummary,
}

impl RunState {
    pub fn from_catalog(catalog: Catalog) -> Self {
        let pending: BTreeMap<String, Pending> = catalog
            .pending
            .into_iter()
            .filter(|p| !p.url.trim().is_empty())
            .map(|p| (p.url.clone(), p))
            .collect();
        let previous_pending = pending
            .iter()
            .map(|(url, p)| (url.clone(), p.clone()))
            .collect();

        Self {
            index: StoryIndex::from_stories(catalog.stories),
            schema: catalog.schema,
            pending,
            previous_pending,
            ..Default::default()
        }
    }

    /// Queues a URL as pending
    ///
    /// An entry re-queued with the same source, cache path and reason keeps its
    /// previous `last_checked`.
    pub fn queue_pending(
        &mut self,
        url: &str,
        source: &str,
        cache_path: &str,
        reason: &str,
        now: &str,
    ) {
        let last_checked = match self.previous_pending.get(url) {
            Some(p)
                if p.source == source
                    && p.cache_path == cache_path
                    && p.reason == reason
                    && !p.last_checked.is_empty() =>
            {
                p.last_checked.clone()
            }
            _ => now.to_string(),
        };

        self.pending.insert(
            url.to_string(),
            Pending {
                url: url.to_string(),
                source: source.to_string(),
                cache_path: cache_path.to_string(),
                last_checked,
                reason: reason.to_string(),
            },
        );
    }

    pub fn clear_pending(&mut self, url: &str) {
        self.pending.remove(url);
    }

    pub fn add_review(&mut self, row: ReviewRow, story: Option<usize>) {
        self.review.push((row, story));
    }

    pub fn mark_story(&mut self, index: usize, created: bool) {
        if created {
            self.created.insert(index);
        } else if !self.created.contains(&index) {
            self.updated.insert(index);
        }
    }

    /// Allocates ids and assembles the catalog and review rows
    ///
    /// Pending entries whose URL now belongs to a story are dropped, so no URL is both
    /// pending and attached.
    pub fn finish(mut self) -> (Catalog, Vec<ReviewRow>, Vec<SnapshotQueueRow>, RunSummary) {
        let assigned = self.index.assign_ids();
        tracing::debug!("Allocated {} new story ids", assigned.len());

        let review = self
            .review
            .into_iter()
            .map(|(mut row, story)| {
                if let Some(story) = story.and_then(|i| self.index.get(i)) {
                    row.id = story.id.clone();
                }
                row
            })
            .collect::<Vec<_>>();

        let index = &self.index;
        self.pending.retain(|url, _| !index.contains_url(url));

        let mut summary = self.summary;
        summary.stories_created = self.created.len();
        summary.stories_updated = self.updated.len();
        summary.stories = self.index.len();
        summary.pending = self.pending.len();
        summary.needs_review = review.len();
        summary.needs_snapshot = self.snapshots.len();

        let mut catalog = Catalog {
            schema: self.schema,
            stories: self.index.into_stories(),
            pending: self.pending.into_values().collect(),
        };
        catalog.canonicalize();

        (catalog, review, self.snapshots, summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Story;

    fn catalog_with_pending(last_checked: &str) -> Catalog {
        Catalog {
            pending: vec![Pending {
                url: "https://a.test/x".to_string(),
                source: "a.test".to_string(),
                cache_path: "cache/k.head.html".to_string(),
                last_checked: last_checked.to_string(),
                reason: "timeout".to_string(),
            }],
            ..Catalog::default()
        }
    }

    #[test]
    fn test_unchanged_pending_keeps_timestamp() {
        let mut state = RunState::from_catalog(catalog_with_pending("2025-12-01T00:00:00Z"));
        state.queue_pending(
            "https://a.test/x",
            "a.test",
            "cache/k.head.html",
            "timeout",
            "2025-12-14T00:00:00Z",
        );
        assert_eq!(
            state.pending.get("https://a.test/x").unwrap().last_checked,
            "2025-12-01T00:00:00Z"
        );

        state.queue_pending(
            "https://a.test/x",
            "a.test",
            "cache/k.head.html",
            "404",
            "2025-12-14T00:00:00Z",
        );
        assert_eq!(
            state.pending.get("https://a.test/x").unwrap().last_checked,
            "2025-12-14T00:00:00Z"
        );
    }

    #[test]
    fn test_finish_drops_pending_urls_attached_to_stories() {
        let mut catalog = catalog_with_pending("2025-12-01T00:00:00Z");
        catalog.stories.push(Story {
            id: "20251213a".to_string(),
            published_date: "2025-12-13".to_string(),
            title: "T".to_string(),
            source: "A".to_string(),
            urls: vec!["https://a.test/x".to_string()],
            ..Story::default()
        });

        let (catalog, _, _, summary) = RunState::from_catalog(catalog).finish();
        assert!(catalog.pending.is_empty());
        assert_eq!(summary.stories, 1);
        assert_eq!(summary.pending, 0);
    }
}
