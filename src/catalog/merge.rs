//! Story merge engine
//!
//! The system of record for stories during a run:
//! - indexes loaded stories by fingerprint, folding duplicates together
//! - merges each new observation into its story or creates a new one
//! - allocates ids for new stories in a reproducible order

use crate::catalog::{
    allocate_story_id, date_key, fingerprint_fields, primary_candidate, rescore_primary,
    story_fingerprint, Story, UrlContext,
};
use crate::text::normalize_fingerprint_text;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

/// Article fields extracted from one page, plus the URLs it was reached through
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Observation {
    pub input_url: String,
    pub final_url: String,
    /// URL the page's head claims for itself
    pub head_url: Option<String>,
    pub source: String,
    pub published_date: String,
    pub title: String,
    pub author: Option<String>,
    pub teaser: Option<String>,
}

impl Observation {
    pub fn fingerprint(&self) -> String {
        story_fingerprint(&self.published_date, &self.source, &self.title)
    }

    pub fn url_context(&self) -> UrlContext<'_> {
        UrlContext {
            head_url: self.head_url.as_deref(),
            final_url: &self.final_url,
            input_url: &self.input_url,
        }
    }
}

/// What [`StoryIndex::observe`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeResult {
    /// Position of the story in the index
    pub index: usize,
    pub created: bool,
    pub primary_changed: bool,
}

/// Stories keyed by fingerprint
#[derive(Debug, Clone, Default)]
pub struct StoryIndex {
    stories: Vec<Story>,
    by_fingerprint: HashMap<String, usize>,
    used_ids: HashSet<String>,
}

impl StoryIndex {
    /// Indexes loaded stories
    ///
    /// Fingerprints are recomputed whenever date, source and title are all present, so
    /// records written by older fingerprint rules are re-keyed. Records whose
    /// fingerprints collide are merged: URLs are unioned, empty fields filled from the
    /// later record, and the earlier record's id kept. Every id ever seen stays
    /// reserved. Records that cannot be fingerprinted are kept as they are.
    pub fn from_stories(stories: Vec<Story>) -> Self {
        let mut index = StoryIndex::default();

        for mut story in stories {
            let id = story.id.trim();
            if !id.is_empty() {
                index.used_ids.insert(id.to_string());
            }

            if let Some(fp) =
                fingerprint_fields(&story.published_date, &story.source, &story.title)
            {
                story.fingerprint = fp;
            }

            story.dedup_urls();
            if story.primary_url.as_deref().map(str::trim).unwrap_or("").is_empty() {
                story.primary_url = story.urls.first().cloned();
            }

            let fingerprint = story.fingerprint.trim().to_string();
            if fingerprint.is_empty() {
                index.stories.push(story);
                continue;
            }

            match index.by_fingerprint.get(&fingerprint) {
                Some(&existing) => {
                    debug!("Merging duplicate story {} into {}", story.id, index.stories[existing].id);
                    index.stories[existing].absorb(&story);
                }
                None => {
                    index.by_fingerprint.insert(fingerprint, index.stories.len());
                    index.stories.push(story);
                }
            }
        }

        index
    }

    pub fn len(&self) -> usize {
        self.stories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stories.is_empty()
    }

    pub fn stories(&self) -> &[Story] {
        &self.stories
    }

    pub fn get(&self, index: usize) -> Option<&Story> {
        self.stories.get(index)
    }

    /// Finds a story by fingerprint
    pub fn get_by_fingerprint(&self, fingerprint: &str) -> Option<&Story> {
        self.by_fingerprint
            .get(fingerprint)
            .and_then(|&i| self.stories.get(i))
    }

    /// Finds the story that lists `url`
    pub fn story_with_url(&self, url: &str) -> Option<&Story> {
        self.stories.iter().find(|s| s.has_url(url))
    }

    /// Returns true if any story lists `url`
    pub fn contains_url(&self, url: &str) -> bool {
        self.story_with_url(url).is_some()
    }

    /// Merges an observation into its story, creating the story if needed
    ///
    /// For an existing story only empty fields are filled, the primary URL is replaced
    /// only by a strictly better-scoring candidate, and the observation's URLs are
    /// appended. A new story starts with the observation's primary candidate.
    pub fn observe(&mut self, obs: &Observation) -> MergeResult {
        let fingerprint = obs.fingerprint();
        let ctx = obs.url_context();
        let candidate = primary_candidate(&ctx);

        let incoming = Story {
            id: String::new(),
            fingerprint: fingerprint.clone(),
            source: obs.source.clone(),
            published_date: obs.published_date.clone(),
            title: obs.title.clone(),
            author: obs.author.clone(),
            teaser: obs.teaser.clone(),
            primary_url: None,
            urls: Vec::new(),
        };

        let (index, created, primary_changed) = match self.by_fingerprint.get(&fingerprint) {
            Some(&index) => {
                let story = &mut self.stories[index];
                story.absorb(&incoming);
                let changed = rescore_primary(&mut story.primary_url, candidate.as_deref(), &ctx);
                (index, false, changed)
            }
            None => {
                let index = self.stories.len();
                self.stories.push(Story {
                    primary_url: candidate.clone(),
                    ..incoming
                });
                self.by_fingerprint.insert(fingerprint, index);
                (index, true, candidate.is_some())
            }
        };

        let story = &mut self.stories[index];
        let primary = story.primary_url.clone();
        for url in [
            Some(obs.input_url.as_str()),
            Some(obs.final_url.as_str()),
            obs.head_url.as_deref(),
            primary.as_deref(),
        ]
        .into_iter()
        .flatten()
        {
            story.add_url(url);
        }

        MergeResult {
            index,
            created,
            primary_changed,
        }
    }

    /// Allocates ids for every story without one
    ///
    /// Dates are processed in order; within a date, stories are ordered by normalized
    /// title, then normalized source, then fingerprint, so the same set of new stories
    /// always receives the same ids. Returns the allocated ids.
    pub fn assign_ids(&mut self) -> Vec<String> {
        let mut by_date: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (i, story) in self.stories.iter().enumerate() {
            if story.id.trim().is_empty() {
                by_date
                    .entry(date_key(&story.published_date))
                    .or_default()
                    .push(i);
            }
        }

        let mut assigned = Vec::new();
        for (_, mut indices) in by_date {
            indices.sort_by_cached_key(|&i| {
                let s = &self.stories[i];
                (
                    normalize_fingerprint_text(&s.title),
                    normalize_fingerprint_text(&s.source),
                    s.fingerprint.clone(),
                )
            });

            for i in indices {
                let id = allocate_story_id(&self.stories[i].published_date, &mut self.used_ids);
                debug!("Allocated id {} for {}", id, self.stories[i].fingerprint);
                self.stories[i].id = id.clone();
                assigned.push(id);
            }
        }

        assigned
    }

    pub fn into_stories(self) -> Vec<Story> {
        self.stories
    }
}
