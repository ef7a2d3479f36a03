//! Enrichment coordinator
//!
//! Processes the input URLs one at a time:
//! - fetches the page and checks it for bot-block markers
//! - writes the head cache from clean pages, or reads it back when the fetch failed
//! - extracts article metadata and merges it into the story catalog
//! - routes failures to the pending queue, the review CSV and the snapshot queue

use crate::cache::HeadCache;
use crate::catalog::{Observation, PendingReason};
use crate::config::{Config, PathsConfig};
use crate::extract::{best_url, extract_metadata};
use crate::fetch::{is_html_content_type, BlockDetector, FetchOutcome, Fetcher};
use crate::output::{
    read_review_csv, render_review_csv, render_snapshot_queue_csv, stabilize_checked_at,
    ReviewRow, SnapshotQueueRow,
};
use crate::pipeline::state::RunState;
use crate::pipeline::{Clock, EnrichOutcome};
use crate::storage::{read_input_urls, write_if_changed, CatalogStore, YamlCatalogStore};
use crate::text::{date_from_time_text, date_from_url, title_from_url, utc_timestamp};
use crate::url::PublisherTable;
use crate::Result;
use chrono::Utc;
use std::path::Path;

/// Where the head document used for extraction came from
enum HeadSource {
    Live(String),
    Cached(String),
}

impl HeadSource {
    fn html(&self) -> &str {
        match self {
            HeadSource::Live(html) | HeadSource::Cached(html) => html,
        }
    }
}

/// Sequential enrichment pipeline
///
/// Owns every collaborator a run needs, so tests can point it at a mock server and
/// temporary paths and give it a fixed clock.
pub struct Enricher {
    fetcher: Fetcher,
    detector: BlockDetector,
    cache: HeadCache,
    publishers: PublisherTable,
    store: YamlCatalogStore,
    paths: PathsConfig,
    clock: Clock,
}

impl Enricher {
    /// Creates an enricher from configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Enricher)` - Ready to run
    /// * `Err(NewsError)` - The HTTP client could not be built
    pub fn new(config: &Config) -> Result<Self> {
        let publishers = PublisherTable::from_entries(&config.publishers);

        Ok(Self {
            fetcher: Fetcher::new(&config.fetch, config.detect.scan_bytes)?,
            detector: BlockDetector::new(&config.detect),
            cache: HeadCache::new(&config.paths.head_cache_dir),
            store: YamlCatalogStore::new(&config.paths.catalog, publishers.clone()),
            publishers,
            paths: config.paths.clone(),
            clock: Utc::now,
        })
    }

    /// Replaces the clock used for `last_checked` and `checked_at` timestamps
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    fn now(&self) -> String {
        utc_timestamp((self.clock)())
    }

    /// Runs enrichment over the input CSV
    ///
    /// Loads the catalog, processes up to `max` input URLs, then writes the catalog and,
    /// when the input held at least one URL, both side-output CSVs. Every file is only
    /// written when its content changed.
    pub async fn run(&self, max: Option<usize>) -> Result<EnrichOutcome> {
        let catalog = self.store.load()?;
        let urls = read_input_urls(Path::new(&self.paths.input_csv), max)?;
        tracing::info!(
            "Enriching {} URLs against {} stories, {} pending",
            urls.len(),
            catalog.stories.len(),
            catalog.pending.len()
        );

        let mut state = RunState::from_catalog(catalog);
        let total = urls.len();
        for (i, url) in urls.iter().enumerate() {
            tracing::info!("[{}/{}] {}", i + 1, total, url);
            self.process_url(url, &mut state).await?;
        }
        state.summary.processed = total;

        let (catalog, mut review_rows, snapshot_rows, mut summary) = state.finish();

        summary.wrote_catalog = self.store.save(&catalog)?;

        if !urls.is_empty() {
            let review_path = Path::new(&self.paths.review_csv);
            stabilize_checked_at(&mut review_rows, &read_review_csv(review_path));
            summary.wrote_review = write_if_changed(review_path, &render_review_csv(&review_rows)?)?;
            summary.wrote_snapshot = write_if_changed(
                Path::new(&self.paths.snapshot_csv),
                &render_snapshot_queue_csv(&snapshot_rows)?,
            )?;
        }

        tracing::info!(
            "Stories: {} ({} new), pending: {}, review: {}, snapshot: {}",
            summary.stories,
            summary.stories_created,
            summary.pending,
            summary.needs_review,
            summary.needs_snapshot
        );

        Ok(EnrichOutcome {
            catalog,
            review_rows,
            snapshot_rows,
            summary,
        })
    }

    /// Fetches, classifies and merges one input URL
    ///
    /// # Routing
    ///
    /// | Situation | Result |
    /// |-----------|--------|
    /// | Clean HTML 200 at or above the size floor | head cached, story merged |
    /// | Failed or blocked, cache found | story merged from cache; non-200 also gets a review row |
    /// | Soft failure, no cache | pending + snapshot queue |
    /// | Other failure, no cache | pending + review row |
    /// | No title or date | pending + review row |
    ///
    /// A URL that already belongs to a story is never queued as pending; its failures
    /// only produce review rows carrying the story id.
    async fn process_url(&self, url: &str, state: &mut RunState) -> Result<()> {
        let attached = state
            .index
            .stories()
            .iter()
            .position(|s| s.has_url(url));
        let aliases: Vec<String> = attached
            .and_then(|i| state.index.get(i))
            .map(|s| s.urls.clone())
            .unwrap_or_default();

        let outcome = self.fetcher.fetch(url, None).await;
        tracing::debug!(
            "status={} final_url={} content_type={} bytes={} redirects={} note={:?}",
            outcome.status_code,
            outcome.final_url,
            outcome.content_type,
            outcome.byte_count,
            outcome.redirect_chain.len(),
            outcome.note
        );

        let verdict = self.detector.inspect(&outcome);
        if verdict.blocked {
            tracing::warn!("{} looks blocked ({})", url, verdict.reason());
            state.summary.blocked += 1;
        }

        let base_url = if outcome.final_url.is_empty() {
            url.to_string()
        } else {
            outcome.final_url.clone()
        };

        let live_html = outcome
            .body
            .as_deref()
            .filter(|_| outcome.is_ok() && is_html_content_type(&outcome.content_type));
        let clean_html = live_html.filter(|html| {
            !verdict.blocked
                && !html.trim().is_empty()
                && self.detector.meets_size_floor(outcome.byte_count)
        });

        let cache_key_url = live_html
            .and_then(|html| best_url(html, &base_url))
            .unwrap_or_else(|| url.to_string());
        let mut keys: Vec<&str> = vec![cache_key_url.as_str(), base_url.as_str(), url];
        keys.extend(aliases.iter().map(String::as_str));
        let cache_path = self
            .cache
            .candidates(&keys)
            .into_iter()
            .next()
            .unwrap_or_else(|| self.cache.path_for(url));
        let cache_path_text = cache_path.display().to_string();
        if cache_key_url != url {
            tracing::debug!("cache key url: {}", cache_key_url);
        }

        let head = match clean_html {
            Some(html) => {
                if self.cache.write(&cache_path, html)? {
                    state.summary.cache_writes += 1;
                }
                Some(HeadSource::Live(html.to_string()))
            }
            None => self
                .cache
                .find_existing(&keys)
                .and_then(|path| {
                    tracing::debug!("using cached head {}", path.display());
                    self.cache.read(&path)
                })
                .map(HeadSource::Cached),
        };
        if matches!(head, Some(HeadSource::Cached(_))) {
            state.summary.cache_hits += 1;
        }

        let now = self.now();

        // A 200 that is not a block page but carries no HTML goes on to extraction
        // and ends up as missing_title
        let head = match head {
            Some(head) => head,
            None if outcome.is_ok() && !verdict.blocked => HeadSource::Live(String::new()),
            None => {
                let reason = PendingReason::from_fetch(&outcome, &verdict);
                self.route_failure(url, &outcome, &reason, &cache_path_text, attached, &now, state);
                return Ok(());
            }
        };

        let metadata = extract_metadata(head.html());
        let source = metadata
            .source
            .clone()
            .unwrap_or_else(|| self.publishers.source_guess(&base_url));
        let published_date = metadata
            .published_time
            .as_deref()
            .and_then(date_from_time_text)
            .or_else(|| date_from_url(&base_url));

        let (title, published_date) = match (metadata.title.clone(), published_date) {
            (Some(title), Some(date)) => (title, date),
            (title, _) => {
                let reason = if title.is_none() {
                    PendingReason::MissingTitle
                } else {
                    PendingReason::MissingPublishedDate
                };
                tracing::info!("  {} ({})", reason, url);

                let review = ReviewRow {
                    id: String::new(),
                    url: url.to_string(),
                    final_url: outcome.final_url.clone(),
                    status_code: ReviewRow::status_text(outcome.status_code),
                    checked_at: now.clone(),
                    title_guess: title.unwrap_or_else(|| title_from_url(url)),
                    notes: reason.to_string(),
                };
                if attached.is_none() {
                    state.queue_pending(url, &source, &cache_path_text, &reason.to_string(), &now);
                }
                state.add_review(review, attached);
                return Ok(());
            }
        };

        let observation = Observation {
            input_url: url.to_string(),
            final_url: outcome.final_url.clone(),
            head_url: best_url(head.html(), &base_url),
            source,
            published_date,
            title: title.clone(),
            author: metadata.author,
            teaser: metadata.teaser,
        };
        let merged = state.index.observe(&observation);
        state.mark_story(merged.index, merged.created);
        state.clear_pending(url);
        tracing::info!(
            "  {} story: {} | {}",
            if merged.created { "new" } else { "merged" },
            observation.published_date,
            observation.title
        );

        if !outcome.is_ok() {
            state.add_review(
                ReviewRow {
                    id: String::new(),
                    url: url.to_string(),
                    final_url: outcome.final_url.clone(),
                    status_code: ReviewRow::status_text(outcome.status_code),
                    checked_at: now,
                    title_guess: title,
                    notes: outcome.note_or_status(),
                },
                Some(merged.index),
            );
        }

        Ok(())
    }

    /// Records a fetch that produced no usable head
    #[allow(clippy::too_many_arguments)]
    fn route_failure(
        &self,
        url: &str,
        outcome: &FetchOutcome,
        reason: &PendingReason,
        cache_path: &str,
        attached: Option<usize>,
        now: &str,
        state: &mut RunState,
    ) {
        let source = self.publishers.source_guess(if outcome.final_url.is_empty() {
            url
        } else {
            outcome.final_url.as_str()
        });
        let reason_text = reason.to_string();
        tracing::info!("  no head available: {}", reason_text);

        let review = ReviewRow {
            id: String::new(),
            url: url.to_string(),
            final_url: outcome.final_url.clone(),
            status_code: ReviewRow::status_text(outcome.status_code),
            checked_at: now.to_string(),
            title_guess: title_from_url(url),
            notes: reason_text.clone(),
        };

        if attached.is_some() {
            state.add_review(review, attached);
            return;
        }

        state.queue_pending(url, &source, cache_path, &reason_text, now);
        if reason.is_soft() {
            state.snapshots.push(SnapshotQueueRow {
                url: url.to_string(),
                cache_path: cache_path.to_string(),
                source,
                reason: reason.snapshot_reason(),
            });
        } else {
            state.add_review(review, None);
        }
    }
}
