//! Integration tests for the enrichment pipeline
//!
//! These tests use wiremock to serve article pages and bot-block pages and run the
//! full fetch, cache, extract and merge cycle against temporary files.

use chrono::{DateTime, TimeZone, Utc};
use news_catalog::config::Config;
use news_catalog::storage::{CatalogStore, YamlCatalogStore};
use news_catalog::url::PublisherTable;
use news_catalog::{EnrichOutcome, Enricher};
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CANONICAL: &str = "https://www.dailyherald.com/20251213/news/lego-show/";

fn first_run_clock() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 12, 14, 15, 59, 55).unwrap()
}

fn second_run_clock() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 12, 21, 8, 0, 0).unwrap()
}

/// Creates a test configuration with every path inside `dir` and no request jitter
fn create_test_config(dir: &Path) -> Config {
    let mut config = Config::default();
    let file = |name: &str| dir.join(name).display().to_string();

    config.paths.input_csv = file("in_the_news.csv");
    config.paths.catalog = file("in_the_news.yml");
    config.paths.review_csv = file("needs_review.csv");
    config.paths.snapshot_csv = file("needs_snapshot.csv");
    config.paths.head_cache_dir = file("news_head");
    config.fetch.sleep_max_ms = 0;
    config.fetch.timeout_secs = 5;
    config
}

fn write_input(config: &Config, urls: &[String]) {
    let mut text = String::from("url\n");
    for url in urls {
        text.push_str(url);
        text.push('\n');
    }
    fs::write(&config.paths.input_csv, text).unwrap();
}

/// A full-size article page with JSON-LD and an https canonical link
fn lego_page() -> String {
    let filler = "the show filled the hall with trains and towers built from bricks. ".repeat(100);
    format!(
        r#"<html><head>
<title>LEGO Show Draws Crowds | Daily Herald</title>
<link rel="canonical" href="{}">
<meta property="og:image" content="https://img.test/lego.jpg">
<script type="application/ld+json">
{{"@context": "https://schema.org", "@type": "NewsArticle",
  "headline": "LEGO Show Draws Crowds",
  "datePublished": "2025-12-13T09:00:00Z",
  "description": "Thousands of visitors came to see the layouts at the annual club show in the fairgrounds hall.",
  "publisher": {{"@type": "Organization", "name": "Daily Herald"}}}}
</script>
</head><body><p>{}</p></body></html>"#,
        CANONICAL, filler
    )
}

fn captcha_page() -> String {
    "<html><head><title>Attention Required</title></head>\
     <body>Please complete the CAPTCHA to continue.</body></html>"
        .to_string()
}

/// An HTML response; `set_body_string` would force `text/plain`
fn html_response(status: u16, body: String) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_raw(body, "text/html; charset=utf-8")
}

/// A full-size page whose only metadata is a `<title>`
fn undated_page(title: &str) -> String {
    let filler = "club members brought layouts and answered questions all afternoon. ".repeat(100);
    format!(
        "<html><head><title>{}</title></head><body><p>{}</p></body></html>",
        title, filler
    )
}

async fn mount_lego(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/20251213/news/lego-show/"))
        .respond_with(html_response(200, lego_page()))
        .mount(server)
        .await;
}

async fn run(config: &Config, clock: fn() -> DateTime<Utc>) -> EnrichOutcome {
    Enricher::new(config)
        .expect("Failed to build enricher")
        .with_clock(clock)
        .run(None)
        .await
        .expect("Enrichment failed")
}

#[tokio::test]
async fn test_new_story_from_live_page() {
    let server = MockServer::start().await;
    mount_lego(&server).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path());
    let input = format!("{}/20251213/news/lego-show/", server.uri());
    write_input(&config, &[input.clone()]);

    let outcome = run(&config, first_run_clock).await;

    assert_eq!(outcome.catalog.stories.len(), 1);
    let story = &outcome.catalog.stories[0];
    assert_eq!(story.id, "20251213a");
    assert_eq!(story.fingerprint, "2025-12-13|dailyherald|lego show draws crowds");
    assert_eq!(story.source, "Daily Herald");
    assert_eq!(story.published_date, "2025-12-13");
    assert_eq!(story.primary_url.as_deref(), Some(CANONICAL));
    assert_eq!(story.urls, vec![input.clone(), CANONICAL.to_string()]);
    assert!(story.teaser.as_deref().unwrap_or("").ends_with("..."));
    assert!(outcome.catalog.pending.is_empty());
    assert!(outcome.review_rows.is_empty());
    assert!(outcome.summary.wrote_catalog);
    assert_eq!(outcome.summary.cache_writes, 1);

    // The catalog on disk matches what the run reported
    let store = YamlCatalogStore::new(&config.paths.catalog, PublisherTable::builtin());
    assert_eq!(store.load().unwrap(), outcome.catalog);

    // The cached head keeps metadata but drops image tags and body text
    let cache_files: Vec<_> = fs::read_dir(&config.paths.head_cache_dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(cache_files.len(), 1);
    let head = fs::read_to_string(&cache_files[0]).unwrap();
    assert!(head.contains("LEGO Show Draws Crowds"));
    assert!(!head.contains("og:image"));
    assert!(!head.contains("trains and towers built"));
}

#[tokio::test]
async fn test_url_variant_merges_into_one_story() {
    let server = MockServer::start().await;
    mount_lego(&server).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path());
    let plain = format!("{}/20251213/news/lego-show/", server.uri());
    let tracked = format!("{}?utm_source=fb", plain);
    write_input(&config, &[plain.clone(), tracked.clone()]);

    let outcome = run(&config, first_run_clock).await;

    assert_eq!(outcome.catalog.stories.len(), 1);
    let story = &outcome.catalog.stories[0];
    assert_eq!(story.id, "20251213a");
    assert_eq!(story.urls, vec![plain, CANONICAL.to_string(), tracked]);
    assert_eq!(outcome.summary.stories_created, 1);
}

#[tokio::test]
async fn test_blocked_page_without_cache_is_queued_for_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/news/blocked-story/"))
        .respond_with(html_response(403, captcha_page()))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path());
    let url = format!("{}/news/blocked-story/", server.uri());
    write_input(&config, &[url.clone()]);

    let outcome = run(&config, first_run_clock).await;

    assert!(outcome.catalog.stories.is_empty());
    assert_eq!(outcome.catalog.pending.len(), 1);
    let pending = &outcome.catalog.pending[0];
    assert_eq!(pending.url, url);
    assert_eq!(pending.reason, "blocked:captcha;body_too_small");
    assert_eq!(pending.last_checked, "2025-12-14T15:59:55Z");
    let host = url::Url::parse(&server.uri()).unwrap();
    assert_eq!(
        pending.source,
        format!("127.0.0.1:{}", host.port().unwrap())
    );
    assert!(pending.cache_path.ends_with(".head.html"));

    assert_eq!(outcome.snapshot_rows.len(), 1);
    assert!(outcome.snapshot_rows[0].reason.starts_with("captcha"));
    assert!(outcome.review_rows.is_empty());

    let snapshot_csv = fs::read_to_string(&config.paths.snapshot_csv).unwrap();
    assert_eq!(snapshot_csv.lines().count(), 2);
    assert!(snapshot_csv.starts_with("url,cache_path,source,reason\n"));
}

#[tokio::test]
async fn test_terminal_failure_goes_to_review() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/news/lego-lovers-check-out-trains/"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not here"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path());
    let url = format!("{}/news/lego-lovers-check-out-trains/", server.uri());
    write_input(&config, &[url.clone()]);

    let outcome = run(&config, first_run_clock).await;

    assert_eq!(outcome.catalog.pending.len(), 1);
    assert_eq!(outcome.catalog.pending[0].reason, "404");
    assert!(outcome.snapshot_rows.is_empty());

    assert_eq!(outcome.review_rows.len(), 1);
    let row = &outcome.review_rows[0];
    assert_eq!(row.url, url);
    assert_eq!(row.status_code, "404");
    assert_eq!(row.notes, "404");
    assert_eq!(row.title_guess, "LEGO Lovers Check Out Trains");
    assert_eq!(row.checked_at, "2025-12-14T15:59:55Z");
}

#[tokio::test]
async fn test_rerun_is_idempotent() {
    let server = MockServer::start().await;
    mount_lego(&server).await;
    Mock::given(method("GET"))
        .and(path("/news/blocked-story/"))
        .respond_with(html_response(403, captcha_page()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/news/gone-story/"))
        .respond_with(ResponseTemplate::new(410))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path());
    write_input(
        &config,
        &[
            format!("{}/20251213/news/lego-show/", server.uri()),
            format!("{}/news/blocked-story/", server.uri()),
            format!("{}/news/gone-story/", server.uri()),
        ],
    );

    let first = run(&config, first_run_clock).await;
    assert_eq!(first.catalog.stories.len(), 1);
    assert_eq!(first.snapshot_rows.len(), 1);
    assert!(first.summary.wrote_catalog);
    assert!(first.summary.wrote_review);
    assert!(first.summary.wrote_snapshot);

    let catalog_before = fs::read(&config.paths.catalog).unwrap();
    let review_before = fs::read(&config.paths.review_csv).unwrap();

    // A week later, nothing about the pages has changed
    let second = run(&config, second_run_clock).await;
    assert!(!second.summary.wrote_catalog);
    assert!(!second.summary.wrote_review);
    assert!(!second.summary.wrote_snapshot);
    assert_eq!(second.summary.cache_writes, 0);

    assert_eq!(fs::read(&config.paths.catalog).unwrap(), catalog_before);
    assert_eq!(fs::read(&config.paths.review_csv).unwrap(), review_before);
    assert_eq!(second.catalog, first.catalog);
}

#[tokio::test]
async fn test_blocked_refetch_falls_back_to_cache() {
    let server = MockServer::start().await;

    // First request gets the article, every later one a block page.
    // Mocks are matched in mount order, and an exhausted mock is skipped.
    Mock::given(method("GET"))
        .and(path("/20251213/news/lego-show/"))
        .respond_with(html_response(200, lego_page()))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/20251213/news/lego-show/"))
        .respond_with(html_response(403, captcha_page()))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path());
    let url = format!("{}/20251213/news/lego-show/", server.uri());
    write_input(&config, &[url.clone()]);

    let first = run(&config, first_run_clock).await;
    assert_eq!(first.catalog.stories.len(), 1);

    let second = run(&config, second_run_clock).await;
    assert_eq!(second.summary.blocked, 1);
    assert_eq!(second.summary.cache_hits, 1);
    assert!(second.catalog.pending.is_empty());
    assert!(second.snapshot_rows.is_empty());
    assert_eq!(second.catalog.stories, first.catalog.stories);

    // Recovered non-200 fetches are reported with the story id
    assert_eq!(second.review_rows.len(), 1);
    let row = &second.review_rows[0];
    assert_eq!(row.id, "20251213a");
    assert_eq!(row.status_code, "403");
    assert_eq!(row.notes, "blocked");
    assert_eq!(row.title_guess, "LEGO Show Draws Crowds");
}

#[tokio::test]
async fn test_missing_input_column_is_fatal() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path());
    fs::write(&config.paths.input_csv, "link\nhttps://a.test/\n").unwrap();

    let result = Enricher::new(&config).unwrap().run(None).await;
    assert!(result.is_err());
    assert!(!Path::new(&config.paths.catalog).exists());
}

#[tokio::test]
async fn test_empty_page_does_not_replace_cached_head() {
    let server = MockServer::start().await;
    let lego_path = "/20251213/news/lego-show/";

    // Article, then an empty 200, then a block page
    Mock::given(method("GET"))
        .and(path(lego_path))
        .respond_with(html_response(200, lego_page()))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(lego_path))
        .respond_with(html_response(200, String::new()))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(lego_path))
        .respond_with(html_response(403, captcha_page()))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path());
    write_input(&config, &[format!("{}{}", server.uri(), lego_path)]);

    let first = run(&config, first_run_clock).await;
    assert_eq!(first.catalog.stories.len(), 1);
    let cache_dir = Path::new(&config.paths.head_cache_dir);
    assert_eq!(fs::read_dir(cache_dir).unwrap().count(), 1);

    let second = run(&config, second_run_clock).await;
    assert_eq!(second.summary.cache_writes, 0);
    assert_eq!(second.summary.cache_hits, 1);
    assert_eq!(fs::read_dir(cache_dir).unwrap().count(), 1);
    assert_eq!(second.catalog.stories, first.catalog.stories);
    assert!(second.catalog.pending.is_empty());

    // The block page still recovers the article from the cached head
    let third = run(&config, second_run_clock).await;
    assert_eq!(third.summary.cache_hits, 1);
    assert_eq!(third.catalog.stories, first.catalog.stories);
    assert_eq!(third.review_rows.len(), 1);
    assert_eq!(third.review_rows[0].notes, "blocked");
    assert_eq!(third.review_rows[0].title_guess, "LEGO Show Draws Crowds");
}

#[tokio::test]
async fn test_page_without_date_goes_to_review() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/news/club-open-house/"))
        .respond_with(html_response(200, undated_page("Train Club Opens Doors")))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path());
    let url = format!("{}/news/club-open-house/", server.uri());
    write_input(&config, &[url.clone()]);

    let outcome = run(&config, first_run_clock).await;

    assert!(outcome.catalog.stories.is_empty());
    assert_eq!(outcome.catalog.pending.len(), 1);
    assert_eq!(outcome.catalog.pending[0].reason, "missing_published_date");
    assert!(outcome.snapshot_rows.is_empty());

    assert_eq!(outcome.review_rows.len(), 1);
    let row = &outcome.review_rows[0];
    assert_eq!(row.url, url);
    assert_eq!(row.status_code, "200");
    assert_eq!(row.notes, "missing_published_date");
    assert_eq!(row.title_guess, "Train Club Opens Doors");
}

#[tokio::test]
async fn test_date_taken_from_url_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/20251201/news/club-open-house/"))
        .respond_with(html_response(200, undated_page("Train Club Opens Doors")))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path());
    write_input(
        &config,
        &[format!("{}/20251201/news/club-open-house/", server.uri())],
    );

    let outcome = run(&config, first_run_clock).await;

    assert_eq!(outcome.catalog.stories.len(), 1);
    let story = &outcome.catalog.stories[0];
    assert_eq!(story.id, "20251201a");
    assert_eq!(story.published_date, "2025-12-01");
    assert_eq!(story.title, "Train Club Opens Doors");
    assert!(outcome.catalog.pending.is_empty());
    assert!(outcome.review_rows.is_empty());
}

#[tokio::test]
async fn test_non_html_page_is_missing_title() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/news/brick-fair-schedule/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"{"title": "Brick Fair Schedule"}"#, "application/json"),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path());
    let url = format!("{}/news/brick-fair-schedule/", server.uri());
    write_input(&config, &[url.clone()]);

    let outcome = run(&config, first_run_clock).await;

    assert!(outcome.catalog.stories.is_empty());
    assert_eq!(outcome.summary.blocked, 0);
    assert_eq!(outcome.summary.cache_writes, 0);
    assert_eq!(outcome.catalog.pending.len(), 1);
    assert_eq!(outcome.catalog.pending[0].reason, "missing_title");

    assert_eq!(outcome.review_rows.len(), 1);
    assert_eq!(outcome.review_rows[0].notes, "missing_title");
    assert_eq!(outcome.review_rows[0].title_guess, "Brick Fair Schedule");
}

#[tokio::test]
async fn test_failure_on_known_story_url_is_review_only() {
    let server = MockServer::start().await;
    let lego_path = "/20251213/news/lego-show/";
    Mock::given(method("GET"))
        .and(path(lego_path))
        .respond_with(html_response(200, lego_page()))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(lego_path))
        .respond_with(html_response(404, "<html>not found</html>".to_string()))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path());
    let url = format!("{}{}", server.uri(), lego_path);
    write_input(&config, &[url.clone()]);

    let first = run(&config, first_run_clock).await;
    assert_eq!(first.catalog.stories.len(), 1);

    // Without a cached head there is nothing to recover from
    fs::remove_dir_all(&config.paths.head_cache_dir).unwrap();

    let second = run(&config, second_run_clock).await;
    assert_eq!(second.summary.cache_hits, 0);
    assert_eq!(second.catalog.stories, first.catalog.stories);
    assert!(second.catalog.pending.is_empty());
    assert!(second.snapshot_rows.is_empty());

    assert_eq!(second.review_rows.len(), 1);
    let row = &second.review_rows[0];
    assert_eq!(row.id, "20251213a");
    assert_eq!(row.url, url);
    assert_eq!(row.status_code, "404");
    assert_eq!(row.notes, "404");
}
