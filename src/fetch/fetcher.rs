//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the enrichment run, including:
//! - Building an HTTP client with browser-like headers
//! - The jittered politeness sleep before each request
//! - Manual redirect handling, so the redirect chain can be reported
//! - Outcome classification (status notes and transport failures)

use crate::config::FetchConfig;
use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, LOCATION, REFERER};
use reqwest::{redirect::Policy, Client, StatusCode};
use std::collections::HashSet;
use std::fmt;
use std::time::Duration;
use tracing::debug;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Machine token describing why a fetch did not produce a clean page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchNote {
    /// The request (or reading its body) timed out
    Timeout,
    /// Connection, TLS, DNS or malformed-URL failure
    RequestError,
    /// A redirect revisited a URL or the hop limit was exceeded
    RedirectLoop,
    /// HTTP 404
    NotFound,
    /// HTTP 410
    Gone,
    /// HTTP 403
    Blocked,
    /// HTTP 429
    RateLimited,
    /// HTTP 5xx
    ServerError,
}

impl FetchNote {
    /// The token written into pending reasons and review notes
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchNote::Timeout => "timeout",
            FetchNote::RequestError => "request_error",
            FetchNote::RedirectLoop => "redirect_loop",
            FetchNote::NotFound => "404",
            FetchNote::Gone => "410",
            FetchNote::Blocked => "blocked",
            FetchNote::RateLimited => "rate_limited",
            FetchNote::ServerError => "server_error",
        }
    }

    /// Classifies an HTTP status code, `None` for statuses without a note
    pub fn from_status(status: u16) -> Option<Self> {
        match status {
            404 => Some(FetchNote::NotFound),
            410 => Some(FetchNote::Gone),
            403 => Some(FetchNote::Blocked),
            429 => Some(FetchNote::RateLimited),
            s if s >= 500 => Some(FetchNote::ServerError),
            _ => None,
        }
    }

    /// Returns true for failures below the HTTP layer
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            FetchNote::Timeout | FetchNote::RequestError | FetchNote::RedirectLoop
        )
    }

    /// Returns true for failures that will not go away by retrying (404/410)
    pub fn is_terminal(&self) -> bool {
        matches!(self, FetchNote::NotFound | FetchNote::Gone)
    }
}

impl fmt::Display for FetchNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a single fetch, successful or not
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    /// HTTP status of the final response, 0 on transport failure
    pub status_code: u16,

    /// URL of the final response
    ///
    /// On transport failure this is the last URL requested, so a failure after a
    /// redirect reports the redirect target rather than the input URL.
    pub final_url: String,

    /// Lowercased media type without parameters, empty if absent
    pub content_type: String,

    /// Size of the response body in bytes
    pub byte_count: usize,

    /// URLs that answered with a redirect, in the order they were visited
    pub redirect_chain: Vec<String>,

    /// Full body text, only kept for status 200
    pub body: Option<String>,

    /// Bounded prefix of the body, kept for every status
    pub snippet: String,

    /// Failure classification, `None` for an unremarkable response
    pub note: Option<FetchNote>,
}

impl FetchOutcome {
    fn transport_failure(url: &str, note: FetchNote, redirect_chain: Vec<String>) -> Self {
        Self {
            status_code: 0,
            final_url: url.to_string(),
            content_type: String::new(),
            byte_count: 0,
            redirect_chain,
            body: None,
            snippet: String::new(),
            note: Some(note),
        }
    }

    /// Returns true for a 200 response
    pub fn is_ok(&self) -> bool {
        self.status_code == 200
    }

    /// The note token, or the numeric status when there is no note
    pub fn note_or_status(&self) -> String {
        match self.note {
            Some(note) => note.as_str().to_string(),
            None => self.status_code.to_string(),
        }
    }
}

/// Builds an HTTP client with browser-like default headers
///
/// Redirects are disabled on the client and followed by [`Fetcher`] itself.
///
/// # Arguments
///
/// * `config` - The fetch configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &FetchConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
    if let Ok(value) = HeaderValue::from_str(&config.accept_language) {
        headers.insert(ACCEPT_LANGUAGE, value);
    }

    Client::builder()
        .user_agent(config.user_agent.clone())
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.timeout_secs.min(10)))
        .redirect(Policy::none()) // Handle redirects manually
        .gzip(true)
        .brotli(true)
        .build()
}

/// Sequential, polite HTTP fetcher
///
/// Owns its client, so every header and limit is explicit at construction time.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    timeout: Duration,
    sleep_max: Duration,
    max_redirects: usize,
    snippet_bytes: usize,
}

impl Fetcher {
    /// Creates a fetcher from configuration
    ///
    /// `snippet_bytes` is how much of every body is kept for block detection.
    pub fn new(config: &FetchConfig, snippet_bytes: usize) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
            timeout: Duration::from_secs(config.timeout_secs),
            sleep_max: Duration::from_millis(config.sleep_max_ms),
            max_redirects: config.max_redirects,
            snippet_bytes,
        })
    }

    /// Fetches a URL with the configured timeout and jitter
    pub async fn fetch(&self, url: &str, referer: Option<&str>) -> FetchOutcome {
        self.fetch_with_limits(url, self.timeout, self.sleep_max, referer)
            .await
    }

    /// Fetches a URL, never failing: every problem is folded into the outcome
    ///
    /// # Request Flow
    ///
    /// 1. Sleep a random duration in `[0, sleep_max]`
    /// 2. Send GET (with `Referer` if given)
    /// 3. Follow redirects manually (max `max_redirects` hops)
    ///    - Track visited URLs to detect loops
    /// 4. Read the body, keep a snippet, keep the full text only for 200
    ///
    /// | Condition | Note |
    /// |-----------|------|
    /// | Timeout | `timeout` |
    /// | Connection/TLS/URL error | `request_error` |
    /// | Redirect loop or too many hops | `redirect_loop` |
    /// | HTTP 404 / 410 | `404` / `410` |
    /// | HTTP 403 | `blocked` |
    /// | HTTP 429 | `rate_limited` |
    /// | HTTP 5xx | `server_error` |
    pub async fn fetch_with_limits(
        &self,
        url: &str,
        timeout: Duration,
        sleep_max: Duration,
        referer: Option<&str>,
    ) -> FetchOutcome {
        jitter_sleep(sleep_max).await;

        let mut current = url.to_string();
        let mut visited: HashSet<String> = HashSet::new();
        let mut redirect_chain = Vec::new();

        loop {
            visited.insert(current.clone());

            let mut request = self.client.get(&current).timeout(timeout);
            if let Some(referer) = referer.filter(|r| !r.is_empty()) {
                request = request.header(REFERER, referer);
            }

            let response = match request.send().await {
                Ok(response) => response,
                Err(e) => {
                    let note = classify_error(&e);
                    debug!("Fetch of {} failed: {} ({})", current, note, e);
                    return FetchOutcome::transport_failure(&current, note, redirect_chain);
                }
            };

            let status = response.status();
            if status.is_redirection() {
                let location = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|loc| response.url().join(loc).ok());

                if let Some(next) = location {
                    redirect_chain.push(current.clone());
                    let next = next.to_string();

                    if visited.contains(&next) || redirect_chain.len() > self.max_redirects {
                        debug!("Redirect loop while fetching {}", url);
                        return FetchOutcome::transport_failure(
                            &current,
                            FetchNote::RedirectLoop,
                            redirect_chain,
                        );
                    }

                    debug!("Redirect {} -> {}", current, next);
                    current = next;
                    continue;
                }
            }

            return self.read_response(response, current, redirect_chain).await;
        }
    }

    async fn read_response(
        &self,
        response: reqwest::Response,
        final_url: String,
        redirect_chain: Vec<String>,
    ) -> FetchOutcome {
        let status = response.status();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(media_type)
            .unwrap_or_default();

        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                let note = classify_error(&e);
                debug!("Reading body of {} failed: {}", final_url, e);
                return FetchOutcome::transport_failure(&final_url, note, redirect_chain);
            }
        };

        let prefix = &bytes[..bytes.len().min(self.snippet_bytes)];
        let snippet = String::from_utf8_lossy(prefix).into_owned();
        let body = (status == StatusCode::OK).then(|| String::from_utf8_lossy(&bytes).into_owned());

        FetchOutcome {
            status_code: status.as_u16(),
            final_url,
            content_type,
            byte_count: bytes.len(),
            redirect_chain,
            body,
            snippet,
            note: FetchNote::from_status(status.as_u16()),
        }
    }
}

/// Sleeps a uniformly random duration in `[0, max]`
async fn jitter_sleep(max: Duration) {
    let max_ms = max.as_millis() as u64;
    if max_ms == 0 {
        return;
    }

    let ms = rand::rng().random_range(0..=max_ms);
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

/// Maps a reqwest error to a transport note
fn classify_error(error: &reqwest::Error) -> FetchNote {
    if error.is_timeout() {
        FetchNote::Timeout
    } else if error.is_redirect() {
        FetchNote::RedirectLoop
    } else {
        FetchNote::RequestError
    }
}

/// Lowercased media type of a Content-Type header, without parameters
pub fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase()
}
