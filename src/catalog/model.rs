use serde::{Deserialize, Serialize};

/// Current catalog schema version
pub const SCHEMA_VERSION: u32 = 1;

/// One real-world article, possibly reachable through several URLs
///
/// Fields are declared in the order they are written to the catalog file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Story {
    /// `YYYYMMDD` plus a letter suffix, assigned once
    #[serde(default)]
    pub id: String,

    /// `date|source key|normalized title`
    #[serde(default)]
    pub fingerprint: String,

    #[serde(default)]
    pub source: String,

    /// `YYYY-MM-DD`
    #[serde(default)]
    pub published_date: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub author: Option<String>,

    #[serde(default)]
    pub teaser: Option<String>,

    #[serde(default)]
    pub primary_url: Option<String>,

    /// Every URL known to reach this story, first-seen order, no duplicates
    #[serde(default)]
    pub urls: Vec<String>,
}

impl Story {
    /// Appends a URL unless it is empty or already listed (exact match)
    pub fn add_url(&mut self, url: &str) -> bool {
        let url = url.trim();
        if url.is_empty() || self.urls.iter().any(|u| u == url) {
            return false;
        }
        self.urls.push(url.to_string());
        true
    }

    /// Returns true if `url` is one of this story's URLs
    pub fn has_url(&self, url: &str) -> bool {
        self.urls.iter().any(|u| u == url)
    }

    /// Folds another record for the same article into this one
    ///
    /// URLs are unioned in first-seen order; scalar fields are only filled when empty,
    /// so a populated value is never overwritten. An existing `id` always wins.
    pub fn absorb(&mut self, other: &Story) {
        for url in &other.urls {
            self.add_url(url);
        }

        fill(&mut self.id, &other.id);
        fill(&mut self.fingerprint, &other.fingerprint);
        fill(&mut self.source, &other.source);
        fill(&mut self.published_date, &other.published_date);
        fill(&mut self.title, &other.title);
        fill_opt(&mut self.author, &other.author);
        fill_opt(&mut self.teaser, &other.teaser);
        fill_opt(&mut self.primary_url, &other.primary_url);
    }

    /// Drops blank and repeated URLs, keeping first-seen order
    pub fn dedup_urls(&mut self) {
        let urls = std::mem::take(&mut self.urls);
        for url in urls {
            self.add_url(&url);
        }
    }
}

fn fill(target: &mut String, value: &str) {
    if target.trim().is_empty() && !value.trim().is_empty() {
        *target = value.to_string();
    }
}

fn fill_opt(target: &mut Option<String>, value: &Option<String>) {
    let empty = target.as_deref().map(|t| t.trim().is_empty()).unwrap_or(true);
    if empty {
        if let Some(value) = value.as_deref().filter(|v| !v.trim().is_empty()) {
            *target = Some(value.to_string());
        }
    }
}

/// A URL that could not (yet) be attached to a story
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Pending {
    pub url: String,

    /// Best guess at the publisher
    #[serde(default)]
    pub source: String,

    /// Head-cache file the URL would be (or is) cached under
    #[serde(default)]
    pub cache_path: String,

    /// UTC timestamp of the last attempt
    #[serde(default)]
    pub last_checked: String,

    /// Machine token, e.g. `blocked:captcha`, `missing_title`, `timeout`
    #[serde(default)]
    pub reason: String,
}

/// The catalog file: stories plus the pending queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Catalog {
    #[serde(default = "default_schema")]
    pub schema: u32,

    #[serde(default)]
    pub stories: Vec<Story>,

    #[serde(default)]
    pub pending: Vec<Pending>,
}

fn default_schema() -> u32 {
    SCHEMA_VERSION
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            schema: SCHEMA_VERSION,
            stories: Vec::new(),
            pending: Vec::new(),
        }
    }
}

impl Catalog {
    /// Puts stories and pending entries in their canonical file order
    ///
    /// Stories sort by `(published_date, title)`, pending entries by `url`. Both sorts
    /// are stable, so equal keys keep their relative order.
    pub fn canonicalize(&mut self) {
        self.schema = SCHEMA_VERSION;
        for story in &mut self.stories {
            story.dedup_urls();
        }
        self.stories.sort_by(|a, b| {
            (a.published_date.as_str(), a.title.as_str())
                .cmp(&(b.published_date.as_str(), b.title.as_str()))
        });
        self.pending.sort_by(|a, b| a.url.cmp(&b.url));
    }
}
