use crate::config::PublisherEntry;
use crate::url::{extract_host, host_matches};

/// Built-in host patterns and the source names they stand for
///
/// Used when the configuration lists no publishers of its own.
pub const BUILTIN_PUBLISHERS: &[(&str, &str)] = &[
    ("*.dailyherald.com", "Daily Herald"),
    ("*.chicagotribune.com", "Chicago Tribune"),
    ("*.omaha.com", "Omaha World-Herald"),
    ("*.ketv.com", "KETV"),
    ("*.nonpareilonline.com", "Daily Nonpareil"),
    ("*.kcchronicle.com", "Kane County Chronicle"),
];

/// One row of the publisher table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublisherRule {
    /// Host pattern, e.g. `*.dailyherald.com`
    pub pattern: String,

    /// Source name reported for matching hosts
    pub source: String,
}

/// Ordered host-pattern to source-name table
///
/// Rules are evaluated in order and the first match wins, so more specific patterns
/// belong earlier in the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublisherTable {
    rules: Vec<PublisherRule>,
}

impl PublisherTable {
    /// Builds a table from configured entries, falling back to the built-in list
    pub fn from_entries(entries: &[PublisherEntry]) -> Self {
        if entries.is_empty() {
            return Self::builtin();
        }

        let rules = entries
            .iter()
            .map(|entry| PublisherRule {
                pattern: entry.domain.to_lowercase(),
                source: entry.source.clone(),
            })
            .collect();

        Self { rules }
    }

    /// The built-in table
    pub fn builtin() -> Self {
        let rules = BUILTIN_PUBLISHERS
            .iter()
            .map(|(pattern, source)| PublisherRule {
                pattern: pattern.to_string(),
                source: source.to_string(),
            })
            .collect();

        Self { rules }
    }

    /// Number of rules in the table
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if the table has no rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Looks up the source name for a host
    pub fn source_for_host(&self, host: &str) -> Option<&str> {
        let host = host.to_lowercase();
        self.rules
            .iter()
            .find(|rule| host_matches(&rule.pattern, &host))
            .map(|rule| rule.source.as_str())
    }

    /// Best guess at a URL's source: the table entry for its host, else the host itself
    ///
    /// Returns an empty string for URLs without a host.
    pub fn source_guess(&self, url: &str) -> String {
        let Some(host) = extract_host(url) else {
            return String::new();
        };

        match self.source_for_host(&host) {
            Some(source) => source.to_string(),
            None => host,
        }
    }
}

impl Default for PublisherTable {
    fn default() -> Self {
        Self::builtin()
    }
}
