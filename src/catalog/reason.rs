use crate::fetch::{BlockVerdict, FetchNote, FetchOutcome};
use std::fmt;

/// Why a URL ended up in the pending queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingReason {
    /// Bot-block page or undersized body, with its marker tokens
    Blocked(Vec<String>),
    /// Transport failure or a status with a note
    Fetch(FetchNote),
    /// Any other non-200 status
    Status(u16),
    MissingTitle,
    MissingPublishedDate,
}

impl PendingReason {
    /// Classifies a failed fetch
    ///
    /// A block verdict takes precedence, except for terminal and transport failures
    /// whose own note is more useful.
    pub fn from_fetch(outcome: &FetchOutcome, verdict: &BlockVerdict) -> Self {
        match outcome.note {
            Some(note) if note.is_transport() || note.is_terminal() => PendingReason::Fetch(note),
            _ if verdict.blocked => PendingReason::Blocked(verdict.reasons.clone()),
            Some(note) => PendingReason::Fetch(note),
            None => PendingReason::Status(outcome.status_code),
        }
    }

    /// Soft failures may clear up later and are queued for a manual snapshot
    pub fn is_soft(&self) -> bool {
        match self {
            PendingReason::Blocked(_) => true,
            PendingReason::Fetch(note) => matches!(
                note,
                FetchNote::Blocked | FetchNote::RateLimited | FetchNote::ServerError
            ),
            _ => false,
        }
    }

    /// Reason written to the snapshot queue: marker tokens without the `blocked:` prefix
    pub fn snapshot_reason(&self) -> String {
        match self {
            PendingReason::Blocked(reasons) if !reasons.is_empty() => reasons.join(";"),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for PendingReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PendingReason::Blocked(reasons) if reasons.is_empty() => f.write_str("blocked"),
            PendingReason::Blocked(reasons) => write!(f, "blocked:{}", reasons.join(";")),
            PendingReason::Fetch(note) => f.write_str(note.as_str()),
            PendingReason::Status(code) => write!(f, "{}", code),
            PendingReason::MissingTitle => f.write_str("missing_title"),
            PendingReason::MissingPublishedDate => f.write_str("missing_published_date"),
        }
    }
}
