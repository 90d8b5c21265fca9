//! Types for the game search system.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::GameRecord;
use crate::external_catalog::RelayAttempt;

/// Settings for a [`super::SearchAggregator`].
#[derive(Debug, Clone)]
pub struct SearchSettings {
    /// Maximum local cache results per search.
    pub local_limit: u32,
    /// Skip the external catalog when the local cache returned anything.
    pub short_circuit_on_local_hit: bool,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            local_limit: 50,
            short_circuit_on_local_hit: false,
        }
    }
}

/// A non-fatal problem encountered while producing a result set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SearchWarning {
    /// Every relay failed; only local results are shown.
    ExternalUnavailable { detail: String },
    /// The local cache could not be searched; only external results are shown.
    LocalStoreUnavailable { detail: String },
}

/// Merged search results with metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchOutcome {
    /// The trimmed query that was executed.
    pub query: String,
    /// Local results first, then newly discovered external ones. Unique by guid.
    pub games: Vec<GameRecord>,
    /// Records that came from the local cache.
    pub local_count: usize,
    /// External records appended after de-duplication.
    pub external_count: usize,
    /// Records the cache reported as stored, when a write-back succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<SearchWarning>,
    /// Relay attempts made, in chain order.
    #[serde(default)]
    pub relay_attempts: Vec<RelayAttempt>,
    /// How long the search took in milliseconds.
    pub duration_ms: u64,
}

impl SearchOutcome {
    /// Outcome with no results and no activity.
    pub fn empty(query: &str) -> Self {
        Self {
            query: query.to_string(),
            games: Vec::new(),
            local_count: 0,
            external_count: 0,
            cached_count: None,
            warnings: Vec::new(),
            relay_attempts: Vec::new(),
            duration_ms: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn external_unavailable(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, SearchWarning::ExternalUnavailable { .. }))
    }

    /// Human-readable notice for the caller, if any.
    pub fn message(&self) -> Option<String> {
        if self.query.is_empty() {
            return None;
        }
        if self.external_unavailable() {
            return Some(
                "API search unavailable, showing local results only. Some games may not appear in search."
                    .to_string(),
            );
        }
        if self.games.is_empty() {
            return Some(format!("No games found for \"{}\"", self.query));
        }
        None
    }
}

/// Errors that can occur during search operations.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Every relay failed and the local cache had nothing.
    #[error("External catalog unavailable: all {} relays failed", attempts.len())]
    ExternalUnavailable { attempts: Vec<RelayAttempt> },

    /// The search was cancelled or superseded by a newer one.
    #[error("Search cancelled")]
    Cancelled,
}

impl SearchError {
    /// Whether retrying the same search later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SearchError::ExternalUnavailable { .. })
    }
}
