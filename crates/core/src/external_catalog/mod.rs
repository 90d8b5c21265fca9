//! External game catalog access through an ordered chain of relays.
//!
//! The catalog (Giant Bomb) is reached through one of several interchangeable
//! relay strategies. Each strategy knows how to wrap the catalog URL and how
//! to unwrap its response; the [`RelayChain`] tries them one at a time in
//! declared order until one succeeds.

mod chain;
mod relay;
mod types;

pub use chain::{ChainOutcome, RelayChain};
pub use relay::{build_relays, default_relays, HttpRelay};
pub use types::*;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Errors from a single relay attempt.
#[derive(Debug, Error)]
pub enum RelayError {
    /// HTTP request failed (connect, TLS, body read).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Attempt exceeded its time budget.
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// Relay answered with a non-2xx status.
    #[error("Relay returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// Body could not be decoded in the relay's response shape.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Catalog answered but reported an error status.
    #[error("Catalog error {status_code}: {message}")]
    Catalog { status_code: i64, message: String },

    /// The caller cancelled the search.
    #[error("Cancelled")]
    Cancelled,
}

/// One way of reaching the external catalog.
#[async_trait]
pub trait RelayStrategy: Send + Sync {
    /// Relay name for logs, metrics and attempt traces.
    fn name(&self) -> &str;

    /// Fetch and decode the catalog response for `target` (the catalog URL).
    async fn fetch(&self, target: &str) -> Result<CatalogResponse, RelayError>;
}
