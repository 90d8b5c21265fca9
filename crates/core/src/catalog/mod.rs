//! Local game cache - the backend's store of previously seen catalog records.
//!
//! Searches check the cache before going out to the external catalog, and
//! newly discovered external records are written back so later searches for
//! the same term find them locally.

mod http;
mod types;

pub use http::HttpGameStore;
pub use types::*;

use async_trait::async_trait;
use serde_json::Value;

/// Trait for the local game cache.
#[async_trait]
pub trait GameStore: Send + Sync {
    /// Search cached games by name, returning at most `limit` records.
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<GameRecord>, GameStoreError>;

    /// Store raw external catalog results in one batch.
    ///
    /// Records already cached are returned as-is; new ones get a local id.
    async fn cache_results(&self, raw: &[Value]) -> Result<CacheReport, GameStoreError>;

    /// Look up a single cached game by guid.
    async fn get(&self, guid: &str) -> Result<Option<GameRecord>, GameStoreError>;
}
