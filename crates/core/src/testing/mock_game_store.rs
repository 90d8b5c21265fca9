//! Mock local game cache for testing.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::catalog::{CacheReport, GameRecord, GameStore, GameStoreError};

/// Mock implementation of the GameStore trait.
///
/// Provides controllable behavior for testing:
/// - Serve cached games by case-insensitive name match, in insertion order
/// - Assign local ids to written-back catalog records
/// - Track searches and write-back batches for assertions
/// - Simulate failures
///
/// # Example
///
/// ```rust,ignore
/// use gamevault_core::testing::{MockGameStore, fixtures};
///
/// let store = MockGameStore::new();
/// store.add_game(fixtures::local_game(1, "3030-1", "Zelda")).await;
///
/// let games = store.search("zel", 50).await?;
/// assert_eq!(games.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockGameStore {
    /// Cached games in insertion order.
    games: Arc<RwLock<Vec<GameRecord>>>,
    /// Next local id handed out by write-back.
    next_id: Arc<RwLock<i64>>,
    /// Recorded (query, limit) searches.
    searches: Arc<RwLock<Vec<(String, u32)>>>,
    /// Recorded write-back batches.
    cache_batches: Arc<RwLock<Vec<Vec<Value>>>>,
    /// If set, the next search will fail with this error.
    next_search_error: Arc<RwLock<Option<GameStoreError>>>,
    /// If set, the next write-back will fail with this error.
    next_cache_error: Arc<RwLock<Option<GameStoreError>>>,
}

impl Default for MockGameStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGameStore {
    /// Create a new empty mock store.
    pub fn new() -> Self {
        Self {
            games: Arc::new(RwLock::new(Vec::new())),
            next_id: Arc::new(RwLock::new(1000)),
            searches: Arc::new(RwLock::new(Vec::new())),
            cache_batches: Arc::new(RwLock::new(Vec::new())),
            next_search_error: Arc::new(RwLock::new(None)),
            next_cache_error: Arc::new(RwLock::new(None)),
        }
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Add a cached game.
    pub async fn add_game(&self, game: GameRecord) {
        self.games.write().await.push(game);
    }

    /// Replace all cached games.
    pub async fn set_games(&self, games: Vec<GameRecord>) {
        *self.games.write().await = games;
    }

    /// All cached games.
    pub async fn games(&self) -> Vec<GameRecord> {
        self.games.read().await.clone()
    }

    // =========================================================================
    // Query Recording
    // =========================================================================

    pub async fn recorded_searches(&self) -> Vec<(String, u32)> {
        self.searches.read().await.clone()
    }

    /// Raw objects submitted to each write-back call.
    pub async fn recorded_cache_batches(&self) -> Vec<Vec<Value>> {
        self.cache_batches.read().await.clone()
    }

    // =========================================================================
    // Error Injection
    // =========================================================================

    /// Configure the next search to fail with the given error.
    pub async fn set_next_search_error(&self, error: GameStoreError) {
        *self.next_search_error.write().await = Some(error);
    }

    /// Configure the next write-back to fail with the given error.
    pub async fn set_next_cache_error(&self, error: GameStoreError) {
        *self.next_cache_error.write().await = Some(error);
    }
}

#[async_trait]
impl GameStore for MockGameStore {
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<GameRecord>, GameStoreError> {
        self.searches
            .write()
            .await
            .push((query.to_string(), limit));

        if let Some(err) = self.next_search_error.write().await.take() {
            return Err(err);
        }

        let query_lower = query.to_lowercase();
        Ok(self
            .games
            .read()
            .await
            .iter()
            .filter(|g| g.name.to_lowercase().contains(&query_lower))
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn cache_results(&self, raw: &[Value]) -> Result<CacheReport, GameStoreError> {
        if raw.is_empty() {
            return Err(GameStoreError::EmptyBatch);
        }

        self.cache_batches.write().await.push(raw.to_vec());

        if let Some(err) = self.next_cache_error.write().await.take() {
            return Err(err);
        }

        let mut games = self.games.write().await;
        let mut next_id = self.next_id.write().await;
        let mut stored = Vec::new();

        for value in raw {
            let Some(mut record) = GameRecord::from_catalog(value) else {
                continue;
            };
            if let Some(existing) = games.iter().find(|g| g.guid == record.guid) {
                stored.push(existing.clone());
                continue;
            }
            record.id = Some(*next_id);
            *next_id += 1;
            games.push(record.clone());
            stored.push(record);
        }

        Ok(CacheReport {
            cached_count: stored.len() as u32,
            games: stored,
        })
    }

    async fn get(&self, guid: &str) -> Result<Option<GameRecord>, GameStoreError> {
        Ok(self
            .games
            .read()
            .await
            .iter()
            .find(|g| g.guid == guid)
            .cloned())
    }
}
