//! Backend-hosted game cache, reached over its REST routes.

use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{CacheReport, GameStoreError, GameStore, GameRecord};
use crate::backend::{BackendClient, BackendError};

#[derive(Debug, Deserialize)]
struct LocalSearchResponse {
    #[serde(default)]
    games: Vec<GameRecord>,
}

#[derive(Debug, Deserialize)]
struct GameResponse {
    game: GameRecord,
}

#[derive(Debug, Serialize)]
struct CacheRequest<'a> {
    results: &'a [Value],
}

/// Game cache served by the game-library backend.
pub struct HttpGameStore {
    backend: BackendClient,
}

impl HttpGameStore {
    pub fn new(backend: BackendClient) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl GameStore for HttpGameStore {
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<GameRecord>, GameStoreError> {
        debug!(query = query, limit = limit, "Searching local game cache");

        let request = self
            .backend
            .request(Method::GET, "/games/search", None)
            .query(&[("q", query.to_string()), ("limit", limit.to_string())]);

        let response: LocalSearchResponse = self.backend.send(request).await?;
        Ok(response.games)
    }

    async fn cache_results(&self, raw: &[Value]) -> Result<CacheReport, GameStoreError> {
        if raw.is_empty() {
            return Err(GameStoreError::EmptyBatch);
        }

        debug!(count = raw.len(), "Writing catalog results back to cache");

        let request = self
            .backend
            .request(Method::POST, "/games/cache-search-results", None)
            .json(&CacheRequest { results: raw });

        Ok(self.backend.send(request).await?)
    }

    async fn get(&self, guid: &str) -> Result<Option<GameRecord>, GameStoreError> {
        let path = format!("/games/{}", urlencoding::encode(guid));
        let request = self.backend.request(Method::GET, &path, None);

        match self.backend.send::<GameResponse>(request).await {
            Ok(response) => Ok(Some(response.game)),
            Err(BackendError::Status { status: 404, .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
