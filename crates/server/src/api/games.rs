//! Cached game lookup.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use gamevault_core::{GameRecord, GameStoreError};
use serde::Serialize;
use tracing::warn;

use super::ErrorResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct GameResponse {
    pub game: GameRecord,
}

/// GET /api/v1/games/{guid}
pub async fn get_game(
    State(state): State<Arc<AppState>>,
    Path(guid): Path<String>,
) -> Result<Json<GameResponse>, (StatusCode, Json<ErrorResponse>)> {
    match state.search().cached_game(&guid).await {
        Ok(Some(game)) => Ok(Json(GameResponse { game })),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Game not found: {}", guid),
            }),
        )),
        Err(e) => {
            warn!(guid = %guid, error = %e, "Cached game lookup failed");
            let status = match &e {
                GameStoreError::Backend(backend) => backend
                    .status()
                    .and_then(|s| StatusCode::from_u16(s).ok())
                    .filter(|s| s.is_server_error())
                    .unwrap_or(StatusCode::BAD_GATEWAY),
                GameStoreError::EmptyBatch => StatusCode::INTERNAL_SERVER_ERROR,
            };
            Err((
                status,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            ))
        }
    }
}
