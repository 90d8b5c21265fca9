//! Library API handlers.
//!
//! Every route needs a bearer session; the token is forwarded to the backend
//! as-is.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use gamevault_core::{GameRecord, GameStatus, LibraryEntry, LibraryError, LibraryUpdate};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::middleware::{record_session_failure, BearerSession};
use super::ErrorResponse;
use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

/// Request body for adding a search result to the library
#[derive(Debug, Deserialize)]
pub struct AddToLibraryBody {
    /// The game as it appeared in search results; `id` set means already cached
    pub game: GameRecord,
    #[serde(default)]
    pub status: GameStatus,
    #[serde(default)]
    pub platform_id: Option<i64>,
    /// Applied to the new entry right after it is added
    #[serde(default)]
    pub rating: Option<i32>,
    #[serde(default)]
    pub hours_played: Option<f64>,
}

impl AddToLibraryBody {
    /// Entry details that the add routes do not take.
    fn details(&self) -> LibraryUpdate {
        LibraryUpdate {
            rating: self.rating,
            hours_played: self.hours_played,
            ..Default::default()
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LibraryResponse {
    pub library: Vec<LibraryEntry>,
}

#[derive(Debug, Serialize)]
pub struct EntryResponse {
    pub user_game: LibraryEntry,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error_response(err: LibraryError) -> ApiError {
    let status = match &err {
        LibraryError::Session(e) => {
            record_session_failure(e);
            StatusCode::UNAUTHORIZED
        }
        LibraryError::Validation(_) => StatusCode::BAD_REQUEST,
        LibraryError::Backend(e) => e
            .status()
            .and_then(|s| StatusCode::from_u16(s).ok())
            .filter(|s| s.is_client_error() || s.is_server_error())
            .unwrap_or(StatusCode::BAD_GATEWAY),
    };
    if status.is_server_error() {
        warn!(error = %err, "Library request failed");
    }
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/library
pub async fn list_library(
    State(state): State<Arc<AppState>>,
    BearerSession(session): BearerSession,
) -> Result<Json<LibraryResponse>, impl IntoResponse> {
    match state.library().list(&session).await {
        Ok(library) => Ok(Json(LibraryResponse { library })),
        Err(e) => Err(error_response(e)),
    }
}

/// POST /api/v1/library
///
/// Add a search result. Cached games are added by guid, catalog-only games
/// are sent in full so the backend can cache them first. A rating or hours
/// played in the body are applied to the new entry as a follow-up update.
pub async fn add_to_library(
    State(state): State<Arc<AppState>>,
    BearerSession(session): BearerSession,
    Json(body): Json<AddToLibraryBody>,
) -> Result<(StatusCode, Json<EntryResponse>), ApiError> {
    let details = body.details();
    if !details.is_empty() {
        details.validate().map_err(error_response)?;
    }

    let library = state.library();
    let mut user_game = library
        .add_from_search(&session, &body.game, body.status, body.platform_id)
        .await
        .map_err(error_response)?;

    if !details.is_empty() {
        user_game = library
            .update(&session, user_game.id, &details)
            .await
            .map_err(error_response)?;
    }

    Ok((StatusCode::CREATED, Json(EntryResponse { user_game })))
}

/// PUT /api/v1/library/{id}
pub async fn update_entry(
    State(state): State<Arc<AppState>>,
    BearerSession(session): BearerSession,
    Path(id): Path<i64>,
    Json(update): Json<LibraryUpdate>,
) -> Result<Json<EntryResponse>, impl IntoResponse> {
    match state.library().update(&session, id, &update).await {
        Ok(user_game) => Ok(Json(EntryResponse { user_game })),
        Err(e) => Err(error_response(e)),
    }
}

/// DELETE /api/v1/library/{id}
pub async fn remove_entry(
    State(state): State<Arc<AppState>>,
    BearerSession(session): BearerSession,
    Path(id): Path<i64>,
) -> Result<StatusCode, impl IntoResponse> {
    match state.library().remove(&session, id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => Err(error_response(e)),
    }
}
