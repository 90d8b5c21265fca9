//! Game search handler.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use gamevault_core::{RelayAttempt, SearchError, SearchOutcome};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    /// Caller identity for supersession; a newer search from the same client
    /// cancels the older one.
    #[serde(default)]
    pub client: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    #[serde(flatten)]
    pub outcome: SearchOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<SearchOutcome> for SearchResponse {
    fn from(outcome: SearchOutcome) -> Self {
        let message = outcome.message();
        Self { outcome, message }
    }
}

#[derive(Debug, Serialize)]
pub struct SearchErrorResponse {
    pub error: String,
    pub retryable: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attempts: Vec<RelayAttempt>,
}

impl From<SearchError> for SearchErrorResponse {
    fn from(err: SearchError) -> Self {
        let error = err.to_string();
        let retryable = err.is_retryable();
        let attempts = match err {
            SearchError::ExternalUnavailable { attempts } => attempts,
            SearchError::Cancelled => Vec::new(),
        };
        Self {
            error,
            retryable,
            attempts,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/search?q=...&client=...
///
/// Search the local cache and the external catalog.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, impl IntoResponse> {
    let result = match params.client.as_deref().filter(|c| !c.is_empty()) {
        Some(client) => {
            // Released on drop, also when the client disconnects mid-search.
            let ticket = state.supervisor().begin(client);
            state.search().search(&params.q, ticket.token()).await
        }
        None => {
            state
                .search()
                .search(&params.q, &CancellationToken::new())
                .await
        }
    };

    match result {
        Ok(outcome) => Ok(Json(SearchResponse::from(outcome))),
        Err(e) => {
            let status = match e {
                SearchError::ExternalUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
                SearchError::Cancelled => StatusCode::CONFLICT,
            };
            Err((status, Json(SearchErrorResponse::from(e))))
        }
    }
}
