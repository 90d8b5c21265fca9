use axum::{
    middleware,
    routing::{get, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::middleware::metrics_middleware;
use super::{games, handlers, library, proxy, search};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health, config and metrics
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/metrics", get(handlers::metrics))
        // Search (local cache + external catalog)
        .route("/search", get(search::search))
        .route("/games/{guid}", get(games::get_game))
        // Library (bearer session required)
        .route(
            "/library",
            get(library::list_library).post(library::add_to_library),
        )
        .route(
            "/library/{id}",
            put(library::update_entry).delete(library::remove_entry),
        );

    // Everything else under /api is forwarded to the backend
    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api/v1", api_routes)
        .fallback(proxy::forward)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
