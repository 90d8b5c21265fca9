pub mod games;
pub mod handlers;
pub mod library;
pub mod middleware;
pub mod proxy;
pub mod routes;
pub mod search;

use serde::Serialize;

pub use routes::create_router;

/// Error body shared by every handler.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
