//! Bearer sessions for authenticated backend calls.

mod session;

pub use session::Session;

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Authentication required")]
    Missing,

    #[error("Malformed credentials: {0}")]
    Malformed(String),

    #[error("Session expired at {expired_at}")]
    Expired { expired_at: DateTime<Utc> },
}
