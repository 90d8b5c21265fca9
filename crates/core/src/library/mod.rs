//! User game library, stored by the backend.
//!
//! Every operation takes an explicit [`Session`]; expired sessions are
//! rejected before any request is made.

mod http;
mod types;

pub use http::HttpLibraryClient;
pub use types::*;

use async_trait::async_trait;

use crate::auth::Session;
use crate::catalog::GameRecord;

/// Trait for library storage.
#[async_trait]
pub trait LibraryService: Send + Sync {
    /// All entries in the session user's library.
    async fn list(&self, session: &Session) -> Result<Vec<LibraryEntry>, LibraryError>;

    /// Add a game already in the local cache, by guid.
    async fn add_existing(
        &self,
        session: &Session,
        guid: &str,
        status: GameStatus,
        platform_id: Option<i64>,
    ) -> Result<LibraryEntry, LibraryError>;

    /// Add a game known only from the external catalog; the backend caches it.
    async fn add_external(
        &self,
        session: &Session,
        game: &GameRecord,
        status: GameStatus,
        platform_id: Option<i64>,
    ) -> Result<LibraryEntry, LibraryError>;

    /// Apply a validated partial update to an entry.
    async fn update(
        &self,
        session: &Session,
        entry_id: i64,
        update: &LibraryUpdate,
    ) -> Result<LibraryEntry, LibraryError>;

    async fn remove(&self, session: &Session, entry_id: i64) -> Result<(), LibraryError>;

    /// Add a search result, choosing the route by whether it is already cached.
    async fn add_from_search(
        &self,
        session: &Session,
        game: &GameRecord,
        status: GameStatus,
        platform_id: Option<i64>,
    ) -> Result<LibraryEntry, LibraryError> {
        if game.is_cached() {
            self.add_existing(session, &game.guid, status, platform_id)
                .await
        } else {
            self.add_external(session, game, status, platform_id).await
        }
    }
}
