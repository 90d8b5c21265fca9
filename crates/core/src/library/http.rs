use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{GameStatus, LibraryEntry, LibraryError, LibraryService, LibraryUpdate};
use crate::auth::Session;
use crate::backend::BackendClient;
use crate::catalog::GameRecord;

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    library: Vec<LibraryEntry>,
}

#[derive(Debug, Deserialize)]
struct EntryResponse {
    user_game: LibraryEntry,
}

#[derive(Debug, Serialize)]
struct AddExistingRequest<'a> {
    game_guid: &'a str,
    status: GameStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    platform_id: Option<i64>,
}

#[derive(Debug, Serialize)]
struct AddExternalRequest<'a> {
    #[serde(flatten)]
    game: &'a GameRecord,
    status: GameStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    platform_id: Option<i64>,
}

/// Library client for the backend's `/games/library` routes.
pub struct HttpLibraryClient {
    backend: BackendClient,
}

impl HttpLibraryClient {
    pub fn new(backend: BackendClient) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl LibraryService for HttpLibraryClient {
    async fn list(&self, session: &Session) -> Result<Vec<LibraryEntry>, LibraryError> {
        session.ensure_active()?;

        let request = self
            .backend
            .request(Method::GET, "/games/library", Some(session));
        let response: ListResponse = self.backend.send(request).await?;

        debug!(entries = response.library.len(), "Fetched library");
        Ok(response.library)
    }

    async fn add_existing(
        &self,
        session: &Session,
        guid: &str,
        status: GameStatus,
        platform_id: Option<i64>,
    ) -> Result<LibraryEntry, LibraryError> {
        session.ensure_active()?;
        if guid.trim().is_empty() {
            return Err(LibraryError::Validation("game guid is required".to_string()));
        }

        let request = self
            .backend
            .request(Method::POST, "/games/library/add", Some(session))
            .json(&AddExistingRequest {
                game_guid: guid,
                status,
                platform_id,
            });
        let response: EntryResponse = self.backend.send(request).await?;

        debug!(guid = guid, entry = response.user_game.id, "Added cached game to library");
        Ok(response.user_game)
    }

    async fn add_external(
        &self,
        session: &Session,
        game: &GameRecord,
        status: GameStatus,
        platform_id: Option<i64>,
    ) -> Result<LibraryEntry, LibraryError> {
        session.ensure_active()?;
        if game.guid.trim().is_empty() || game.name.trim().is_empty() {
            return Err(LibraryError::Validation(
                "game guid and name are required".to_string(),
            ));
        }

        let request = self
            .backend
            .request(Method::POST, "/games/library/add-external", Some(session))
            .json(&AddExternalRequest {
                game,
                status,
                platform_id,
            });
        let response: EntryResponse = self.backend.send(request).await?;

        debug!(guid = %game.guid, entry = response.user_game.id, "Added catalog game to library");
        Ok(response.user_game)
    }

    async fn update(
        &self,
        session: &Session,
        entry_id: i64,
        update: &LibraryUpdate,
    ) -> Result<LibraryEntry, LibraryError> {
        session.ensure_active()?;
        update.validate()?;

        let request = self
            .backend
            .request(
                Method::PUT,
                &format!("/games/library/{}", entry_id),
                Some(session),
            )
            .json(update);
        let response: EntryResponse = self.backend.send(request).await?;
        Ok(response.user_game)
    }

    async fn remove(&self, session: &Session, entry_id: i64) -> Result<(), LibraryError> {
        session.ensure_active()?;

        let request = self.backend.request(
            Method::DELETE,
            &format!("/games/library/{}", entry_id),
            Some(session),
        );
        let _: Value = self.backend.send(request).await?;

        debug!(entry = entry_id, "Removed game from library");
        Ok(())
    }
}
