//! Mock library service for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::auth::Session;
use crate::backend::BackendError;
use crate::catalog::GameRecord;
use crate::library::{GameStatus, LibraryEntry, LibraryError, LibraryService, LibraryUpdate};

/// A recorded library call for test assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedLibraryCall {
    List,
    AddExisting {
        guid: String,
        status: GameStatus,
        platform_id: Option<i64>,
    },
    AddExternal {
        guid: String,
        status: GameStatus,
        platform_id: Option<i64>,
    },
    Update {
        entry_id: i64,
        update: LibraryUpdate,
    },
    Remove {
        entry_id: i64,
    },
}

/// Mock implementation of the LibraryService trait.
///
/// Keeps entries in memory, rejects expired sessions like the real client,
/// and records every call that reached the "backend".
#[derive(Debug, Clone)]
pub struct MockLibrary {
    entries: Arc<RwLock<Vec<LibraryEntry>>>,
    next_id: Arc<RwLock<i64>>,
    calls: Arc<RwLock<Vec<RecordedLibraryCall>>>,
    /// If set, the next backend call will fail with this error.
    next_error: Arc<RwLock<Option<LibraryError>>>,
}

impl Default for MockLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLibrary {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(Vec::new())),
            next_id: Arc::new(RwLock::new(1)),
            calls: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    pub async fn entries(&self) -> Vec<LibraryEntry> {
        self.entries.read().await.clone()
    }

    pub async fn recorded_calls(&self) -> Vec<RecordedLibraryCall> {
        self.calls.read().await.clone()
    }

    /// Configure the next backend call to fail with the given error.
    pub async fn set_next_error(&self, error: LibraryError) {
        *self.next_error.write().await = Some(error);
    }

    async fn begin(
        &self,
        session: &Session,
        call: RecordedLibraryCall,
    ) -> Result<(), LibraryError> {
        session.ensure_active()?;
        self.calls.write().await.push(call);
        match self.next_error.write().await.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn insert(
        &self,
        game: Option<GameRecord>,
        status: GameStatus,
        platform_id: Option<i64>,
    ) -> Result<LibraryEntry, LibraryError> {
        let mut entries = self.entries.write().await;
        if let Some(guid) = game.as_ref().map(|g| g.guid.as_str()) {
            let duplicate = entries
                .iter()
                .any(|e| e.game.as_ref().is_some_and(|g| g.guid == guid));
            if duplicate {
                return Err(LibraryError::Backend(BackendError::Status {
                    status: 400,
                    message: "Game already in library".to_string(),
                }));
            }
        }

        let mut next_id = self.next_id.write().await;
        let entry = LibraryEntry {
            id: *next_id,
            user_id: None,
            game_id: game.as_ref().and_then(|g| g.id),
            status: Some(status),
            rating: None,
            review: None,
            hours_played: None,
            platform_id,
            image_url: None,
            date_added: None,
            date_started: None,
            date_completed: None,
            game,
        };
        *next_id += 1;
        entries.push(entry.clone());
        Ok(entry)
    }

    fn not_found() -> LibraryError {
        LibraryError::Backend(BackendError::Status {
            status: 404,
            message: "Game not found in library".to_string(),
        })
    }
}

#[async_trait]
impl LibraryService for MockLibrary {
    async fn list(&self, session: &Session) -> Result<Vec<LibraryEntry>, LibraryError> {
        self.begin(session, RecordedLibraryCall::List).await?;
        Ok(self.entries.read().await.clone())
    }

    async fn add_existing(
        &self,
        session: &Session,
        guid: &str,
        status: GameStatus,
        platform_id: Option<i64>,
    ) -> Result<LibraryEntry, LibraryError> {
        self.begin(
            session,
            RecordedLibraryCall::AddExisting {
                guid: guid.to_string(),
                status,
                platform_id,
            },
        )
        .await?;
        let game = GameRecord {
            id: None,
            guid: guid.to_string(),
            name: String::new(),
            original_release_date: None,
            image: None,
            platforms: None,
            deck: None,
            description: None,
        };
        self.insert(Some(game), status, platform_id).await
    }

    async fn add_external(
        &self,
        session: &Session,
        game: &GameRecord,
        status: GameStatus,
        platform_id: Option<i64>,
    ) -> Result<LibraryEntry, LibraryError> {
        self.begin(
            session,
            RecordedLibraryCall::AddExternal {
                guid: game.guid.clone(),
                status,
                platform_id,
            },
        )
        .await?;
        self.insert(Some(game.clone()), status, platform_id).await
    }

    async fn update(
        &self,
        session: &Session,
        entry_id: i64,
        update: &LibraryUpdate,
    ) -> Result<LibraryEntry, LibraryError> {
        session.ensure_active()?;
        update.validate()?;
        self.begin(
            session,
            RecordedLibraryCall::Update {
                entry_id,
                update: update.clone(),
            },
        )
        .await?;

        let mut entries = self.entries.write().await;
        let entry = entries
            .iter_mut()
            .find(|e| e.id == entry_id)
            .ok_or_else(Self::not_found)?;

        if let Some(status) = update.status {
            entry.status = Some(status);
        }
        if let Some(rating) = update.rating {
            entry.rating = Some(rating);
        }
        if let Some(hours) = update.hours_played {
            entry.hours_played = Some(hours);
        }
        if let Some(platform_id) = update.platform_id {
            entry.platform_id = Some(platform_id);
        }
        Ok(entry.clone())
    }

    async fn remove(&self, session: &Session, entry_id: i64) -> Result<(), LibraryError> {
        self.begin(session, RecordedLibraryCall::Remove { entry_id })
            .await?;

        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|e| e.id != entry_id);
        if entries.len() == before {
            return Err(Self::not_found());
        }
        Ok(())
    }
}
