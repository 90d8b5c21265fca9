//! Types for the user game library.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::SessionError;
use crate::backend::BackendError;
use crate::catalog::GameRecord;

/// Where a game stands in the user's library.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    #[default]
    WantToPlay,
    Playing,
    Completed,
    Dropped,
    Collection,
}

impl GameStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::WantToPlay => "want_to_play",
            GameStatus::Playing => "playing",
            GameStatus::Completed => "completed",
            GameStatus::Dropped => "dropped",
            GameStatus::Collection => "collection",
        }
    }
}

/// A game in a user's library.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LibraryEntry {
    /// Library entry identifier (not the game id).
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_id: Option<i64>,
    #[serde(default)]
    pub status: Option<GameStatus>,
    /// 1-10.
    #[serde(default)]
    pub rating: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review: Option<String>,
    #[serde(default)]
    pub hours_played: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_added: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_started: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_completed: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game: Option<GameRecord>,
}

/// Partial update of a library entry. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LibraryUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<GameStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours_played: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_id: Option<i64>,
}

impl LibraryUpdate {
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.rating.is_none()
            && self.hours_played.is_none()
            && self.platform_id.is_none()
    }

    /// Check field ranges before sending the update.
    pub fn validate(&self) -> Result<(), LibraryError> {
        if self.is_empty() {
            return Err(LibraryError::Validation("nothing to update".to_string()));
        }
        if let Some(rating) = self.rating {
            if !(1..=10).contains(&rating) {
                return Err(LibraryError::Validation(format!(
                    "rating must be between 1 and 10, got {}",
                    rating
                )));
            }
        }
        if let Some(hours) = self.hours_played {
            if !hours.is_finite() || hours < 0.0 {
                return Err(LibraryError::Validation(format!(
                    "hours_played must be zero or more, got {}",
                    hours
                )));
            }
        }
        Ok(())
    }
}

/// Errors for library operations.
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Invalid library request: {0}")]
    Validation(String),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&GameStatus::WantToPlay).unwrap(),
            "\"want_to_play\""
        );
        let parsed: GameStatus = serde_json::from_str("\"collection\"").unwrap();
        assert_eq!(parsed, GameStatus::Collection);
        assert_eq!(parsed.as_str(), "collection");
        assert!(serde_json::from_str::<GameStatus>("\"abandoned\"").is_err());
    }

    #[test]
    fn test_validate_rating_range() {
        for rating in [1, 5, 10] {
            let update = LibraryUpdate {
                rating: Some(rating),
                ..Default::default()
            };
            assert!(update.validate().is_ok());
        }
        for rating in [0, 11, -3] {
            let update = LibraryUpdate {
                rating: Some(rating),
                ..Default::default()
            };
            assert!(matches!(update.validate(), Err(LibraryError::Validation(_))));
        }
    }

    #[test]
    fn test_validate_hours() {
        let ok = LibraryUpdate {
            hours_played: Some(0.0),
            ..Default::default()
        };
        assert!(ok.validate().is_ok());

        for hours in [-0.5, f64::NAN, f64::INFINITY] {
            let bad = LibraryUpdate {
                hours_played: Some(hours),
                ..Default::default()
            };
            assert!(bad.validate().is_err());
        }
    }

    #[test]
    fn test_validate_empty_update() {
        assert!(LibraryUpdate::default().validate().is_err());
    }

    #[test]
    fn test_update_serialization_skips_absent_fields() {
        let update = LibraryUpdate {
            status: Some(GameStatus::Playing),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_string(&update).unwrap(),
            r#"{"status":"playing"}"#
        );
    }

    #[test]
    fn test_entry_deserialization() {
        let json = r#"{
            "id": 12,
            "user_id": 3,
            "game_id": 40,
            "status": "completed",
            "rating": 9,
            "review": null,
            "hours_played": 61.5,
            "image_url": "https://img/medium.jpg",
            "date_added": "2024-02-01T10:00:00.123456",
            "date_started": null,
            "date_completed": "2024-03-01T22:15:00",
            "game": { "id": 40, "guid": "3030-40", "name": "Celeste" }
        }"#;
        let entry: LibraryEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.id, 12);
        assert_eq!(entry.status, Some(GameStatus::Completed));
        assert_eq!(entry.game.as_ref().unwrap().name, "Celeste");
        assert!(entry.date_started.is_none());
        assert!(entry.date_added.is_some());
    }
}
