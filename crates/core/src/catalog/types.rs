//! Types for game records and the local game cache.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::backend::BackendError;

/// A single catalog entry for a game.
///
/// Records coming from the local cache carry a numeric `id`. Records freshly
/// decoded from the external catalog have no `id` until they are written back.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameRecord {
    /// Local cache identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// External catalog identity (e.g. "3030-12345"). Sole de-duplication key.
    pub guid: String,
    /// Display name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Original release date as reported by the catalog.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_release_date: Option<String>,
    /// Cover images at several resolutions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<GameImage>,
    /// Platforms the game was released on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platforms: Option<Vec<PlatformRef>>,
    /// One-line summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deck: Option<String>,
    /// Long-form description (may contain HTML).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl GameRecord {
    /// Decode a raw catalog search result.
    ///
    /// Returns `None` for objects without a usable `guid`. The catalog's own
    /// numeric `id` is discarded so that `id` only ever means a local id.
    pub fn from_catalog(raw: &Value) -> Option<Self> {
        let mut record: GameRecord = serde_json::from_value(raw.clone()).ok()?;
        if record.guid.trim().is_empty() {
            return None;
        }
        record.id = None;
        Some(record)
    }

    /// Whether this record is already stored in the local cache.
    pub fn is_cached(&self) -> bool {
        self.id.is_some()
    }
}

/// Image URLs at the resolutions the catalog provides.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GameImage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tiny_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumb_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub small_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen_large_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub super_url: Option<String>,
}

/// A platform reference attached to a game.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlatformRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abbreviation: Option<String>,
}

/// A record decoded from the external catalog, with the raw object kept for
/// cache write-back.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalGame {
    pub record: GameRecord,
    pub raw: Value,
}

impl ExternalGame {
    /// Decode a list of raw catalog results, dropping entries without a guid.
    pub fn decode_all(raw: &[Value]) -> Vec<ExternalGame> {
        raw.iter()
            .filter_map(|value| {
                GameRecord::from_catalog(value).map(|record| ExternalGame {
                    record,
                    raw: value.clone(),
                })
            })
            .collect()
    }
}

/// Result of a cache write-back call.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CacheReport {
    /// Number of records the backend reports as cached.
    pub cached_count: u32,
    /// Cached records, carrying their local ids.
    #[serde(default)]
    pub games: Vec<GameRecord>,
}

/// Errors for local cache operations.
#[derive(Debug, Error)]
pub enum GameStoreError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("Nothing to cache")]
    EmptyBatch,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
