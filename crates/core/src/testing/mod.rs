//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the service traits, allowing
//! search and library flows to be tested without a backend or the catalog.
//!
//! # Example
//!
//! ```rust,ignore
//! use gamevault_core::testing::{fixtures, MockGameStore, MockRelay};
//!
//! let store = MockGameStore::new();
//! store.add_game(fixtures::local_game(1, "3030-1", "Zelda")).await;
//!
//! let relay = MockRelay::responding("direct", vec![fixtures::catalog_game("3030-2", "Zelda II")]);
//!
//! // Build a SearchAggregator with these...
//! ```

mod mock_game_store;
mod mock_library;
mod mock_relay;

pub use mock_game_store::MockGameStore;
pub use mock_library::{MockLibrary, RecordedLibraryCall};
pub use mock_relay::{MockRelay, MockRelayBehavior};

/// Test fixtures and helper functions.
pub mod fixtures {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;
    use serde_json::{json, Value};

    use crate::catalog::GameRecord;
    use crate::external_catalog::CatalogRequest;

    /// A raw catalog search result as the catalog returns it.
    pub fn catalog_game(guid: &str, name: &str) -> Value {
        let numeric_id: i64 = guid
            .rsplit('-')
            .next()
            .and_then(|id| id.parse().ok())
            .unwrap_or(0);
        json!({
            "id": numeric_id,
            "guid": guid,
            "name": name,
            "deck": format!("{} is a game.", name),
            "original_release_date": "2017-03-03",
            "image": {
                "icon_url": format!("https://img.test/{}/icon.jpg", guid),
                "medium_url": format!("https://img.test/{}/medium.jpg", guid),
                "super_url": format!("https://img.test/{}/super.jpg", guid)
            },
            "platforms": [
                { "id": 157, "name": "Nintendo Switch", "abbreviation": "NSW" }
            ],
            "resource_type": "game"
        })
    }

    /// A game record as the local cache returns it.
    pub fn local_game(id: i64, guid: &str, name: &str) -> GameRecord {
        GameRecord {
            id: Some(id),
            guid: guid.to_string(),
            name: name.to_string(),
            original_release_date: None,
            image: None,
            platforms: None,
            deck: None,
            description: None,
        }
    }

    /// Catalog request template pointing at a test catalog.
    pub fn catalog_request() -> CatalogRequest {
        CatalogRequest {
            base_url: "https://catalog.test/api".to_string(),
            api_key: "test-key".to_string(),
            query: String::new(),
            limit: 20,
        }
    }

    /// An unsigned JWT carrying `sub` and `exp` claims.
    pub fn jwt(sub: &str, exp: i64) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(json!({ "sub": sub, "exp": exp }).to_string());
        format!("{}.{}.c2lnbmF0dXJl", header, payload)
    }
}
