//! Library API tests against the mock library service.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use gamevault_core::{
    backend::BackendError, testing::RecordedLibraryCall, GameStatus, LibraryError, LibraryUpdate,
};

use common::{expired_token, fixtures, valid_token, TestFixture};

#[tokio::test]
async fn test_library_requires_bearer_session() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/library").await;

    assert_status!(response, StatusCode::UNAUTHORIZED);
    assert_json_path!(response.body, "error", "Authentication required");
    assert!(fixture.library.recorded_calls().await.is_empty());
}

#[tokio::test]
async fn test_expired_session_is_rejected_before_backend_call() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .get_authed("/api/v1/library", &expired_token())
        .await;

    assert_status!(response, StatusCode::UNAUTHORIZED);
    assert!(response.body["error"]
        .as_str()
        .unwrap()
        .starts_with("Session expired"));
    assert!(fixture.library.recorded_calls().await.is_empty());
}

#[tokio::test]
async fn test_add_catalog_game_goes_through_external_route() {
    let fixture = TestFixture::new().await;
    let token = valid_token();
    let game = fixtures::catalog_game("3030-77", "Outer Wilds");

    let response = fixture
        .post_authed(
            "/api/v1/library",
            json!({ "game": game, "status": "playing", "platform_id": 94 }),
            &token,
        )
        .await;

    assert_status!(response, StatusCode::CREATED);
    assert_eq!(response.body["user_game"]["status"], "playing");
    assert_eq!(response.body["user_game"]["platform_id"], 94);

    // The catalog fixture carries the catalog's numeric id, so it looks cached.
    // A record with its id stripped must take the external route.
    let mut uncached = fixtures::catalog_game("3030-78", "Tunic");
    uncached.as_object_mut().unwrap().remove("id");
    let response = fixture
        .post_authed("/api/v1/library", json!({ "game": uncached }), &token)
        .await;
    assert_status!(response, StatusCode::CREATED);

    let calls = fixture.library.recorded_calls().await;
    assert_eq!(
        calls[1],
        RecordedLibraryCall::AddExternal {
            guid: "3030-78".to_string(),
            status: GameStatus::WantToPlay,
            platform_id: None,
        }
    );
}

#[tokio::test]
async fn test_add_cached_game_goes_through_guid_route() {
    let fixture = TestFixture::new().await;
    let game = fixtures::local_game(12, "3030-12", "Celeste");

    let response = fixture
        .post_authed(
            "/api/v1/library",
            json!({ "game": game, "status": "completed" }),
            &valid_token(),
        )
        .await;

    assert_status!(response, StatusCode::CREATED);
    assert_eq!(
        fixture.library.recorded_calls().await,
        vec![RecordedLibraryCall::AddExisting {
            guid: "3030-12".to_string(),
            status: GameStatus::Completed,
            platform_id: None,
        }]
    );
}

#[tokio::test]
async fn test_add_applies_rating_and_hours_to_new_entry() {
    let fixture = TestFixture::new().await;
    let game = fixtures::local_game(12, "3030-12", "Celeste");

    let response = fixture
        .post_authed(
            "/api/v1/library",
            json!({
                "game": game,
                "status": "completed",
                "platform_id": 94,
                "rating": 9,
                "hours_played": 31.5
            }),
            &valid_token(),
        )
        .await;

    assert_status!(response, StatusCode::CREATED);
    assert_eq!(response.body["user_game"]["rating"], 9);
    assert_eq!(response.body["user_game"]["hours_played"], 31.5);
    let id = response.body["user_game"]["id"].as_i64().unwrap();

    assert_eq!(
        fixture.library.recorded_calls().await,
        vec![
            RecordedLibraryCall::AddExisting {
                guid: "3030-12".to_string(),
                status: GameStatus::Completed,
                platform_id: Some(94),
            },
            RecordedLibraryCall::Update {
                entry_id: id,
                update: LibraryUpdate {
                    rating: Some(9),
                    hours_played: Some(31.5),
                    ..Default::default()
                },
            },
        ]
    );
}

#[tokio::test]
async fn test_add_with_invalid_rating_creates_nothing() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post_authed(
            "/api/v1/library",
            json!({ "game": fixtures::local_game(3, "3030-3", "Hades"), "rating": 0 }),
            &valid_token(),
        )
        .await;

    assert_status!(response, StatusCode::BAD_REQUEST);
    assert!(fixture.library.recorded_calls().await.is_empty());
    assert!(fixture.library.entries().await.is_empty());
}

#[tokio::test]
async fn test_duplicate_add_maps_backend_status() {
    let fixture = TestFixture::new().await;
    let token = valid_token();
    let body = json!({ "game": fixtures::local_game(3, "3030-3", "Hades") });

    let first = fixture.post_authed("/api/v1/library", body.clone(), &token).await;
    let second = fixture.post_authed("/api/v1/library", body, &token).await;

    assert_status!(first, StatusCode::CREATED);
    assert_status!(second, StatusCode::BAD_REQUEST);
    assert!(second.body["error"]
        .as_str()
        .unwrap()
        .contains("Game already in library"));
}

#[tokio::test]
async fn test_list_returns_added_entries() {
    let fixture = TestFixture::new().await;
    let token = valid_token();
    fixture
        .post_authed(
            "/api/v1/library",
            json!({ "game": fixtures::local_game(3, "3030-3", "Hades") }),
            &token,
        )
        .await;

    let response = fixture.get_authed("/api/v1/library", &token).await;

    assert_status!(response, StatusCode::OK);
    let library = response.body["library"].as_array().unwrap();
    assert_eq!(library.len(), 1);
    assert_eq!(library[0]["game"]["guid"], "3030-3");
}

#[tokio::test]
async fn test_update_entry() {
    let fixture = TestFixture::new().await;
    let token = valid_token();
    let created = fixture
        .post_authed(
            "/api/v1/library",
            json!({ "game": fixtures::local_game(3, "3030-3", "Hades") }),
            &token,
        )
        .await;
    let id = created.body["user_game"]["id"].as_i64().unwrap();

    let response = fixture
        .put_authed(
            &format!("/api/v1/library/{}", id),
            json!({ "status": "completed", "rating": 9, "hours_played": 61.5 }),
            &token,
        )
        .await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["user_game"]["status"], "completed");
    assert_eq!(response.body["user_game"]["rating"], 9);
    assert_eq!(response.body["user_game"]["hours_played"], 61.5);
}

#[tokio::test]
async fn test_invalid_update_is_bad_request() {
    let fixture = TestFixture::new().await;
    let token = valid_token();

    let out_of_range = fixture
        .put_authed("/api/v1/library/1", json!({ "rating": 11 }), &token)
        .await;
    let empty = fixture
        .put_authed("/api/v1/library/1", json!({}), &token)
        .await;

    assert_status!(out_of_range, StatusCode::BAD_REQUEST);
    assert_status!(empty, StatusCode::BAD_REQUEST);
    assert!(fixture.library.recorded_calls().await.is_empty());
}

#[tokio::test]
async fn test_remove_entry() {
    let fixture = TestFixture::new().await;
    let token = valid_token();
    let created = fixture
        .post_authed(
            "/api/v1/library",
            json!({ "game": fixtures::local_game(3, "3030-3", "Hades") }),
            &token,
        )
        .await;
    let id = created.body["user_game"]["id"].as_i64().unwrap();

    let response = fixture
        .delete_authed(&format!("/api/v1/library/{}", id), &token)
        .await;
    assert_status!(response, StatusCode::NO_CONTENT);

    let missing = fixture
        .delete_authed(&format!("/api/v1/library/{}", id), &token)
        .await;
    assert_status!(missing, StatusCode::NOT_FOUND);
    assert!(fixture.library.entries().await.is_empty());
}

#[tokio::test]
async fn test_backend_failure_without_status_is_bad_gateway() {
    let fixture = TestFixture::new().await;
    fixture
        .library
        .set_next_error(LibraryError::Backend(BackendError::Parse(
            "expected value at line 1".to_string(),
        )))
        .await;

    let response = fixture
        .get_authed("/api/v1/library", &valid_token())
        .await;

    assert_status!(response, StatusCode::BAD_GATEWAY);
}
