//! Common test utilities for API testing with mocks.
//!
//! This module provides a test fixture that creates an in-process router
//! with mock dependencies injected, so the HTTP surface can be exercised
//! without a backend or the external catalog.

#![allow(dead_code)]

use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use gamevault_core::{
    external_catalog::RelayStrategy,
    load_config_from_str,
    testing::{MockGameStore, MockLibrary, MockRelay},
    RelayChain, SearchAggregator, SearchSettings,
};
use gamevault_server::{api::create_router, state::AppState};

/// Re-export fixtures for test convenience
pub use gamevault_core::testing::fixtures;

/// Test fixture for API testing with mock dependencies.
///
/// Provides an in-process router with fully controllable mocks for:
/// - Local game cache (MockGameStore)
/// - Catalog relays (MockRelay)
/// - User library (MockLibrary)
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_search() {
///     let fixture = TestFixture::new().await;
///
///     let response = fixture.get("/api/v1/search?q=zelda").await;
///
///     assert_eq!(response.status, StatusCode::OK);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock local cache - configure cached games, inspect write-backs
    pub store: MockGameStore,
    /// Mock relays in chain order
    pub relays: Vec<MockRelay>,
    /// Mock library - inspect entries and recorded calls
    pub library: MockLibrary,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with one relay answering with no results.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    /// Create a test fixture with custom configuration.
    pub async fn with_config(test_config: TestConfig) -> Self {
        let backend_url = test_config
            .backend_url
            .clone()
            .unwrap_or_else(|| format!("http://127.0.0.1:{}", unused_port()));

        let config = load_config_from_str(&format!(
            r#"
[server]
host = "127.0.0.1"
port = 3001

[backend]
base_url = "{}/api"

[catalog]
api_key = "test-key"
"#,
            backend_url
        ))
        .expect("Failed to parse test config");

        let relays = if test_config.relays.is_empty() {
            vec![MockRelay::responding("direct", vec![])]
        } else {
            test_config.relays
        };

        let store = MockGameStore::new();
        let library = MockLibrary::new();

        let chain = RelayChain::new(
            relays
                .iter()
                .map(|r| Arc::new(r.clone()) as Arc<dyn RelayStrategy>)
                .collect(),
            test_config.relay_timeout,
        );
        let search = SearchAggregator::new(
            Arc::new(store.clone()),
            chain,
            fixtures::catalog_request(),
            SearchSettings::default(),
        );

        let state = Arc::new(AppState::new(
            config,
            Arc::new(search),
            Arc::new(library.clone()),
            reqwest::Client::new(),
        ));

        let router = create_router(state);

        Self {
            router,
            store,
            relays,
            library,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body), None).await
    }

    /// Send a GET request with a bearer token.
    pub async fn get_authed(&self, path: &str, token: &str) -> TestResponse {
        self.request("GET", path, None, Some(token)).await
    }

    /// Send a POST request with JSON body and a bearer token.
    pub async fn post_authed(&self, path: &str, body: Value, token: &str) -> TestResponse {
        self.request("POST", path, Some(body), Some(token)).await
    }

    /// Send a PUT request with JSON body and a bearer token.
    pub async fn put_authed(&self, path: &str, body: Value, token: &str) -> TestResponse {
        self.request("PUT", path, Some(body), Some(token)).await
    }

    /// Send a DELETE request with a bearer token.
    pub async fn delete_authed(&self, path: &str, token: &str) -> TestResponse {
        self.request("DELETE", path, None, Some(token)).await
    }

    /// Send a request and return the raw response (for non-JSON bodies and headers).
    pub async fn raw(&self, request: Request<Body>) -> axum::response::Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request")
    }

    /// Send a request to the test server.
    async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        if let Some(token) = token {
            request_builder =
                request_builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();
        let response = self.raw(request).await;

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

/// Configuration for test fixture.
#[derive(Debug, Clone)]
pub struct TestConfig {
    /// Relays in chain order (default: one relay answering with no results)
    pub relays: Vec<MockRelay>,
    /// Per-attempt relay timeout
    pub relay_timeout: Duration,
    /// Backend origin for proxied requests (default: a closed local port)
    pub backend_url: Option<String>,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            relays: Vec::new(),
            relay_timeout: Duration::from_millis(100),
            backend_url: None,
        }
    }
}

impl TestConfig {
    /// Config with the given relays.
    pub fn with_relays(relays: Vec<MockRelay>) -> Self {
        Self {
            relays,
            ..Default::default()
        }
    }

    /// Config proxying to the given backend origin.
    pub fn with_backend(backend_url: &str) -> Self {
        Self {
            backend_url: Some(backend_url.to_string()),
            ..Default::default()
        }
    }
}

/// A local port nothing is listening on.
pub fn unused_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

/// A bearer token that expires far in the future.
pub fn valid_token() -> String {
    fixtures::jwt("42", 4_102_444_800)
}

/// A bearer token that expired at the Unix epoch plus one second.
pub fn expired_token() -> String {
    fixtures::jwt("42", 1)
}

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn spawn_backend(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind backend stub");
    let addr = listener.local_addr().expect("Failed to read stub address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });
    format!("http://{}", addr)
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}

/// Helper to assert a JSON path equals expected value.
#[macro_export]
macro_rules! assert_json_path {
    ($json:expr, $path:expr, $expected:expr) => {
        let actual = &$json[$path];
        assert_eq!(
            actual, &$expected,
            "Path '{}' expected {:?}, got {:?}",
            $path, $expected, actual
        );
    };
}
