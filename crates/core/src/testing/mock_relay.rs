//! Mock relay strategy for testing.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::external_catalog::{CatalogResponse, RelayError, RelayStrategy, CATALOG_STATUS_OK};

/// What a [`MockRelay`] does when asked to fetch.
#[derive(Debug, Clone)]
pub enum MockRelayBehavior {
    /// Return these raw results with an OK catalog status.
    Respond(Vec<Value>),
    /// Return these raw results after a delay.
    Delayed(Duration, Vec<Value>),
    /// Fail with an HTTP status.
    Status(u16),
    /// Fail as if the body could not be decoded.
    Garbage,
    /// Answer with a catalog-level error status.
    CatalogError { status_code: i64, message: String },
    /// Never answer.
    Hang,
}

/// Mock implementation of the RelayStrategy trait.
///
/// Provides controllable behavior for testing:
/// - Return configurable catalog results
/// - Simulate failures and hangs
/// - Track requested targets for assertions
///
/// # Example
///
/// ```rust,ignore
/// use gamevault_core::testing::{MockRelay, fixtures};
///
/// let relay = MockRelay::responding("corsproxy", vec![fixtures::catalog_game("3030-1", "Zelda")]);
/// let response = relay.fetch("https://catalog/search/?query=zelda").await?;
/// assert_eq!(relay.call_count().await, 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockRelay {
    name: String,
    behavior: Arc<RwLock<MockRelayBehavior>>,
    targets: Arc<RwLock<Vec<String>>>,
}

impl MockRelay {
    /// Create a mock relay with the given behavior.
    pub fn new(name: &str, behavior: MockRelayBehavior) -> Self {
        Self {
            name: name.to_string(),
            behavior: Arc::new(RwLock::new(behavior)),
            targets: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn responding(name: &str, results: Vec<Value>) -> Self {
        Self::new(name, MockRelayBehavior::Respond(results))
    }

    pub fn failing(name: &str, status: u16) -> Self {
        Self::new(name, MockRelayBehavior::Status(status))
    }

    pub fn hanging(name: &str) -> Self {
        Self::new(name, MockRelayBehavior::Hang)
    }

    /// Replace the behavior for subsequent fetches.
    pub async fn set_behavior(&self, behavior: MockRelayBehavior) {
        *self.behavior.write().await = behavior;
    }

    /// Targets requested so far, in order.
    pub async fn recorded_targets(&self) -> Vec<String> {
        self.targets.read().await.clone()
    }

    /// Get the number of fetches performed.
    pub async fn call_count(&self) -> usize {
        self.targets.read().await.len()
    }

    fn ok_response(results: Vec<Value>) -> CatalogResponse {
        CatalogResponse {
            status_code: Some(CATALOG_STATUS_OK),
            error: Some("OK".to_string()),
            number_of_total_results: Some(results.len() as u64),
            results,
        }
    }
}

#[async_trait]
impl RelayStrategy for MockRelay {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, target: &str) -> Result<CatalogResponse, RelayError> {
        self.targets.write().await.push(target.to_string());

        let behavior = self.behavior.read().await.clone();
        match behavior {
            MockRelayBehavior::Respond(results) => Ok(Self::ok_response(results)),
            MockRelayBehavior::Delayed(delay, results) => {
                tokio::time::sleep(delay).await;
                Ok(Self::ok_response(results))
            }
            MockRelayBehavior::Status(status) => Err(RelayError::Status {
                status,
                message: "mock relay failure".to_string(),
            }),
            MockRelayBehavior::Garbage => {
                Err(RelayError::Decode("expected value at line 1 column 1".to_string()))
            }
            MockRelayBehavior::CatalogError {
                status_code,
                message,
            } => Err(RelayError::Catalog {
                status_code,
                message,
            }),
            MockRelayBehavior::Hang => {
                std::future::pending::<()>().await;
                unreachable!()
            }
        }
    }
}
