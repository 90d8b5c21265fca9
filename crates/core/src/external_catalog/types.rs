//! Types for external catalog requests, responses and relay attempts.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::catalog::ExternalGame;

/// Catalog status code meaning "OK".
pub const CATALOG_STATUS_OK: i64 = 1;

/// A free-text search against the external catalog.
#[derive(Debug, Clone)]
pub struct CatalogRequest {
    pub base_url: String,
    pub api_key: String,
    pub query: String,
    pub limit: u32,
}

impl CatalogRequest {
    /// The catalog search URL this request targets.
    pub fn search_url(&self) -> String {
        format!(
            "{}/search/?api_key={}&format=json&query={}&resources=game&limit={}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(&self.api_key),
            urlencoding::encode(&self.query),
            self.limit
        )
    }
}

/// Decoded catalog search response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogResponse {
    /// Catalog status code (1 = OK). Missing means the relay stripped it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<i64>,
    /// Catalog status text ("OK" or an error description).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_total_results: Option<u64>,
    /// Raw result objects.
    #[serde(default, deserialize_with = "results_list")]
    pub results: Vec<Value>,
}

impl CatalogResponse {
    pub fn is_ok(&self) -> bool {
        self.status_code.is_none_or(|code| code == CATALOG_STATUS_OK)
    }

    /// Decode results into game records, dropping entries without a guid.
    pub fn games(&self) -> Vec<ExternalGame> {
        ExternalGame::decode_all(&self.results)
    }
}

/// The catalog returns `[]` for hits but occasionally `{}` or null for none.
fn results_list<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        _ => Vec::new(),
    })
}

/// How a relay wraps the catalog URL and what its response looks like.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RelayKind {
    /// Call the catalog URL directly.
    Direct,
    /// `prefix + target`, body is the catalog JSON unmodified.
    Prefix {
        prefix: String,
        /// Percent-encode the target URL before appending it.
        #[serde(default)]
        encode_target: bool,
    },
    /// `prefix + encode(target)`, body is `{ "contents": "<json string>" }`.
    Envelope { prefix: String },
}

impl RelayKind {
    /// The URL to request for a given catalog target.
    pub fn request_url(&self, target: &str) -> String {
        match self {
            RelayKind::Direct => target.to_string(),
            RelayKind::Prefix {
                prefix,
                encode_target: true,
            } => format!("{}{}", prefix, urlencoding::encode(target)),
            RelayKind::Prefix { prefix, .. } => format!("{}{}", prefix, target),
            RelayKind::Envelope { prefix } => format!("{}{}", prefix, urlencoding::encode(target)),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RelayKind::Direct => "direct",
            RelayKind::Prefix { .. } => "prefix",
            RelayKind::Envelope { .. } => "envelope",
        }
    }
}

/// One try of one relay in the chain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RelayAttempt {
    /// Relay name.
    pub relay: String,
    /// Position in the chain (0-based).
    pub position: usize,
    pub outcome: AttemptOutcome,
    pub elapsed_ms: u64,
}

impl RelayAttempt {
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, AttemptOutcome::Succeeded { .. })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AttemptOutcome {
    Succeeded { result_count: usize },
    Failed { reason: String },
}
