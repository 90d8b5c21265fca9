//! HTTP relay strategies.
//!
//! A relay is either the catalog itself (direct), a forwarding proxy that
//! returns the catalog body untouched (prefix), or a proxy that wraps the
//! body in a JSON envelope as an escaped string (envelope).

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::Deserialize;
use tracing::debug;

use super::{CatalogResponse, RelayError, RelayKind, RelayStrategy};
use crate::config::RelayConfig;

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    contents: Option<String>,
    #[serde(default)]
    status: Option<EnvelopeStatus>,
}

#[derive(Debug, Deserialize)]
struct EnvelopeStatus {
    #[serde(default)]
    http_code: Option<u16>,
}

/// Relay strategy backed by an HTTP request.
pub struct HttpRelay {
    name: String,
    kind: RelayKind,
    client: Client,
}

impl HttpRelay {
    pub fn new(name: impl Into<String>, kind: RelayKind, client: Client) -> Self {
        Self {
            name: name.into(),
            kind,
            client,
        }
    }

    /// Decode a response body according to this relay's response shape.
    fn decode(&self, body: &str) -> Result<CatalogResponse, RelayError> {
        let response: CatalogResponse = match &self.kind {
            RelayKind::Direct | RelayKind::Prefix { .. } => serde_json::from_str(body)
                .map_err(|e| RelayError::Decode(format!("catalog body: {}", e)))?,
            RelayKind::Envelope { .. } => {
                let envelope: Envelope = serde_json::from_str(body)
                    .map_err(|e| RelayError::Decode(format!("envelope: {}", e)))?;

                if let Some(code) = envelope.status.and_then(|s| s.http_code) {
                    if !(200..300).contains(&code) {
                        return Err(RelayError::Status {
                            status: code,
                            message: "upstream status inside envelope".to_string(),
                        });
                    }
                }

                let contents = envelope
                    .contents
                    .ok_or_else(|| RelayError::Decode("envelope has no contents".to_string()))?;

                serde_json::from_str(&contents)
                    .map_err(|e| RelayError::Decode(format!("envelope contents: {}", e)))?
            }
        };

        if !response.is_ok() {
            return Err(RelayError::Catalog {
                status_code: response.status_code.unwrap_or_default(),
                message: response.error.clone().unwrap_or_default(),
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl RelayStrategy for HttpRelay {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, target: &str) -> Result<CatalogResponse, RelayError> {
        let url = self.kind.request_url(target);

        debug!(relay = %self.name, kind = self.kind.label(), "Requesting catalog through relay");

        let response = self
            .client
            .get(&url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RelayError::Status {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let body = response.text().await?;
        self.decode(&body)
    }
}

/// Build relay strategies from configuration, in declared order.
pub fn build_relays(configs: &[RelayConfig], client: &Client) -> Vec<Arc<dyn RelayStrategy>> {
    configs
        .iter()
        .map(|c| {
            Arc::new(HttpRelay::new(c.name.clone(), c.kind.clone(), client.clone()))
                as Arc<dyn RelayStrategy>
        })
        .collect()
}

/// The public relays used when none are configured, ending with a direct call.
pub fn default_relays() -> Vec<RelayConfig> {
    vec![
        RelayConfig {
            name: "corsproxy".to_string(),
            kind: RelayKind::Prefix {
                prefix: "https://corsproxy.io/?".to_string(),
                encode_target: true,
            },
        },
        RelayConfig {
            name: "cors-anywhere".to_string(),
            kind: RelayKind::Prefix {
                prefix: "https://cors-anywhere.herokuapp.com/".to_string(),
                encode_target: false,
            },
        },
        RelayConfig {
            name: "allorigins".to_string(),
            kind: RelayKind::Envelope {
                prefix: "https://api.allorigins.win/get?url=".to_string(),
            },
        },
        RelayConfig {
            name: "codetabs".to_string(),
            kind: RelayKind::Prefix {
                prefix: "https://api.codetabs.com/v1/proxy?quest=".to_string(),
                encode_target: false,
            },
        },
        RelayConfig {
            name: "thingproxy".to_string(),
            kind: RelayKind::Prefix {
                prefix: "https://thingproxy.freeboard.io/fetch/".to_string(),
                encode_target: false,
            },
        },
        RelayConfig {
            name: "direct".to_string(),
            kind: RelayKind::Direct,
        },
    ]
}
