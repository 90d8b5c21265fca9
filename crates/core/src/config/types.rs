use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use crate::external_catalog::{default_relays, CatalogRequest, RelayKind};

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    3001
}

/// Game-library backend configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Backend URL (e.g., "http://localhost:5000/api")
    pub base_url: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// External game catalog configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    #[serde(default = "default_catalog_url")]
    pub base_url: String,
    pub api_key: String,
    /// Results requested per catalog search (default: 20)
    #[serde(default = "default_result_limit")]
    pub result_limit: u32,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Relays tried in order; defaults to the public relay list ending in a direct call.
    #[serde(default = "default_relays")]
    pub relays: Vec<RelayConfig>,
}

impl CatalogConfig {
    /// Build a catalog search request for `query`.
    pub fn request(&self, query: &str) -> CatalogRequest {
        CatalogRequest {
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            query: query.to_string(),
            limit: self.result_limit,
        }
    }
}

fn default_catalog_url() -> String {
    "https://www.giantbomb.com/api".to_string()
}

fn default_result_limit() -> u32 {
    20
}

fn default_user_agent() -> String {
    concat!("gamevault/", env!("CARGO_PKG_VERSION")).to_string()
}

/// One relay in the catalog relay chain
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct RelayConfig {
    pub name: String,
    #[serde(flatten)]
    pub kind: RelayKind,
}

/// Search aggregation configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Maximum local cache results per search (default: 50)
    #[serde(default = "default_local_limit")]
    pub local_limit: u32,
    /// Per-relay attempt timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub relay_timeout_secs: u64,
    /// Skip the external catalog when the local cache has results
    #[serde(default)]
    pub short_circuit_on_local_hit: bool,
}

impl SearchConfig {
    pub fn relay_timeout(&self) -> Duration {
        Duration::from_secs(self.relay_timeout_secs)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            local_limit: default_local_limit(),
            relay_timeout_secs: default_timeout(),
            short_circuit_on_local_hit: false,
        }
    }
}

fn default_local_limit() -> u32 {
    50
}

fn default_timeout() -> u64 {
    30
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub catalog: SanitizedCatalogConfig,
    pub search: SearchConfig,
}

/// Sanitized catalog config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedCatalogConfig {
    pub base_url: String,
    pub api_key_configured: bool,
    pub result_limit: u32,
    pub user_agent: String,
    pub relays: Vec<RelayConfig>,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            backend: config.backend.clone(),
            catalog: SanitizedCatalogConfig {
                base_url: config.catalog.base_url.clone(),
                api_key_configured: !config.catalog.api_key.is_empty(),
                result_limit: config.catalog.result_limit,
                user_agent: config.catalog.user_agent.clone(),
                relays: config.catalog.relays.clone(),
            },
            search: config.search.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[backend]
base_url = "http://localhost:5000/api"

[catalog]
api_key = "gb-key"
"#;

    #[test]
    fn test_deserialize_minimal_config_uses_defaults() {
        let config: Config = toml::from_str(MINIMAL).unwrap();
        assert_eq!(config.server.port, 3001);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert_eq!(config.backend.timeout_secs, 30);
        assert_eq!(config.catalog.base_url, "https://www.giantbomb.com/api");
        assert_eq!(config.catalog.result_limit, 20);
        assert_eq!(config.catalog.relays, default_relays());
        assert_eq!(config.search.local_limit, 50);
        assert_eq!(config.search.relay_timeout(), Duration::from_secs(30));
        assert!(!config.search.short_circuit_on_local_hit);
    }

    #[test]
    fn test_deserialize_missing_backend_fails() {
        let toml = r#"
[catalog]
api_key = "gb-key"
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_custom_relays() {
        let toml = r#"
[backend]
base_url = "http://localhost:5000/api"

[catalog]
api_key = "gb-key"

[[catalog.relays]]
name = "allorigins"
kind = "envelope"
prefix = "https://api.allorigins.win/get?url="

[[catalog.relays]]
name = "corsproxy"
kind = "prefix"
prefix = "https://corsproxy.io/?"
encode_target = true

[[catalog.relays]]
name = "direct"
kind = "direct"

[search]
relay_timeout_secs = 5
short_circuit_on_local_hit = true
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.catalog.relays.len(), 3);
        assert_eq!(
            config.catalog.relays[0].kind,
            RelayKind::Envelope {
                prefix: "https://api.allorigins.win/get?url=".to_string()
            }
        );
        assert_eq!(
            config.catalog.relays[1].kind,
            RelayKind::Prefix {
                prefix: "https://corsproxy.io/?".to_string(),
                encode_target: true
            }
        );
        assert_eq!(config.catalog.relays[2].kind, RelayKind::Direct);
        assert_eq!(config.search.relay_timeout_secs, 5);
        assert!(config.search.short_circuit_on_local_hit);
    }

    #[test]
    fn test_catalog_request() {
        let config: Config = toml::from_str(MINIMAL).unwrap();
        let request = config.catalog.request("metroid");
        assert_eq!(request.query, "metroid");
        assert_eq!(request.limit, 20);
        assert!(request.search_url().contains("api_key=gb-key"));
    }

    #[test]
    fn test_sanitized_config_hides_api_key() {
        let config: Config = toml::from_str(MINIMAL).unwrap();
        let sanitized = SanitizedConfig::from(&config);
        assert!(sanitized.catalog.api_key_configured);

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("gb-key"));
        assert!(json.contains("\"kind\":\"envelope\""));
    }
}
