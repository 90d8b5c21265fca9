use std::collections::HashSet;

use super::{types::Config, ConfigError};
use crate::external_catalog::RelayKind;

/// Catalog page size ceiling.
const MAX_RESULT_LIMIT: u32 = 100;

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Backend and catalog URLs are http(s)
/// - Catalog API key is set
/// - Relay list is non-empty, names are unique, prefixes are http(s)
/// - Limits and timeouts are positive
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(invalid("server.port cannot be 0"));
    }

    // Backend validation
    require_http_url("backend.base_url", &config.backend.base_url)?;
    if config.backend.timeout_secs == 0 {
        return Err(invalid("backend.timeout_secs must be at least 1"));
    }

    // Catalog validation
    require_http_url("catalog.base_url", &config.catalog.base_url)?;
    if config.catalog.api_key.trim().is_empty() {
        return Err(invalid("catalog.api_key must be set"));
    }
    if config.catalog.result_limit == 0 || config.catalog.result_limit > MAX_RESULT_LIMIT {
        return Err(invalid(&format!(
            "catalog.result_limit must be between 1 and {}",
            MAX_RESULT_LIMIT
        )));
    }
    if config.catalog.relays.is_empty() {
        return Err(invalid("catalog.relays must contain at least one relay"));
    }

    let mut names = HashSet::new();
    for relay in &config.catalog.relays {
        if relay.name.trim().is_empty() {
            return Err(invalid("catalog.relays: relay name cannot be empty"));
        }
        if !names.insert(relay.name.as_str()) {
            return Err(invalid(&format!(
                "catalog.relays: duplicate relay name '{}'",
                relay.name
            )));
        }
        match &relay.kind {
            RelayKind::Direct => {}
            RelayKind::Prefix { prefix, .. } | RelayKind::Envelope { prefix } => {
                require_http_url(&format!("catalog.relays.{}.prefix", relay.name), prefix)?;
            }
        }
    }

    // Search validation
    if config.search.local_limit == 0 {
        return Err(invalid("search.local_limit must be at least 1"));
    }
    if config.search.relay_timeout_secs == 0 {
        return Err(invalid("search.relay_timeout_secs must be at least 1"));
    }

    Ok(())
}

fn require_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(invalid(&format!(
            "{} must be an http(s) URL, got '{}'",
            field, value
        )))
    }
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::ValidationError(message.to_string())
}
