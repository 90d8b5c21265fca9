use std::sync::Arc;

use gamevault_core::{Config, LibraryService, SanitizedConfig, SearchAggregator, SearchSupervisor};
use reqwest::{Client, Url};

/// Shared application state
pub struct AppState {
    config: Config,
    search: Arc<SearchAggregator>,
    supervisor: SearchSupervisor,
    library: Arc<dyn LibraryService>,
    proxy_client: Client,
    backend_origin: String,
}

impl AppState {
    pub fn new(
        config: Config,
        search: Arc<SearchAggregator>,
        library: Arc<dyn LibraryService>,
        proxy_client: Client,
    ) -> Self {
        let backend_origin = backend_origin(&config.backend.base_url);
        Self {
            config,
            search,
            supervisor: SearchSupervisor::new(),
            library,
            proxy_client,
            backend_origin,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn search(&self) -> &SearchAggregator {
        self.search.as_ref()
    }

    pub fn supervisor(&self) -> &SearchSupervisor {
        &self.supervisor
    }

    pub fn library(&self) -> &dyn LibraryService {
        self.library.as_ref()
    }

    pub fn proxy_client(&self) -> &Client {
        &self.proxy_client
    }

    /// Scheme, host and port of the backend; proxied paths are appended as-is.
    pub fn backend_origin(&self) -> &str {
        &self.backend_origin
    }
}

fn backend_origin(base_url: &str) -> String {
    match Url::parse(base_url) {
        Ok(url) => url.origin().ascii_serialization(),
        Err(_) => base_url.trim_end_matches('/').to_string(),
    }
}
