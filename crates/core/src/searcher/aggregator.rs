//! Local-first game search with external catalog enrichment.

use std::sync::Arc;
use std::time::Instant;

use reqwest::Client;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::merge::{attach_cached, merge_results};
use super::{SearchError, SearchOutcome, SearchSettings, SearchWarning};
use crate::catalog::{GameRecord, GameStore, GameStoreError};
use crate::config::Config;
use crate::external_catalog::{build_relays, CatalogRequest, RelayChain, RelayError};
use crate::metrics;

/// Resolves free-text searches against the local cache and the external
/// catalog, merging both and writing new catalog records back to the cache.
pub struct SearchAggregator {
    store: Arc<dyn GameStore>,
    chain: RelayChain,
    request: CatalogRequest,
    settings: SearchSettings,
}

impl SearchAggregator {
    /// `request` is the catalog request template; its query is replaced per search.
    pub fn new(
        store: Arc<dyn GameStore>,
        chain: RelayChain,
        request: CatalogRequest,
        settings: SearchSettings,
    ) -> Self {
        Self {
            store,
            chain,
            request,
            settings,
        }
    }

    /// Build an aggregator with HTTP relays from configuration.
    pub fn from_config(config: &Config, store: Arc<dyn GameStore>) -> Result<Self, RelayError> {
        let client = Client::builder()
            .user_agent(&config.catalog.user_agent)
            .timeout(config.search.relay_timeout())
            .build()?;

        let chain = RelayChain::new(
            build_relays(&config.catalog.relays, &client),
            config.search.relay_timeout(),
        );

        Ok(Self::new(
            store,
            chain,
            config.catalog.request(""),
            SearchSettings {
                local_limit: config.search.local_limit,
                short_circuit_on_local_hit: config.search.short_circuit_on_local_hit,
            },
        ))
    }

    pub fn chain(&self) -> &RelayChain {
        &self.chain
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Look up one cached game by guid.
    pub async fn cached_game(&self, guid: &str) -> Result<Option<GameRecord>, GameStoreError> {
        self.store.get(guid).await
    }

    /// Run a search.
    ///
    /// Whitespace-only queries return an empty outcome without any network
    /// activity. Relay failures are tolerated as long as the local cache
    /// returned something; cache write-back failures are only logged.
    pub async fn search(
        &self,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<SearchOutcome, SearchError> {
        let query = query.trim();
        if query.is_empty() {
            metrics::SEARCHES_TOTAL.with_label_values(&["empty"]).inc();
            return Ok(SearchOutcome::empty(query));
        }

        let started = Instant::now();
        let mut outcome = SearchOutcome::empty(query);

        let local = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(cancelled(query)),
            r = self.store.search(query, self.settings.local_limit) => r,
        };
        let local = match local {
            Ok(games) => games,
            Err(e) => {
                warn!(query = query, error = %e, "Local cache search failed, continuing with catalog only");
                outcome.warnings.push(SearchWarning::LocalStoreUnavailable {
                    detail: e.to_string(),
                });
                Vec::new()
            }
        };

        debug!(query = query, local = local.len(), "Local cache searched");

        if self.settings.short_circuit_on_local_hit && !local.is_empty() {
            let (games, _) = merge_results(local, Vec::new());
            outcome.local_count = games.len();
            outcome.games = games;
            return Ok(self.finish(outcome, started, "short_circuit"));
        }

        let target = CatalogRequest {
            query: query.to_string(),
            ..self.request.clone()
        }
        .search_url();

        let chain = match self.chain.run(&target, cancel).await {
            Ok(chain) => chain,
            Err(_) => return Err(cancelled(query)),
        };
        outcome.relay_attempts = chain.attempts.clone();

        let label = if chain.succeeded() {
            "merged"
        } else if local.is_empty() {
            warn!(
                query = query,
                attempts = chain.attempts.len(),
                "All catalog relays failed and local cache is empty"
            );
            metrics::SEARCHES_TOTAL
                .with_label_values(&["external_unavailable"])
                .inc();
            return Err(SearchError::ExternalUnavailable {
                attempts: chain.attempts,
            });
        } else {
            warn!(
                query = query,
                local = local.len(),
                "All catalog relays failed, returning local results only"
            );
            outcome.warnings.push(SearchWarning::ExternalUnavailable {
                detail: chain.failure_summary(),
            });
            "degraded"
        };

        let (mut games, discovered) = merge_results(local, chain.games());
        outcome.local_count = games.len() - discovered.len();
        outcome.external_count = discovered.len();

        if !discovered.is_empty() {
            let raw: Vec<Value> = discovered.into_iter().map(|g| g.raw).collect();
            outcome.cached_count = self.write_back(query, &raw, &mut games, cancel).await?;
        }

        outcome.games = games;
        Ok(self.finish(outcome, started, label))
    }

    /// Best-effort cache write-back of newly discovered catalog records.
    ///
    /// On success the written records are swapped for their cached versions so
    /// they carry local ids.
    async fn write_back(
        &self,
        query: &str,
        raw: &[Value],
        games: &mut [GameRecord],
        cancel: &CancellationToken,
    ) -> Result<Option<u32>, SearchError> {
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(cancelled(query)),
            r = self.store.cache_results(raw) => r,
        };

        match result {
            Ok(report) => {
                let attached = attach_cached(games, report.games);
                debug!(
                    query = query,
                    submitted = raw.len(),
                    cached = report.cached_count,
                    attached = attached,
                    "Cached catalog results"
                );
                metrics::CACHE_WRITEBACKS.with_label_values(&["success"]).inc();
                Ok(Some(report.cached_count))
            }
            Err(e) => {
                warn!(
                    query = query,
                    submitted = raw.len(),
                    error = %e,
                    "Failed to cache catalog results, using catalog records directly"
                );
                metrics::CACHE_WRITEBACKS.with_label_values(&["failed"]).inc();
                Ok(None)
            }
        }
    }

    fn finish(&self, mut outcome: SearchOutcome, started: Instant, label: &str) -> SearchOutcome {
        let elapsed = started.elapsed();
        outcome.duration_ms = elapsed.as_millis() as u64;

        metrics::SEARCHES_TOTAL.with_label_values(&[label]).inc();
        metrics::SEARCH_DURATION
            .with_label_values(&[])
            .observe(elapsed.as_secs_f64());
        metrics::SEARCH_RESULTS
            .with_label_values(&["local"])
            .observe(outcome.local_count as f64);
        metrics::SEARCH_RESULTS
            .with_label_values(&["external"])
            .observe(outcome.external_count as f64);
        metrics::SEARCH_RESULTS
            .with_label_values(&["merged"])
            .observe(outcome.games.len() as f64);

        info!(
            query = %outcome.query,
            results = outcome.games.len(),
            local = outcome.local_count,
            external = outcome.external_count,
            duration_ms = outcome.duration_ms,
            "Search completed"
        );

        outcome
    }
}

fn cancelled(query: &str) -> SearchError {
    debug!(query = query, "Search cancelled");
    metrics::SEARCHES_TOTAL.with_label_values(&["cancelled"]).inc();
    SearchError::Cancelled
}
