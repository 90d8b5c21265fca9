//! Sequential relay chain: first success wins.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::{AttemptOutcome, CatalogResponse, RelayAttempt, RelayError, RelayStrategy};
use crate::catalog::ExternalGame;
use crate::metrics;

/// Result of running the chain to completion.
#[derive(Debug, Clone, Default)]
pub struct ChainOutcome {
    /// Response of the successful attempt, if any relay succeeded.
    pub response: Option<CatalogResponse>,
    /// Every attempt made, in order.
    pub attempts: Vec<RelayAttempt>,
}

impl ChainOutcome {
    pub fn succeeded(&self) -> bool {
        self.response.is_some()
    }

    /// Decoded games from the successful response (empty if none succeeded).
    pub fn games(&self) -> Vec<ExternalGame> {
        self.response
            .as_ref()
            .map(CatalogResponse::games)
            .unwrap_or_default()
    }

    /// One-line summary of failed attempts, for warnings.
    pub fn failure_summary(&self) -> String {
        if self.attempts.is_empty() {
            return "no relays configured".to_string();
        }
        self.attempts
            .iter()
            .filter_map(|a| match &a.outcome {
                AttemptOutcome::Failed { reason } => Some(format!("{}: {}", a.relay, reason)),
                AttemptOutcome::Succeeded { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Ordered list of relay strategies tried one at a time.
#[derive(Clone)]
pub struct RelayChain {
    relays: Vec<Arc<dyn RelayStrategy>>,
    attempt_timeout: Duration,
}

impl RelayChain {
    pub fn new(relays: Vec<Arc<dyn RelayStrategy>>, attempt_timeout: Duration) -> Self {
        Self {
            relays,
            attempt_timeout,
        }
    }

    pub fn len(&self) -> usize {
        self.relays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relays.is_empty()
    }

    pub fn relay_names(&self) -> Vec<&str> {
        self.relays.iter().map(|r| r.name()).collect()
    }

    pub fn attempt_timeout(&self) -> Duration {
        self.attempt_timeout
    }

    /// Try each relay in order until one returns a usable catalog response.
    ///
    /// Relay failures never escape: they are recorded in the attempt trace and
    /// the next relay is tried. The only error is [`RelayError::Cancelled`].
    pub async fn run(
        &self,
        target: &str,
        cancel: &CancellationToken,
    ) -> Result<ChainOutcome, RelayError> {
        let mut outcome = ChainOutcome::default();

        for (position, relay) in self.relays.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(RelayError::Cancelled);
            }

            let name = relay.name().to_string();
            let started = Instant::now();

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(RelayError::Cancelled),
                r = tokio::time::timeout(self.attempt_timeout, relay.fetch(target)) => {
                    r.unwrap_or_else(|_| Err(RelayError::Timeout(self.attempt_timeout)))
                }
            };

            let elapsed = started.elapsed();
            metrics::RELAY_DURATION
                .with_label_values(&[name.as_str()])
                .observe(elapsed.as_secs_f64());

            match result {
                Ok(response) => {
                    let result_count = response.results.len();
                    debug!(
                        relay = %name,
                        position = position,
                        results = result_count,
                        elapsed_ms = elapsed.as_millis() as u64,
                        "Relay succeeded"
                    );
                    metrics::RELAY_ATTEMPTS
                        .with_label_values(&[name.as_str(), "success"])
                        .inc();
                    outcome.attempts.push(RelayAttempt {
                        relay: name,
                        position,
                        outcome: AttemptOutcome::Succeeded { result_count },
                        elapsed_ms: elapsed.as_millis() as u64,
                    });
                    outcome.response = Some(response);
                    return Ok(outcome);
                }
                Err(e) => {
                    warn!(
                        relay = %name,
                        position = position,
                        error = %e,
                        "Relay failed, trying next"
                    );
                    let label = match &e {
                        RelayError::Timeout(_) => "timeout",
                        _ => "error",
                    };
                    metrics::RELAY_ATTEMPTS.with_label_values(&[name.as_str(), label]).inc();
                    outcome.attempts.push(RelayAttempt {
                        relay: name,
                        position,
                        outcome: AttemptOutcome::Failed {
                            reason: e.to_string(),
                        },
                        elapsed_ms: elapsed.as_millis() as u64,
                    });
                }
            }
        }

        Ok(outcome)
    }
}
