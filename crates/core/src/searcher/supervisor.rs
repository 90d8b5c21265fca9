//! Per-client supersession of in-flight searches.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;
use tracing::debug;

type Registry = Arc<Mutex<HashMap<String, (u64, CancellationToken)>>>;

/// A running search registered with a [`SearchSupervisor`].
///
/// Dropping the ticket unregisters the search, including when the request
/// future is dropped mid-search.
#[derive(Debug)]
pub struct SearchTicket {
    key: String,
    id: u64,
    token: CancellationToken,
    registry: Registry,
}

impl SearchTicket {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Token to pass to the search; cancelled when a newer search begins.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_superseded(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for SearchTicket {
    fn drop(&mut self) {
        let mut active = self.registry.lock().unwrap_or_else(|e| e.into_inner());
        // A newer search for the same key is left alone.
        if active.get(&self.key).is_some_and(|(id, _)| *id == self.id) {
            active.remove(&self.key);
        }
    }
}

/// Hands out cancellation tokens per client key.
///
/// Beginning a search for a key cancels that key's previous search, so a
/// slow stale search can never deliver results after a newer one.
#[derive(Debug, Default)]
pub struct SearchSupervisor {
    active: Registry,
    next_id: AtomicU64,
}

impl SearchSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new search for `key`, cancelling any search already running for it.
    pub fn begin(&self, key: &str) -> SearchTicket {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();

        let previous = self
            .active
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), (id, token.clone()));

        if let Some((previous_id, previous_token)) = previous {
            debug!(client = key, superseded = previous_id, "Cancelling superseded search");
            previous_token.cancel();
        }

        SearchTicket {
            key: key.to_string(),
            id,
            token,
            registry: Arc::clone(&self.active),
        }
    }

    /// Number of searches currently registered.
    pub fn active_count(&self) -> usize {
        self.active.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}
