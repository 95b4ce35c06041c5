// Aggregator - shared latest-value store for aircraft state
//
// One instance is built at startup and handed by Arc to the ingress drain
// and to every client session. Writers replace whole records; readers take
// an isolated copy of the full map and work on it with no lock held.

use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::warn;

use crate::state::{now_unix, AircraftState};

/// Concurrency-safe mapping of aircraft id to its latest state record.
pub struct Aggregator {
    states: RwLock<HashMap<String, AircraftState>>,
}

impl Aggregator {
    pub fn new() -> Self {
        Aggregator {
            states: RwLock::new(HashMap::new()),
        }
    }

    /// Insert or replace the record for `state.aircraft_id`.
    ///
    /// The record is sanitized first; a record with non-finite numeric
    /// fields is dropped (logged, non-fatal). `last_update` is stamped with
    /// the ingestion instant and never moves backwards for a given id.
    pub async fn update(&self, state: AircraftState) {
        let Some(mut state) = state.sanitize() else {
            warn!("Dropping state update with non-finite fields");
            return;
        };

        let now = now_unix();
        let mut states = self.states.write().await;
        state.last_update = match states.get(&state.aircraft_id) {
            Some(prev) => now.max(prev.last_update),
            None => now,
        };
        states.insert(state.aircraft_id.clone(), state);
    }

    /// An independent copy of the current id -> record mapping.
    ///
    /// The copy is taken under the read lock and released before return, so
    /// callers consume it without blocking writers. An empty map simply
    /// means no producer has reported yet.
    pub async fn snapshot(&self) -> HashMap<String, AircraftState> {
        self.states.read().await.clone()
    }

    /// Number of aircraft currently tracked
    pub async fn len(&self) -> usize {
        self.states.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.states.read().await.is_empty()
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}
