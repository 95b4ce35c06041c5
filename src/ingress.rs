// Ingress channel - bounded queue between telemetry producers and the aggregator
//
// Producers enqueue without blocking; when the queue is full the newest
// record is dropped so the producer's cadence is never slowed. A single
// drain task is the only consumer and applies records to the aggregator in
// arrival order. Client sessions read the aggregator, never this queue.

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::aggregator::Aggregator;
use crate::constants::INGRESS_CAPACITY;
use crate::state::AircraftState;

/// Producer-side handle for the ingress queue.
#[derive(Clone)]
pub struct IngressSender {
    tx: mpsc::Sender<AircraftState>,
}

impl IngressSender {
    /// Enqueue a state record without blocking.
    ///
    /// On a full queue the record is dropped (logged, non-fatal); on a
    /// closed queue it is discarded silently since the server is going down.
    pub fn send(&self, state: AircraftState) {
        match self.tx.try_send(state) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(state)) => {
                warn!("Ingress queue full, dropping update for {}", state.aircraft_id);
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!("Ingress queue closed, discarding update");
            }
        }
    }
}

/// Create the bounded ingress queue (capacity 100).
pub fn channel() -> (IngressSender, mpsc::Receiver<AircraftState>) {
    let (tx, rx) = mpsc::channel(INGRESS_CAPACITY);
    (IngressSender { tx }, rx)
}

/// Drain loop: pops records and applies them to the aggregator.
///
/// This is the sole consumer of the queue. Runs until every sender handle
/// has been dropped.
pub async fn run_drain(mut rx: mpsc::Receiver<AircraftState>, aggregator: Arc<Aggregator>) {
    while let Some(state) = rx.recv().await {
        aggregator.update(state).await;
    }
    debug!("Ingress drain stopped");
}
