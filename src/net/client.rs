// ACMI client session
// Per-connection protocol state machine: probe, handshake wait, header,
// then the fixed-rate frame loop against the shared aggregator

use std::collections::HashSet;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::time;
use tracing::{debug, info};

use super::connection::Connection;
use crate::acmi;
use crate::aggregator::Aggregator;
use crate::constants::{FRAME_INTERVAL_MS, HANDSHAKE_TIMEOUT_SECS};

/// State of an ACMI client session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Accepted, probe not yet sent
    Connected,
    /// Probe sent, waiting for client bytes
    Handshaking,
    /// Header sent, frame loop running
    Streaming,
    /// Connection released
    Closed,
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// Shutdown flag observed; clean exit
    Normal,
    /// No client bytes within the handshake window (or EOF before any)
    HandshakeTimeout,
    /// Socket write failed mid-stream
    ConnectionLost,
}

/// One client session.
///
/// The known-object set and the stream clock are private to the session;
/// only the aggregator is shared.
pub struct AcmiSession {
    connection: Connection,
    state: SessionState,
    known_aircraft: HashSet<String>,
    aggregator: Arc<Aggregator>,
    app_name: String,
    running: Arc<AtomicBool>,
    handshake_timeout: Duration,
}

impl AcmiSession {
    pub fn new(
        connection: Connection,
        aggregator: Arc<Aggregator>,
        app_name: String,
        running: Arc<AtomicBool>,
    ) -> Self {
        AcmiSession {
            connection,
            state: SessionState::Connected,
            known_aircraft: HashSet::new(),
            aggregator,
            app_name,
            running,
            handshake_timeout: Duration::from_secs_f64(HANDSHAKE_TIMEOUT_SECS),
        }
    }

    /// Get the current state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Drive the session to completion.
    ///
    /// Returns the close reason, or the I/O error that tore the
    /// connection down. The state is `Closed` afterwards either way.
    pub async fn run(&mut self) -> io::Result<CloseReason> {
        let result = self.drive().await;
        self.state = SessionState::Closed;
        result
    }

    async fn drive(&mut self) -> io::Result<CloseReason> {
        let peer = self.connection.peer_addr();

        // Probe first, then wait for any client bytes
        self.state = SessionState::Handshaking;
        self.connection
            .write_bytes(&acmi::handshake_probe(&self.app_name))
            .await?;

        if !self.await_handshake().await? {
            info!("Client {} handshake timeout", peer);
            return Ok(CloseReason::HandshakeTimeout);
        }
        debug!("Client handshake received from {}", peer);

        // Header exactly once; reference time fixed at session start
        self.connection
            .write_bytes(acmi::session_header(Utc::now()).as_bytes())
            .await?;
        self.state = SessionState::Streaming;

        let stream_start = Instant::now();
        let mut interval = time::interval(Duration::from_millis(FRAME_INTERVAL_MS));
        interval.set_missed_tick_behavior(time::MissedTickBehavior::Skip);

        loop {
            if !self.running.load(Ordering::Relaxed) {
                return Ok(CloseReason::Normal);
            }
            interval.tick().await;

            let snapshot = self.aggregator.snapshot().await;
            if snapshot.is_empty() {
                continue;
            }

            let offset = stream_start.elapsed().as_secs_f64();
            let frame = acmi::encode_frame(&snapshot, &mut self.known_aircraft, offset);
            if let Err(e) = self.connection.write_bytes(frame.as_bytes()).await {
                info!("Client {} disconnected: {}", peer, e);
                return Ok(CloseReason::ConnectionLost);
            }
        }
    }

    /// Wait for the client's side of the handshake.
    ///
    /// Any non-empty read within the window succeeds; the bytes themselves
    /// are not inspected. Timeout or EOF before any bytes fails.
    async fn await_handshake(&mut self) -> io::Result<bool> {
        let mut buf = [0u8; 1024];
        match time::timeout(self.handshake_timeout, self.connection.read_some(&mut buf)).await {
            Ok(Ok(0)) => Ok(false),
            Ok(Ok(_)) => Ok(true),
            Ok(Err(e)) => Err(e),
            Err(_) => Ok(false),
        }
    }
}
