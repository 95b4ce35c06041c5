// TCP listener and server
// Accepts Tacview clients and spawns one independent session per connection

use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use super::client::AcmiSession;
use super::connection::Connection;
use crate::aggregator::Aggregator;

/// TCP server streaming ACMI telemetry to any number of clients.
///
/// All sessions read the one shared aggregator; each owns its own protocol
/// state. `shutdown` halts the accept loop and raises the shared flag the
/// sessions poll at the top of their send loop.
pub struct TacviewServer {
    addr: SocketAddr,
    shutdown_tx: Option<mpsc::Sender<()>>,
    running: Arc<AtomicBool>,
    clients: Arc<AtomicUsize>,
}

impl TacviewServer {
    /// Bind and start accepting connections.
    ///
    /// `running` is the process-wide shutdown flag, shared with every
    /// session this server spawns. A bind failure is returned to the
    /// caller; the process treats it as fatal.
    pub async fn start(
        addr: SocketAddr,
        aggregator: Arc<Aggregator>,
        app_name: String,
        running: Arc<AtomicBool>,
    ) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let clients = Arc::new(AtomicUsize::new(0));

        let accept_running = Arc::clone(&running);
        let accept_clients = Arc::clone(&clients);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    result = listener.accept() => {
                        match result {
                            Ok((stream, peer_addr)) => {
                                info!("Client connected: {}", peer_addr);
                                let aggregator = Arc::clone(&aggregator);
                                let running = Arc::clone(&accept_running);
                                let clients = Arc::clone(&accept_clients);
                                let app_name = app_name.clone();
                                tokio::spawn(async move {
                                    clients.fetch_add(1, Ordering::Relaxed);
                                    let connection = Connection::new(stream, peer_addr);
                                    let mut session = AcmiSession::new(
                                        connection,
                                        aggregator,
                                        app_name,
                                        running,
                                    );
                                    match session.run().await {
                                        Ok(reason) => {
                                            info!("Client connection closed: {} ({:?})", peer_addr, reason);
                                        }
                                        Err(e) => {
                                            info!("Client {} error: {}", peer_addr, e);
                                        }
                                    }
                                    clients.fetch_sub(1, Ordering::Relaxed);
                                });
                            }
                            Err(e) => error!("Accept error: {}", e),
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        debug!("Listener shutting down");
                        break;
                    }
                }
            }
        });

        Ok(TacviewServer {
            addr: local_addr,
            shutdown_tx: Some(shutdown_tx),
            running,
            clients,
        })
    }

    /// Get the address the server is listening on
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Number of currently connected clients
    pub fn client_count(&self) -> usize {
        self.clients.load(Ordering::Relaxed)
    }

    /// Handle on the live-client counter, for status reporting tasks
    pub fn client_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.clients)
    }

    /// Stop accepting and raise the shared shutdown flag.
    ///
    /// Active sessions observe the flag on their next tick; a session
    /// blocked in a socket write exits on its next failed I/O instead.
    pub async fn shutdown(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(()).await;
        }
    }
}

impl Drop for TacviewServer {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.try_send(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    async fn start_server(aggregator: Arc<Aggregator>) -> TacviewServer {
        TacviewServer::start(
            "127.0.0.1:0".parse().unwrap(),
            aggregator,
            "TestApp".to_string(),
            Arc::new(AtomicBool::new(true)),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_server_start() {
        let server = start_server(Arc::new(Aggregator::new())).await;
        assert!(server.addr().port() > 0);
        assert_eq!(server.client_count(), 0);
    }

    #[tokio::test]
    async fn test_bind_failure_is_reported() {
        let first = start_server(Arc::new(Aggregator::new())).await;
        let result = TacviewServer::start(
            first.addr(),
            Arc::new(Aggregator::new()),
            "TestApp".to_string(),
            Arc::new(AtomicBool::new(true)),
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_concurrent_clients_each_get_probe() {
        let aggregator = Arc::new(Aggregator::new());
        let server = start_server(aggregator).await;

        let mut clients = Vec::new();
        for _ in 0..3 {
            clients.push(TcpStream::connect(server.addr()).await.unwrap());
        }

        for client in &mut clients {
            let mut buf = vec![0u8; 256];
            let n = tokio::time::timeout(Duration::from_secs(2), client.read(&mut buf))
                .await
                .expect("no probe received")
                .unwrap();
            assert!(String::from_utf8_lossy(&buf[..n]).starts_with("XtraLib.Stream.0"));
        }
    }

    #[tokio::test]
    async fn test_shutdown_stops_accepts_and_sessions() {
        let aggregator = Arc::new(Aggregator::new());
        aggregator
            .update(crate::state::AircraftState::new("1".to_string()))
            .await;
        let mut server = start_server(aggregator).await;
        let addr = server.addr();

        // One streaming client
        let mut client = TcpStream::connect(addr).await.unwrap();
        let mut buf = vec![0u8; 256];
        let _ = tokio::time::timeout(Duration::from_secs(2), client.read(&mut buf))
            .await
            .expect("no probe")
            .unwrap();
        client.write_all(b"ok").await.unwrap();

        server.shutdown().await;

        // The session observes the flag and closes the socket: reads drain to EOF
        tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                match client.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(_) => {}
                }
            }
        })
        .await
        .expect("session did not close after shutdown");

        // New connections are no longer accepted (reads see EOF or refusal)
        if let Ok(mut late) = TcpStream::connect(addr).await {
            let got = tokio::time::timeout(Duration::from_secs(2), late.read(&mut buf)).await;
            assert!(matches!(got, Ok(Ok(0)) | Ok(Err(_)) | Err(_)));
        }
    }
}
