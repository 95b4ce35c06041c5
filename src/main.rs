// Tacview Telemetry Bridge - Main Entry Point

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::signal;
use tracing::{error, info};

use tacview_bridge::aggregator::Aggregator;
use tacview_bridge::config::{self, Config};
use tacview_bridge::net::TacviewServer;
use tacview_bridge::{ingress, simulation};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let config = Config::parse();

    // Initialize logging
    init_logging(config.verbose);

    info!("Starting Tacview telemetry bridge");

    // Load and validate the tracked-aircraft list
    let aircraft = config::load_aircraft(&config.aircraft_config).map_err(|e| {
        error!("Failed to load aircraft config {}: {}", config.aircraft_config, e);
        e
    })?;
    info!("Tracking {} configured aircraft", aircraft.len());

    // Shared state: one aggregator, one shutdown flag, passed by handle
    let aggregator = Arc::new(Aggregator::new());
    let running = Arc::new(AtomicBool::new(true));

    // Ingress queue: producers push, one drain task feeds the aggregator
    let (sender, rx) = ingress::channel();
    let drain_aggregator = Arc::clone(&aggregator);
    tokio::spawn(async move {
        ingress::run_drain(rx, drain_aggregator).await;
    });

    // Telemetry producer (synthetic flight patterns for every aircraft)
    let producer_running = Arc::clone(&running);
    tokio::spawn(async move {
        simulation::run(aircraft, sender, producer_running).await;
    });

    // Client listener; a bind failure is fatal
    let addr: std::net::SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let mut server = TacviewServer::start(
        addr,
        Arc::clone(&aggregator),
        config.app_name.clone(),
        Arc::clone(&running),
    )
    .await
    .map_err(|e| {
        error!("Failed to bind Tacview listener on {}: {}", addr, e);
        e
    })?;
    info!("Tacview server listening on {}", server.addr());

    // Periodic status logging
    if config.status_interval > 0 {
        let status_aggregator = Arc::clone(&aggregator);
        let clients = server.client_counter();
        let interval_secs = config.status_interval as u64;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            interval.tick().await; // skip the immediate first tick
            loop {
                interval.tick().await;
                info!(
                    "Status: {} aircraft tracked, {} clients connected",
                    status_aggregator.len().await,
                    clients.load(Ordering::Relaxed)
                );
            }
        });
    }

    info!("Server ready");

    // Wait for shutdown signal (Ctrl+C)
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Received shutdown signal (Ctrl+C)");
        }
        Err(err) => {
            error!("Unable to listen for shutdown signal: {}", err);
            return Err(err.into());
        }
    }

    // Graceful shutdown: stop accepts, raise the flag for sessions and producer
    info!("Shutting down...");
    server.shutdown().await;

    info!(
        "Server stopped. Final aircraft count: {}",
        aggregator.len().await
    );

    Ok(())
}

/// Initialize logging subsystem
fn init_logging(verbose: bool) {
    use tracing_subscriber::fmt::format::FmtSpan;

    let subscriber = tracing_subscriber::fmt()
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true)
        .with_span_events(if verbose {
            FmtSpan::ENTER | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        });

    if verbose {
        subscriber.with_max_level(tracing::Level::DEBUG).init();
        info!("Verbose logging enabled (DEBUG level)");
    } else {
        subscriber.with_max_level(tracing::Level::INFO).init();
    }
}
