// Synthetic telemetry producer
// Flies every configured aircraft on a deterministic orbit when no live
// producer feed is attached

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::info;

use crate::attitude;
use crate::config::AircraftConfig;
use crate::constants::FRAME_INTERVAL_MS;
use crate::ingress::IngressSender;
use crate::state::AircraftState;

/// Advance one aircraft along its orbit at `elapsed` seconds.
///
/// Each aircraft gets a distinct angular rate and radius derived from its
/// index so the tracks never overlap.
pub fn advance(base: &AircraftState, index: usize, elapsed: f64) -> AircraftState {
    let i = index as f64;
    let angle = elapsed * (0.1 + i * 0.02);
    let radius = 1.0 + i * 0.1;

    let mut state = base.clone();
    state.latitude = 37.5665 + radius * angle.cos();
    state.longitude = 126.9780 + radius * angle.sin();
    state.altitude_m = 200.0 + i * 50.0 + 50.0 * (elapsed * 0.1 + i).sin();

    state.yaw_deg = attitude::normalize_yaw(angle.to_degrees());
    state.roll_deg = -20.0 * angle.cos();
    state.pitch_deg = 5.0 * angle.sin();

    state.ground_speed_mps = 30.0 + 10.0 * (elapsed * 0.2 + i).sin();
    state.armed = true;
    state.mode = "AUTO".to_string();

    state
}

/// Run the simulated producer until the shared shutdown flag drops.
///
/// Pushes one record per aircraft every 100 ms through the ingress queue,
/// dropping on a full queue rather than slowing down.
pub async fn run(configs: Vec<AircraftConfig>, sender: IngressSender, running: Arc<AtomicBool>) {
    info!("Simulating telemetry for {} aircraft", configs.len());

    let bases: Vec<AircraftState> = configs.iter().map(AircraftState::from_config).collect();
    let start = Instant::now();

    let mut interval = tokio::time::interval(Duration::from_millis(FRAME_INTERVAL_MS));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    while running.load(Ordering::Relaxed) {
        interval.tick().await;
        let elapsed = start.elapsed().as_secs_f64();
        for (i, base) in bases.iter().enumerate() {
            sender.send(advance(base, i, elapsed));
        }
    }
    info!("Simulation stopped");
}
