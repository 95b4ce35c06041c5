// ACMI real-time protocol encoding
//
// Pure text encoding for the Tacview real-time telemetry dialect: the
// handshake probe, the one-time session header, and per-tick frames built
// from an aggregator snapshot plus the session's known-object set.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use crate::state::AircraftState;

/// Stream-layer protocol tag sent in the probe
pub const STREAM_PROTOCOL: &str = "XtraLib.Stream.0";

/// Telemetry-layer protocol tag sent in the probe
pub const TELEMETRY_PROTOCOL: &str = "Tacview.RealTimeTelemetry.0";

/// ACMI file type tag in the session header
pub const FILE_TYPE: &str = "text/acmi/tacview";

/// ACMI file version tag in the session header
pub const FILE_VERSION: &str = "2.2";

/// The server probe sent immediately on accept, NUL-terminated.
pub fn handshake_probe(app_name: &str) -> Vec<u8> {
    let mut probe =
        format!("{}\n{}\n{}\n", STREAM_PROTOCOL, TELEMETRY_PROTOCOL, app_name).into_bytes();
    probe.push(0);
    probe
}

/// The one-time session header.
///
/// `reference_time` is fixed at session start and never refreshed.
pub fn session_header(reference_time: DateTime<Utc>) -> String {
    format!(
        "FileType={}\r\nFileVersion={}\r\n0,ReferenceTime={}\r\n",
        FILE_TYPE,
        FILE_VERSION,
        reference_time.format("%Y-%m-%dT%H:%M:%SZ")
    )
}

/// Encode one frame from a snapshot against a session's known-object set.
///
/// Aircraft are emitted in ascending id order. The first time a given id is
/// seen by this session a definition line carrying its metadata precedes
/// the update line, and the id is added to `known`. `offset_secs` is the
/// session-local stream clock.
pub fn encode_frame(
    snapshot: &HashMap<String, AircraftState>,
    known: &mut HashSet<String>,
    offset_secs: f64,
) -> String {
    let mut frame = format!("#{:.2}\r\n", offset_secs);

    let mut ids: Vec<&String> = snapshot.keys().collect();
    ids.sort();

    for id in ids {
        let state = &snapshot[id];

        if !known.contains(id) {
            frame.push_str(&format!(
                "{},T={:.6}|{:.6}|{:.1},Name={},Pilot={},Type=Air+FixedWing,Coalition={},Country={}\r\n",
                state.aircraft_id,
                state.longitude,
                state.latitude,
                state.altitude_m,
                state.aircraft_type,
                state.pilot_name,
                state.coalition,
                state.country,
            ));
            known.insert(id.clone());
        }

        frame.push_str(&format!(
            "{},T={:.6}|{:.6}|{:.1}|{:.1}|{:.1}|{:.1},Speed={:.1}\r\n",
            state.aircraft_id,
            state.longitude,
            state.latitude,
            state.altitude_m,
            state.roll_deg,
            state.pitch_deg,
            state.yaw_deg,
            state.ground_speed_knots(),
        ));
    }

    frame
}
