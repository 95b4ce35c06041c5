// Aircraft state records
// The latest-value unit flowing from producers through the aggregator to clients

use crate::attitude;
use crate::config::AircraftConfig;
use crate::constants::{MAX_LAT_DEG, MAX_LON_DEG, MIN_LAT_DEG, MIN_LON_DEG, MPS_TO_KNOTS};

/// The state of a single aircraft at one instant.
///
/// Keyed by `aircraft_id`; the aggregator keeps exactly one record per id,
/// replaced wholesale on every update.
#[derive(Debug, Clone, PartialEq)]
pub struct AircraftState {
    /// Stable object identifier, never changes after first insertion
    pub aircraft_id: String,

    // Position
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Altitude in meters
    pub altitude_m: f64,

    // Orientation
    /// Roll in degrees
    pub roll_deg: f64,
    /// Pitch in degrees
    pub pitch_deg: f64,
    /// Yaw in degrees, normalized to [0, 360)
    pub yaw_deg: f64,

    // Kinematics
    /// Ground speed in m/s
    pub ground_speed_mps: f64,

    // Status
    /// Vehicle armed?
    pub armed: bool,
    /// Flight mode reported by the producer
    pub mode: String,

    // Identity metadata
    pub pilot_name: String,
    pub aircraft_type: String,
    pub coalition: String,
    pub country: String,

    /// Unix time (seconds) of the most recent write, non-decreasing per id
    pub last_update: f64,
}

impl AircraftState {
    /// Create a zeroed record for the given id
    pub fn new(aircraft_id: String) -> Self {
        AircraftState {
            aircraft_id,
            latitude: 0.0,
            longitude: 0.0,
            altitude_m: 0.0,
            roll_deg: 0.0,
            pitch_deg: 0.0,
            yaw_deg: 0.0,
            ground_speed_mps: 0.0,
            armed: false,
            mode: "UNKNOWN".to_string(),
            pilot_name: "PILOT".to_string(),
            aircraft_type: "Generic".to_string(),
            coalition: "Neutrals".to_string(),
            country: "XX".to_string(),
            last_update: now_unix(),
        }
    }

    /// Create a zeroed record carrying the metadata of a configured aircraft
    pub fn from_config(config: &AircraftConfig) -> Self {
        AircraftState {
            pilot_name: config.pilot_name.clone(),
            aircraft_type: config.aircraft_type.clone(),
            coalition: config.coalition.clone(),
            country: config.country.clone(),
            ..AircraftState::new(config.id.clone())
        }
    }

    /// Ground speed in knots
    pub fn ground_speed_knots(&self) -> f64 {
        self.ground_speed_mps * MPS_TO_KNOTS
    }

    /// Validate and repair numeric fields before the record enters the map.
    ///
    /// Returns `None` if any numeric field is non-finite. Finite but
    /// out-of-range values are clamped: latitude/longitude to their domains,
    /// yaw wrapped into [0, 360), negative speed zeroed.
    pub fn sanitize(mut self) -> Option<Self> {
        let numeric = [
            self.latitude,
            self.longitude,
            self.altitude_m,
            self.roll_deg,
            self.pitch_deg,
            self.yaw_deg,
            self.ground_speed_mps,
        ];
        if numeric.iter().any(|v| !v.is_finite()) {
            return None;
        }

        self.latitude = self.latitude.clamp(MIN_LAT_DEG, MAX_LAT_DEG);
        self.longitude = self.longitude.clamp(MIN_LON_DEG, MAX_LON_DEG);
        self.yaw_deg = attitude::normalize_yaw(self.yaw_deg);
        self.ground_speed_mps = self.ground_speed_mps.max(0.0);

        Some(self)
    }
}

/// Current Unix time in seconds as f64
pub fn now_unix() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_defaults() {
        let state = AircraftState::new("1001".to_string());
        assert_eq!(state.aircraft_id, "1001");
        assert_eq!(state.mode, "UNKNOWN");
        assert!(!state.armed);
        assert_eq!(state.ground_speed_mps, 0.0);
    }

    #[test]
    fn test_from_config_carries_metadata() {
        let config = crate::config::parse_aircraft(
            r#"[{"id": "2002", "pilot_name": "ICEMAN", "aircraft_type": "F-14",
                 "coalition": "Allies", "country": "US"}]"#,
        )
        .unwrap()
        .remove(0);

        let state = AircraftState::from_config(&config);
        assert_eq!(state.aircraft_id, "2002");
        assert_eq!(state.pilot_name, "ICEMAN");
        assert_eq!(state.aircraft_type, "F-14");
        assert_eq!(state.coalition, "Allies");
        assert_eq!(state.country, "US");
    }

    #[test]
    fn test_ground_speed_knots() {
        let mut state = AircraftState::new("1".to_string());
        state.ground_speed_mps = 30.0;
        assert!((state.ground_speed_knots() - 58.3153).abs() < 1e-3);
    }

    #[test]
    fn test_sanitize_rejects_non_finite() {
        let mut state = AircraftState::new("1".to_string());
        state.latitude = f64::NAN;
        assert!(state.sanitize().is_none());

        let mut state = AircraftState::new("1".to_string());
        state.ground_speed_mps = f64::INFINITY;
        assert!(state.sanitize().is_none());
    }

    #[test]
    fn test_sanitize_clamps_out_of_range() {
        let mut state = AircraftState::new("1".to_string());
        state.latitude = 123.0;
        state.longitude = -500.0;
        state.yaw_deg = -90.0;
        state.ground_speed_mps = -5.0;

        let state = state.sanitize().unwrap();
        assert_eq!(state.latitude, 90.0);
        assert_eq!(state.longitude, -180.0);
        assert_eq!(state.yaw_deg, 270.0);
        assert_eq!(state.ground_speed_mps, 0.0);
    }

    #[test]
    fn test_sanitize_passes_valid_record() {
        let mut state = AircraftState::new("1".to_string());
        state.latitude = 37.5665;
        state.longitude = 126.978;
        state.altitude_m = 200.0;
        state.yaw_deg = 359.9;

        let state = state.sanitize().unwrap();
        assert_eq!(state.latitude, 37.5665);
        assert_eq!(state.yaw_deg, 359.9);
    }
}
