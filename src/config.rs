use clap::Parser;
use serde::Deserialize;
use std::io;

/// Tacview Telemetry Bridge Configuration
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Host address the Tacview listener binds to.
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// TCP port the Tacview listener binds to.
    #[arg(long, default_value_t = 42674)]
    pub port: u16,

    /// Path to the aircraft descriptor file (JSON array).
    #[arg(long, value_name = "FILE", default_value = "aircraft.json")]
    pub aircraft_config: String,

    /// Application name advertised in the handshake probe.
    #[arg(long, default_value = "PX4-Multi-Bridge")]
    pub app_name: String,

    /// Status logging interval in seconds, <= 0 to disable
    #[arg(long, default_value_t = 15)]
    pub status_interval: i64,

    /// Verbose logging (DEBUG level)
    #[arg(long, short, default_value_t = false)]
    pub verbose: bool,
}

/// One tracked aircraft as declared in the descriptor file.
///
/// `id` is the stable object identifier used on the wire; `source` tags the
/// producer feed (topic namespace, sim slot, ...) the telemetry comes from.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AircraftConfig {
    pub id: String,
    #[serde(default)]
    pub source: String,
    #[serde(default = "default_pilot")]
    pub pilot_name: String,
    #[serde(default = "default_type")]
    pub aircraft_type: String,
    #[serde(default = "default_coalition")]
    pub coalition: String,
    #[serde(default = "default_country")]
    pub country: String,
}

fn default_pilot() -> String {
    "PILOT".to_string()
}

fn default_type() -> String {
    "Generic".to_string()
}

fn default_coalition() -> String {
    "Neutrals".to_string()
}

fn default_country() -> String {
    "XX".to_string()
}

/// Load and validate the aircraft descriptor file.
///
/// The file must contain a non-empty JSON array; every descriptor needs a
/// non-empty `id`, unique across the list. Anything else is a startup error.
pub fn load_aircraft(path: &str) -> io::Result<Vec<AircraftConfig>> {
    let text = std::fs::read_to_string(path)?;
    parse_aircraft(&text)
}

/// Parse and validate aircraft descriptors from JSON text.
pub fn parse_aircraft(text: &str) -> io::Result<Vec<AircraftConfig>> {
    let aircraft: Vec<AircraftConfig> = serde_json::from_str(text)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    if aircraft.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "no aircraft configured",
        ));
    }

    let mut seen = std::collections::HashSet::new();
    for ac in &aircraft {
        if ac.id.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "aircraft descriptor with empty id",
            ));
        }
        if !seen.insert(ac.id.as_str()) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("duplicate aircraft id: {}", ac.id),
            ));
        }
    }

    Ok(aircraft)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_descriptor() {
        let json = r#"[
            {"id": "1001", "source": "uav0", "pilot_name": "MAVERICK",
             "aircraft_type": "F-18", "coalition": "Allies", "country": "US"}
        ]"#;
        let aircraft = parse_aircraft(json).unwrap();
        assert_eq!(aircraft.len(), 1);
        assert_eq!(aircraft[0].id, "1001");
        assert_eq!(aircraft[0].source, "uav0");
        assert_eq!(aircraft[0].pilot_name, "MAVERICK");
        assert_eq!(aircraft[0].coalition, "Allies");
    }

    #[test]
    fn test_parse_applies_defaults() {
        let aircraft = parse_aircraft(r#"[{"id": "42"}]"#).unwrap();
        assert_eq!(aircraft[0].pilot_name, "PILOT");
        assert_eq!(aircraft[0].aircraft_type, "Generic");
        assert_eq!(aircraft[0].coalition, "Neutrals");
        assert_eq!(aircraft[0].country, "XX");
        assert_eq!(aircraft[0].source, "");
    }

    #[test]
    fn test_empty_list_rejected() {
        assert!(parse_aircraft("[]").is_err());
    }

    #[test]
    fn test_empty_id_rejected() {
        assert!(parse_aircraft(r#"[{"id": ""}]"#).is_err());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let json = r#"[{"id": "1001"}, {"id": "1001"}]"#;
        assert!(parse_aircraft(json).is_err());
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(parse_aircraft("{not json").is_err());
    }
}
