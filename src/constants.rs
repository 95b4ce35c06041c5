// Shared constants: unit conversions and protocol timing

/// m/s to knots (1 kt = 1852 m / 3600 s)
pub const MPS_TO_KNOTS: f64 = 3600.0 / 1852.0;

/// Knots to m/s
pub const KNOTS_TO_MPS: f64 = 1852.0 / 3600.0;

/// Handshake read timeout in seconds; a client that stays silent longer is dropped
pub const HANDSHAKE_TIMEOUT_SECS: f64 = 5.0;

/// Frame interval in milliseconds (10 Hz stream rate)
pub const FRAME_INTERVAL_MS: u64 = 100;

/// Ingress queue capacity; producers drop updates once this is full
pub const INGRESS_CAPACITY: usize = 100;

/// Latitude bounds in degrees
pub const MAX_LAT_DEG: f64 = 90.0;
pub const MIN_LAT_DEG: f64 = -90.0;

/// Longitude bounds in degrees
pub const MAX_LON_DEG: f64 = 180.0;
pub const MIN_LON_DEG: f64 = -180.0;
