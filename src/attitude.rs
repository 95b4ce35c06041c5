// Attitude module - orientation and kinematics conversions
//
// Provides conversions from producer-side measurements to the degree-based
// representation carried in aircraft state records:
// - unit quaternion (w, x, y, z) to Euler roll/pitch/yaw
// - yaw normalization into [0, 360)
// - planar ground speed from velocity components

use std::f64::consts::PI;

/// Radians to degrees conversion factor
const RTOD: f64 = 180.0 / PI;

/// Converts a unit quaternion to Euler angles in degrees.
///
/// # Arguments
/// * `w`, `x`, `y`, `z` - quaternion components, scalar part first
///
/// # Returns
/// (roll, pitch, yaw) in degrees; yaw is normalized to [0, 360)
pub fn quat_to_euler_deg(w: f64, x: f64, y: f64, z: f64) -> (f64, f64, f64) {
    let sinr_cosp = 2.0 * (w * x + y * z);
    let cosr_cosp = 1.0 - 2.0 * (x * x + y * y);
    let roll = sinr_cosp.atan2(cosr_cosp) * RTOD;

    // asin is undefined past the poles; saturate at +/-90 degrees
    let sinp = 2.0 * (w * y - z * x);
    let pitch = if sinp.abs() >= 1.0 {
        (PI / 2.0).copysign(sinp) * RTOD
    } else {
        sinp.asin() * RTOD
    };

    let siny_cosp = 2.0 * (w * z + x * y);
    let cosy_cosp = 1.0 - 2.0 * (y * y + z * z);
    let yaw = normalize_yaw(siny_cosp.atan2(cosy_cosp) * RTOD);

    (roll, pitch, yaw)
}

/// Wraps a heading in degrees into [0, 360)
#[inline]
pub fn normalize_yaw(yaw_deg: f64) -> f64 {
    yaw_deg.rem_euclid(360.0)
}

/// Planar ground speed in m/s from north/east velocity components in m/s
#[inline]
pub fn ground_speed(vx: f64, vy: f64) -> f64 {
    vx.hypot(vy)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_identity_quaternion() {
        let (roll, pitch, yaw) = quat_to_euler_deg(1.0, 0.0, 0.0, 0.0);
        assert!(roll.abs() < EPSILON);
        assert!(pitch.abs() < EPSILON);
        assert!(yaw.abs() < EPSILON);
    }

    #[test]
    fn test_negative_yaw_wraps() {
        // 90 degree rotation about -Z: yaw of -90 must come out as 270
        let half = (-90.0f64 / 2.0).to_radians();
        let (_, _, yaw) = quat_to_euler_deg(half.cos(), 0.0, 0.0, half.sin());
        assert!((yaw - 270.0).abs() < 1e-6, "yaw: {}", yaw);
    }

    #[test]
    fn test_pitch_saturates_at_pole() {
        // 90 degree rotation about Y puts sin(pitch) at exactly 1
        let half = (90.0f64 / 2.0).to_radians();
        let (_, pitch, _) = quat_to_euler_deg(half.cos(), 0.0, half.sin(), 0.0);
        assert!((pitch - 90.0).abs() < 1e-6, "pitch: {}", pitch);
    }

    #[test]
    fn test_roll_only_rotation() {
        let half = (30.0f64 / 2.0).to_radians();
        let (roll, pitch, yaw) = quat_to_euler_deg(half.cos(), half.sin(), 0.0, 0.0);
        assert!((roll - 30.0).abs() < 1e-6, "roll: {}", roll);
        assert!(pitch.abs() < 1e-6);
        assert!(yaw.abs() < 1e-6);
    }

    #[test]
    fn test_normalize_yaw_range() {
        assert!((normalize_yaw(-90.0) - 270.0).abs() < EPSILON);
        assert!(normalize_yaw(360.0).abs() < EPSILON);
        assert!((normalize_yaw(725.0) - 5.0).abs() < EPSILON);
        for deg in [-720.0, -359.9, -0.0, 0.0, 179.9, 359.999, 1234.5] {
            let n = normalize_yaw(deg);
            assert!((0.0..360.0).contains(&n), "{} -> {}", deg, n);
        }
    }

    #[test]
    fn test_ground_speed() {
        assert!((ground_speed(3.0, 4.0) - 5.0).abs() < EPSILON);
        assert!(ground_speed(0.0, 0.0).abs() < EPSILON);
        assert!((ground_speed(-3.0, 4.0) - 5.0).abs() < EPSILON);
    }
}
