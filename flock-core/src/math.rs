//! Geometric primitives shared by both update policies.
//!
//! Angles are in degrees. Headings live in [0, 360) and signed differences
//! in [-180, 180].

use crate::vector::{Point, PolarVelocity, Vector2D};

pub const RAD_TO_DEG: f64 = 180.0 / core::f64::consts::PI;
pub const DEG_TO_RAD: f64 = core::f64::consts::PI / 180.0;

/// Speeds below this are treated as zero when converting to polar form.
pub const ZERO_SPEED_EPSILON: f64 = 1e-10;

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
    a.distance(&b)
}

/// Maps any angle into [0, 360). Non-finite input maps to 0.
pub fn normalize_angle(angle: f64) -> f64 {
    if !angle.is_finite() {
        return 0.0;
    }
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid of a tiny negative value rounds up to exactly 360
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Signed minimal rotation from `b` to `a`, in [-180, 180].
pub fn angle_difference(a: f64, b: f64) -> f64 {
    let diff = normalize_angle(a - b);
    if diff > 180.0 {
        diff - 360.0
    } else {
        diff
    }
}

/// Sums two polar velocities through their Cartesian forms.
pub fn compose_velocities(v1: PolarVelocity, v2: PolarVelocity) -> PolarVelocity {
    PolarVelocity::from_vector(v1.to_vector() + v2.to_vector())
}

/// Clamps the length of `v` to `max`, preserving direction.
pub fn limit_magnitude(v: Vector2D, max: f64) -> Vector2D {
    v.limit(max)
}

/// Caps `desired` at `max_speed` and limits its heading change relative to
/// `current` to at most `max_turn_angle` degrees, turning the short way.
pub fn limit_velocity(
    current: PolarVelocity,
    desired: PolarVelocity,
    max_speed: f64,
    max_turn_angle: f64,
) -> PolarVelocity {
    let mut limited = desired;
    if limited.speed > max_speed {
        limited.speed = max_speed;
    }

    let turn = angle_difference(limited.angle, current.angle);
    if turn.abs() > max_turn_angle {
        limited.angle = if turn > 0.0 {
            normalize_angle(current.angle + max_turn_angle)
        } else {
            normalize_angle(current.angle - max_turn_angle)
        };
    }

    limited
}

/// Wraps a coordinate onto a torus of the given extent.
pub fn wrap_coordinate(value: f64, extent: f64) -> f64 {
    let wrapped = value.rem_euclid(extent);
    if wrapped >= extent {
        0.0
    } else {
        wrapped
    }
}
