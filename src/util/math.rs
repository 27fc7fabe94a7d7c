// Math utilities and helper functions

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// World up axis
pub const UP: Vec3 = Vec3::Z;

/// Clamp a value between min and max
pub fn clamp<T: PartialOrd>(value: T, min: T, max: T) -> T {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Linear interpolation
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Map `value` from `input` range to `output` range, clamping to the output range.
/// A degenerate input range maps everything to the output start or end.
pub fn map_range_clamped(value: f32, input: (f32, f32), output: (f32, f32)) -> f32 {
    let span = input.1 - input.0;
    if span.abs() <= f32::EPSILON {
        return if value >= input.1 { output.1 } else { output.0 };
    }
    let alpha = clamp((value - input.0) / span, 0.0, 1.0);
    lerp(output.0, output.1, alpha)
}

/// True if every component of `v` is within `tolerance` of zero
pub fn is_nearly_zero(v: Vec3, tolerance: f32) -> bool {
    v.x.abs() <= tolerance && v.y.abs() <= tolerance && v.z.abs() <= tolerance
}

/// Project `v` onto `onto`. Returns zero for a zero-length axis.
pub fn project_onto(v: Vec3, onto: Vec3) -> Vec3 {
    let len_sq = onto.length_squared();
    if len_sq <= f32::EPSILON {
        return Vec3::ZERO;
    }
    onto * (v.dot(onto) / len_sq)
}

/// Wrap an angle in degrees to [0, 360)
pub fn clamp_axis(angle: f32) -> f32 {
    let wrapped = angle % 360.0;
    if wrapped < 0.0 {
        wrapped + 360.0
    } else {
        wrapped
    }
}

/// Wrap an angle in degrees to (-180, 180]
pub fn normalize_axis(angle: f32) -> f32 {
    let wrapped = clamp_axis(angle);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Turn `current` toward `desired` by at most `delta` degrees along the shortest arc
pub fn fixed_turn(current: f32, desired: f32, delta: f32) -> f32 {
    if delta <= 0.0 {
        return clamp_axis(current);
    }
    if delta >= 360.0 {
        return clamp_axis(desired);
    }

    let current = clamp_axis(current);
    let desired = clamp_axis(desired);
    let mut result = current;

    if current > desired {
        if current - desired < 180.0 {
            result -= (current - desired).min(delta);
        } else {
            result += (desired + 360.0 - current).min(delta);
        }
    } else if desired - current < 180.0 {
        result += (desired - current).min(delta);
    } else {
        result -= (current + 360.0 - desired).min(delta);
    }

    clamp_axis(result)
}

/// Orientation as pitch/yaw/roll in degrees.
///
/// Yaw turns about +Z, positive pitch raises the forward vector toward +Z.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rotator {
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
}

impl Rotator {
    pub const ZERO: Rotator = Rotator::new(0.0, 0.0, 0.0);

    pub const fn new(pitch: f32, yaw: f32, roll: f32) -> Self {
        Self { pitch, yaw, roll }
    }

    /// Orientation whose forward vector points along `direction` (roll is zero)
    pub fn from_direction(direction: Vec3) -> Self {
        let yaw = direction.y.atan2(direction.x).to_degrees();
        let horizontal = (direction.x * direction.x + direction.y * direction.y).sqrt();
        let pitch = direction.z.atan2(horizontal).to_degrees();
        Self::new(pitch, yaw, 0.0)
    }

    pub fn to_quat(self) -> Quat {
        Quat::from_rotation_z(self.yaw.to_radians())
            * Quat::from_rotation_y(-self.pitch.to_radians())
            * Quat::from_rotation_x(self.roll.to_radians())
    }

    pub fn forward(self) -> Vec3 {
        self.to_quat() * Vec3::X
    }

    pub fn right(self) -> Vec3 {
        self.to_quat() * Vec3::NEG_Y
    }

    pub fn up(self) -> Vec3 {
        self.to_quat() * Vec3::Z
    }

    /// Same orientation with every axis wrapped to (-180, 180]
    pub fn normalized(self) -> Self {
        Self::new(
            normalize_axis(self.pitch),
            normalize_axis(self.yaw),
            normalize_axis(self.roll),
        )
    }

    /// Copy with pitch flattened to zero
    pub fn flattened(self) -> Self {
        Self::new(0.0, self.yaw, self.roll)
    }

    /// Per-axis equality within `tolerance` degrees
    pub fn equals(self, other: Rotator, tolerance: f32) -> bool {
        normalize_axis(self.pitch - other.pitch).abs() <= tolerance
            && normalize_axis(self.yaw - other.yaw).abs() <= tolerance
            && normalize_axis(self.roll - other.roll).abs() <= tolerance
    }

    /// Interpolate along the shortest arc of each axis
    pub fn lerp(self, target: Rotator, alpha: f32) -> Self {
        let delta = Rotator::new(
            target.pitch - self.pitch,
            target.yaw - self.yaw,
            target.roll - self.roll,
        )
        .normalized();
        Self::new(
            self.pitch + delta.pitch * alpha,
            self.yaw + delta.yaw * alpha,
            self.roll + delta.roll * alpha,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(5.0, 0.0, 10.0), 5.0);
        assert_eq!(clamp(-5.0, 0.0, 10.0), 0.0);
        assert_eq!(clamp(15.0, 0.0, 10.0), 10.0);
    }

    #[test]
    fn test_lerp() {
        assert_eq!(lerp(0.0, 10.0, 0.0), 0.0);
        assert_eq!(lerp(0.0, 10.0, 1.0), 10.0);
        assert_eq!(lerp(0.0, 10.0, 0.5), 5.0);
    }

    #[test]
    fn test_map_range_clamped() {
        // Mantle heights map onto animation start times in reverse
        assert_relative_eq!(map_range_clamped(150.0, (100.0, 200.0), (0.5, 0.0)), 0.25);
        assert_relative_eq!(map_range_clamped(50.0, (100.0, 200.0), (0.5, 0.0)), 0.5);
        assert_relative_eq!(map_range_clamped(250.0, (100.0, 200.0), (0.5, 0.0)), 0.0);
        assert_relative_eq!(map_range_clamped(3.0, (1.0, 1.0), (0.0, 8.0)), 8.0);
    }

    #[test]
    fn test_is_nearly_zero_is_per_component() {
        assert!(is_nearly_zero(Vec3::new(0.5, -0.6, 0.69), 0.7));
        assert!(!is_nearly_zero(Vec3::new(0.0, 0.0, 0.71), 0.7));
    }

    #[test]
    fn test_project_onto() {
        let projected = project_onto(Vec3::new(3.0, 4.0, 5.0), Vec3::new(0.0, 0.0, 2.0));
        assert_relative_eq!(projected.z, 5.0);
        assert_eq!(project_onto(Vec3::ONE, Vec3::ZERO), Vec3::ZERO);
    }

    #[test]
    fn test_axis_wrapping() {
        assert_relative_eq!(clamp_axis(-90.0), 270.0);
        assert_relative_eq!(clamp_axis(720.0), 0.0);
        assert_relative_eq!(normalize_axis(270.0), -90.0);
        assert_relative_eq!(normalize_axis(180.0), 180.0);
    }

    #[test]
    fn test_fixed_turn_takes_shortest_arc() {
        assert_relative_eq!(fixed_turn(350.0, 10.0, 5.0), 355.0);
        assert_relative_eq!(fixed_turn(10.0, 350.0, 5.0), 5.0);
        assert_relative_eq!(fixed_turn(0.0, 90.0, 30.0), 30.0);
        // Never overshoots
        assert_relative_eq!(fixed_turn(0.0, 20.0, 30.0), 20.0);
        assert_relative_eq!(fixed_turn(45.0, 90.0, 400.0), 90.0);
    }

    #[test]
    fn test_rotator_vectors() {
        let facing_y = Rotator::new(0.0, 90.0, 0.0);
        let forward = facing_y.forward();
        assert_relative_eq!(forward.y, 1.0, epsilon = 1e-5);
        // Right of +Y (with +Z up) is +X
        let right = facing_y.right();
        assert_relative_eq!(right.x, 1.0, epsilon = 1e-5);

        let pitched = Rotator::new(90.0, 0.0, 0.0);
        assert_relative_eq!(pitched.forward().z, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_rotator_from_direction() {
        let r = Rotator::from_direction(Vec3::new(-1.0, 0.0, 0.0));
        assert_relative_eq!(r.yaw.abs(), 180.0, epsilon = 1e-4);
        assert_relative_eq!(r.pitch, 0.0);

        let r = Rotator::from_direction(Vec3::new(1.0, 0.0, 1.0));
        assert_relative_eq!(r.pitch, 45.0, epsilon = 1e-4);
    }

    #[test]
    fn test_rotator_equals_wraps() {
        let a = Rotator::new(0.0, 179.9995, 0.0);
        let b = Rotator::new(0.0, -179.9995, 0.0);
        assert!(a.equals(b, 1e-2));
        assert!(!a.equals(Rotator::ZERO, 1e-2));
    }

    #[test]
    fn test_rotator_lerp_shortest_path() {
        let from = Rotator::new(0.0, 170.0, 0.0);
        let to = Rotator::new(0.0, -170.0, 0.0);
        let mid = from.lerp(to, 0.5);
        assert_relative_eq!(normalize_axis(mid.yaw).abs(), 180.0, epsilon = 1e-3);
    }
}
