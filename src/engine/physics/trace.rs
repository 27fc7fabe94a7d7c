// Sweep shapes and hit results

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Identifies a collidable surface and the object that owns it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SurfaceId(pub u32);

/// Shape swept along a trace
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SweepShape {
    /// Infinitely thin ray
    Line,
    Sphere { radius: f32 },
    /// Upright capsule. `half_height` includes the hemispherical caps.
    Capsule { radius: f32, half_height: f32 },
}

impl SweepShape {
    pub fn capsule(radius: f32, half_height: f32) -> Self {
        SweepShape::Capsule {
            radius,
            half_height: half_height.max(radius),
        }
    }

    /// Smallest distance from the shape center to its boundary
    pub fn min_extent(&self) -> f32 {
        match *self {
            SweepShape::Line => 0.0,
            SweepShape::Sphere { radius } => radius,
            SweepShape::Capsule { radius, .. } => radius,
        }
    }
}

/// First blocking hit of a sweep
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitResult {
    /// Fraction of the trace travelled before the hit, in [0, 1]
    pub time: f32,
    /// Shape center at the time of impact
    pub location: Vec3,
    /// Contact point on the hit surface
    pub impact_point: Vec3,
    /// Surface normal at the contact point, facing the swept shape
    pub impact_normal: Vec3,
    pub surface: SurfaceId,
}

impl HitResult {
    pub fn new(time: f32, location: Vec3, impact_point: Vec3, impact_normal: Vec3, surface: SurfaceId) -> Self {
        Self {
            time,
            location,
            impact_point,
            impact_normal,
            surface,
        }
    }
}
