// Collision queries and kinematic bodies
//
// The locomotion layer never integrates rigid bodies. It asks the host for
// sweeps and overlaps through `CollisionQuery` and moves a `KinematicBody`
// directly. `CollisionWorld` is the parry3d-backed reference implementation.

pub mod body;
mod collision;
mod trace;
mod world;

use glam::Vec3;

pub use body::{Capsule, KinematicBody};
pub use collision::{ChannelMask, CollisionChannel, CollisionProfile, ObjectType, QueryFilter};
pub use trace::{HitResult, SurfaceId, SweepShape};
pub use world::{CollisionWorld, Surface};

/// Collision sweep service supplied by the host simulation
pub trait CollisionQuery {
    /// Sweep `shape` from `start` to `end`, returning the first blocking hit
    fn sweep(&self, start: Vec3, end: Vec3, shape: SweepShape, filter: &QueryFilter) -> Option<HitResult>;

    /// True if `shape` placed at `center` overlaps any blocking surface
    fn overlap_blocking(&self, center: Vec3, shape: SweepShape, filter: &QueryFilter) -> bool;

    /// Current world location of the object owning `surface`, if it still exists
    fn surface_location(&self, surface: SurfaceId) -> Option<Vec3>;

    fn line_trace(&self, start: Vec3, end: Vec3, filter: &QueryFilter) -> Option<HitResult> {
        self.sweep(start, end, SweepShape::Line, filter)
    }
}
