use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::collision::CollisionProfile;
use super::trace::{HitResult, SweepShape};
use super::CollisionQuery;
use crate::util::math::UP;
use crate::util::Rotator;

/// Upright capsule dimensions. `half_height` includes the hemispherical caps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Capsule {
    pub radius: f32,
    pub half_height: f32,
}

impl Capsule {
    pub const fn new(radius: f32, half_height: f32) -> Self {
        Self { radius, half_height }
    }

    pub fn shape(self) -> SweepShape {
        SweepShape::capsule(self.radius, self.half_height)
    }
}

/// Position, orientation and velocity of a character capsule.
///
/// The host simulation owns one per character and integrates it in ordinary
/// ground/air movement; the locomotion layer drives it directly while a
/// custom mode or slide is active.
#[derive(Debug, Clone)]
pub struct KinematicBody {
    location: Vec3,
    rotation: Rotator,
    velocity: Vec3,
    capsule: Capsule,
    default_capsule: Capsule,
    /// Normal of the plane movement is constrained to, if any
    plane_constraint: Option<Vec3>,
    pending_input: Vec3,
    crouched: bool,
}

impl KinematicBody {
    pub fn new(location: Vec3, capsule: Capsule) -> Self {
        Self {
            location,
            rotation: Rotator::ZERO,
            velocity: Vec3::ZERO,
            capsule,
            default_capsule: capsule,
            plane_constraint: None,
            pending_input: Vec3::ZERO,
            crouched: false,
        }
    }

    pub fn location(&self) -> Vec3 {
        self.location
    }

    /// Teleport without collision
    pub fn set_location(&mut self, location: Vec3) {
        self.location = location;
    }

    pub fn rotation(&self) -> Rotator {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: Rotator) {
        self.rotation = rotation;
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation.forward()
    }

    pub fn right(&self) -> Vec3 {
        self.rotation.right()
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = self.constrain(velocity);
    }

    /// Replace the velocity outright, ignoring the plane constraint
    pub fn launch(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    pub fn capsule(&self) -> Capsule {
        self.capsule
    }

    pub fn default_capsule(&self) -> Capsule {
        self.default_capsule
    }

    pub fn set_capsule(&mut self, capsule: Capsule) {
        self.capsule = capsule;
    }

    pub fn set_capsule_half_height(&mut self, half_height: f32) {
        self.capsule.half_height = half_height;
    }

    pub fn restore_default_capsule(&mut self) {
        self.capsule = self.default_capsule;
    }

    /// Lowest point of the capsule
    pub fn bottom(&self) -> Vec3 {
        self.location - UP * self.capsule.half_height
    }

    pub fn plane_constraint(&self) -> Option<Vec3> {
        self.plane_constraint
    }

    pub fn set_plane_constraint(&mut self, normal: Option<Vec3>) {
        self.plane_constraint = normal.map(|n| n.normalize_or_zero());
        self.velocity = self.constrain(self.velocity);
    }

    /// Queue movement input for the next handler that consumes it
    pub fn add_movement_input(&mut self, direction: Vec3, scale: f32) {
        self.pending_input += direction * scale;
    }

    pub fn pending_input(&self) -> Vec3 {
        self.pending_input
    }

    /// Take the accumulated input, clamped to unit length
    pub fn consume_input(&mut self) -> Vec3 {
        let input = self.pending_input.clamp_length_max(1.0);
        self.pending_input = Vec3::ZERO;
        input
    }

    pub fn is_crouched(&self) -> bool {
        self.crouched
    }

    /// Shrink to `half_height` keeping the capsule bottom in place
    pub fn crouch(&mut self, half_height: f32) {
        let delta = half_height - self.capsule.half_height;
        self.location += UP * delta;
        self.capsule.half_height = half_height;
        self.crouched = true;
    }

    /// Grow back to the default height if there is room. Returns false when blocked.
    pub fn uncrouch(&mut self, world: &dyn CollisionQuery) -> bool {
        if !self.crouched {
            return true;
        }

        let delta = self.default_capsule.half_height - self.capsule.half_height;
        let standing = self.location + UP * delta;
        let filter = CollisionProfile::Pawn.to_filter();
        if world.overlap_blocking(standing, self.default_capsule.shape(), &filter) {
            return false;
        }

        self.location = standing;
        self.capsule = self.default_capsule;
        self.crouched = false;
        true
    }

    /// Displace by `delta` and take `rotation`.
    ///
    /// With `sweep` the capsule stops at the first blocking surface and the hit
    /// is returned; without it the move is a teleport.
    pub fn move_by(
        &mut self,
        world: &dyn CollisionQuery,
        delta: Vec3,
        rotation: Rotator,
        sweep: bool,
    ) -> Option<HitResult> {
        let delta = self.constrain(delta);
        self.rotation = rotation;

        if !sweep {
            self.location += delta;
            return None;
        }

        let end = self.location + delta;
        let filter = CollisionProfile::Pawn.to_filter();
        match world.sweep(self.location, end, self.capsule.shape(), &filter) {
            Some(hit) => {
                self.location = hit.location;
                Some(hit)
            }
            None => {
                self.location = end;
                None
            }
        }
    }

    fn constrain(&self, v: Vec3) -> Vec3 {
        match self.plane_constraint {
            Some(normal) => v - normal * v.dot(normal),
            None => v,
        }
    }
}
