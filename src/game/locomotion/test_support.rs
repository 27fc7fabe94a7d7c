// Shared fixtures for locomotion tests

use std::cell::Cell;

use glam::Vec3;

use crate::engine::physics::{
    Capsule, ChannelMask, CollisionChannel, CollisionQuery, CollisionWorld, HitResult, KinematicBody,
    QueryFilter, SurfaceId, SweepShape,
};

pub const SCRIPTED_SURFACE: SurfaceId = SurfaceId(99);

/// Collision service that answers from a script instead of geometry
#[derive(Debug, Default)]
pub struct ScriptedWorld {
    forward_hit: Option<HitResult>,
    down_hit: Option<HitResult>,
    blocked_overlap: bool,
    sweeps: Cell<usize>,
    overlaps: Cell<usize>,
}

impl ScriptedWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capsule sweeps report this contact
    pub fn with_forward_hit(mut self, point: Vec3, normal: Vec3) -> Self {
        self.forward_hit = Some(HitResult::new(0.5, point, point, normal, SCRIPTED_SURFACE));
        self
    }

    /// Sphere sweeps report this contact
    pub fn with_down_hit(mut self, point: Vec3) -> Self {
        self.down_hit = Some(HitResult::new(0.5, point, point, Vec3::Z, SCRIPTED_SURFACE));
        self
    }

    pub fn with_blocked_overlap(mut self, blocked: bool) -> Self {
        self.blocked_overlap = blocked;
        self
    }

    pub fn sweep_count(&self) -> usize {
        self.sweeps.get()
    }

    pub fn overlap_count(&self) -> usize {
        self.overlaps.get()
    }
}

impl CollisionQuery for ScriptedWorld {
    fn sweep(&self, _start: Vec3, _end: Vec3, shape: SweepShape, _filter: &QueryFilter) -> Option<HitResult> {
        self.sweeps.set(self.sweeps.get() + 1);
        match shape {
            SweepShape::Capsule { .. } => self.forward_hit,
            SweepShape::Sphere { .. } => self.down_hit,
            SweepShape::Line => None,
        }
    }

    fn overlap_blocking(&self, _center: Vec3, _shape: SweepShape, _filter: &QueryFilter) -> bool {
        self.overlaps.set(self.overlaps.get() + 1);
        self.blocked_overlap
    }

    fn surface_location(&self, surface: SurfaceId) -> Option<Vec3> {
        (surface == SCRIPTED_SURFACE).then_some(Vec3::ZERO)
    }
}

/// Character standing on the origin with the reference capsule
pub fn standing_body() -> KinematicBody {
    KinematicBody::new(Vec3::new(0.0, 0.0, 96.0), Capsule::new(42.0, 96.0))
}

/// Large floor whose top face is z = 0
pub fn flat_world() -> CollisionWorld {
    let mut world = CollisionWorld::new();
    world.add_box(Vec3::new(0.0, 0.0, -50.0), Vec3::new(5000.0, 5000.0, 50.0), ChannelMask::WORLD);
    world
}

/// Floor plus a climbable block whose near face is at x = 100 and top at `top`
pub fn ledge_world(top: f32) -> (CollisionWorld, SurfaceId) {
    let mut world = flat_world();
    let block = world.add_box(
        Vec3::new(200.0, 0.0, top * 0.5),
        Vec3::new(100.0, 300.0, top * 0.5),
        ChannelMask::WORLD.with(CollisionChannel::Climbable),
    );
    (world, block)
}

/// Floor plus a runnable wall on the character's left (wall face at y = 100)
pub fn wall_world() -> (CollisionWorld, SurfaceId) {
    let mut world = flat_world();
    let wall = world.add_box(
        Vec3::new(0.0, 150.0, 400.0),
        Vec3::new(3000.0, 50.0, 400.0),
        ChannelMask::WORLD.with(CollisionChannel::WallRunnable),
    );
    (world, wall)
}
