// Ledge detection for mantling
//
// Three probes, all of which must pass:
// 1. a capsule swept forward through the climbable height band
// 2. a sphere swept down onto the top of whatever was hit
// 3. a standing-size capsule overlap at the landing spot

use glam::Vec3;

use super::config::LedgeDetectionSettings;
use crate::engine::physics::{
    CollisionChannel, CollisionProfile, CollisionQuery, KinematicBody, QueryFilter, SurfaceId, SweepShape,
};
use crate::util::math::UP;
use crate::util::Rotator;

/// A mantle target found by [`LedgeProbe::detect`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LedgeDescription {
    /// Landing capsule center relative to the surface owner's location
    pub location: Vec3,
    /// Landing rotation, facing into the ledge
    pub rotation: Rotator,
    /// Normal of the wall face, pointing back at the character
    pub ledge_normal: Vec3,
    /// Where the downward probe touched the top of the ledge
    pub impact_point: Vec3,
    pub surface: SurfaceId,
}

#[derive(Debug, Clone, Default)]
pub struct LedgeProbe {
    settings: LedgeDetectionSettings,
}

impl LedgeProbe {
    pub fn new(settings: LedgeDetectionSettings) -> Self {
        Self { settings }
    }

    pub fn detect(&self, body: &KinematicBody, world: &dyn CollisionQuery) -> Option<LedgeDescription> {
        let s = &self.settings;
        let capsule = body.capsule();
        let climbable = QueryFilter::channel(CollisionChannel::Climbable);
        let bottom = body.location() - UP * (capsule.half_height - s.bottom_z_offset);

        // Forward: capsule covering the climbable band
        let band_half_height = (s.max_ledge_height - s.min_ledge_height) * 0.5;
        let forward_start = bottom + UP * (s.min_ledge_height + band_half_height);
        let forward_end = forward_start + body.forward() * s.forward_check_distance;
        let forward_shape = SweepShape::capsule(capsule.radius, band_half_height);
        let Some(forward_hit) = world.sweep(forward_start, forward_end, forward_shape, &climbable) else {
            log::trace!("Ledge probe: nothing ahead");
            return None;
        };

        // Downward: sphere from the top of the band onto the ledge
        let mut down_start = forward_hit.impact_point - forward_hit.impact_normal * s.down_trace_pullback;
        down_start.z = bottom.z + s.max_ledge_height + capsule.radius;
        let down_end = Vec3::new(down_start.x, down_start.y, bottom.z);
        let down_shape = SweepShape::Sphere { radius: capsule.radius };
        let Some(down_hit) = world.sweep(down_start, down_end, down_shape, &climbable) else {
            log::trace!("Ledge probe: no top surface");
            return None;
        };

        // Clearance: room to stand at full height on the ledge
        let standing_half_height = body.default_capsule().half_height;
        let landing = down_hit.impact_point + UP * (standing_half_height + s.clearance_margin);
        let pawn = CollisionProfile::Pawn.to_filter();
        if world.overlap_blocking(landing, SweepShape::capsule(capsule.radius, capsule.half_height), &pawn) {
            log::trace!("Ledge probe: landing spot obstructed");
            return None;
        }

        let owner_location = world.surface_location(down_hit.surface).unwrap_or(Vec3::ZERO);
        let facing = forward_hit.impact_normal * Vec3::new(-1.0, -1.0, 0.0);

        Some(LedgeDescription {
            location: landing - owner_location,
            rotation: Rotator::from_direction(facing),
            ledge_normal: forward_hit.impact_normal,
            impact_point: down_hit.impact_point,
            surface: down_hit.surface,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::physics::{ChannelMask, CollisionWorld};
    use crate::game::locomotion::test_support::{ledge_world, standing_body, ScriptedWorld};
    use approx::assert_relative_eq;

    #[test]
    fn test_detects_ledge_on_block() {
        let (world, block) = ledge_world(150.0);
        let ledge = LedgeProbe::default().detect(&standing_body(), &world).unwrap();

        assert_eq!(ledge.surface, block);
        assert_relative_eq!(ledge.impact_point.z, 150.0, epsilon = 0.5);
        assert_relative_eq!(ledge.ledge_normal.x, -1.0, epsilon = 1e-2);
        // Facing into the wall
        assert_relative_eq!(ledge.rotation.yaw, 0.0, epsilon = 0.5);
        // Relative to the block's center at (200, 0, 75)
        assert_relative_eq!(ledge.location.z, 150.0 + 96.0 + 2.0 - 75.0, epsilon = 0.5);
    }

    #[test]
    fn test_no_ledge_without_climbable_geometry() {
        let mut world = CollisionWorld::new();
        world.add_box(Vec3::new(200.0, 0.0, 75.0), Vec3::new(100.0, 300.0, 75.0), ChannelMask::WORLD);
        assert!(LedgeProbe::default().detect(&standing_body(), &world).is_none());
    }

    #[test]
    fn test_wall_taller_than_band_is_not_a_ledge() {
        let (world, _) = ledge_world(400.0);
        assert!(LedgeProbe::default().detect(&standing_body(), &world).is_none());
    }

    #[test]
    fn test_real_ceiling_blocks_landing() {
        let (mut world, _) = ledge_world(150.0);
        world.add_box(Vec3::new(200.0, 0.0, 300.0), Vec3::new(100.0, 300.0, 20.0), ChannelMask::WORLD);
        assert!(LedgeProbe::default().detect(&standing_body(), &world).is_none());
    }

    #[test]
    fn test_obstructed_landing_fails_after_both_sweeps_hit() {
        let world = ScriptedWorld::new()
            .with_forward_hit(Vec3::new(80.0, 0.0, 150.0), Vec3::new(-1.0, 0.0, 0.0))
            .with_down_hit(Vec3::new(90.0, 0.0, 150.0))
            .with_blocked_overlap(true);

        assert!(LedgeProbe::default().detect(&standing_body(), &world).is_none());
        assert_eq!(world.sweep_count(), 2);
        assert_eq!(world.overlap_count(), 1);

        let clear = world.with_blocked_overlap(false);
        assert!(LedgeProbe::default().detect(&standing_body(), &clear).is_some());
    }
}
