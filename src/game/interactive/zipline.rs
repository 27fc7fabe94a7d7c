use glam::Vec3;

use super::ZiplineAnchor;
use crate::engine::physics::{ChannelMask, CollisionWorld, SurfaceId};
use crate::util::Rotator;

/// Half thickness of the generated pole boxes
const POLE_HALF_WIDTH: f32 = 10.0;

/// A cable strung between the tops of two poles
#[derive(Debug, Clone)]
pub struct Zipline {
    first_top: Vec3,
    second_top: Vec3,
    surfaces: Vec<SurfaceId>,
}

impl Zipline {
    /// Cable between two points with no collision geometry of its own
    pub fn new(first_top: Vec3, second_top: Vec3) -> Self {
        Self {
            first_top,
            second_top,
            surfaces: Vec::new(),
        }
    }

    /// Spawn two poles of the given heights into `world` and string a cable between them
    pub fn build(
        world: &mut CollisionWorld,
        first_base: Vec3,
        first_height: f32,
        second_base: Vec3,
        second_height: f32,
    ) -> Self {
        let mut surfaces = Vec::with_capacity(2);
        for (base, height) in [(first_base, first_height), (second_base, second_height)] {
            let half = Vec3::new(POLE_HALF_WIDTH, POLE_HALF_WIDTH, height * 0.5);
            surfaces.push(world.add_box(base + Vec3::Z * height * 0.5, half, ChannelMask::WORLD));
        }

        Self {
            first_top: first_base + Vec3::Z * first_height,
            second_top: second_base + Vec3::Z * second_height,
            surfaces,
        }
    }

    pub fn cable_length(&self) -> f32 {
        self.first_top.distance(self.second_top)
    }

    pub fn endpoints(&self) -> (Vec3, Vec3) {
        (self.first_top, self.second_top)
    }
}

impl ZiplineAnchor for Zipline {
    fn direction(&self) -> Vec3 {
        let cable = (self.second_top - self.first_top).normalize_or_zero();
        // Always ride downhill; a level cable runs back toward the first pole
        if Rotator::from_direction(cable).pitch >= 0.0 {
            -cable
        } else {
            cable
        }
    }

    fn attach_point(&self, from: Vec3) -> Vec3 {
        let cable = self.second_top - self.first_top;
        let len_sq = cable.length_squared();
        if len_sq <= f32::EPSILON {
            return self.first_top;
        }
        let t = ((from - self.first_top).dot(cable) / len_sq).clamp(0.0, 1.0);
        self.first_top + cable * t
    }

    fn owns_surface(&self, surface: SurfaceId) -> bool {
        self.surfaces.contains(&surface)
    }
}
