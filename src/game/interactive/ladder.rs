use std::cell::Cell;

use glam::Vec3;

use super::LadderAnchor;
use crate::util::math::UP;
use crate::util::Rotator;

/// Depth of the top interaction volume in front of and behind the ladder
const TOP_VOLUME_DEPTH: f32 = 60.0;

/// Vertical extent of the top interaction volume above the ladder top
const TOP_VOLUME_HEIGHT: f32 = 120.0;

/// A vertical ladder standing at `location` and facing `yaw`
#[derive(Debug, Clone)]
pub struct Ladder {
    location: Vec3,
    rotation: Rotator,
    height: f32,
    width: f32,
    /// Offset of the top attach pose in ladder space, relative to the ladder top
    top_attach_offset: Vec3,
    on_top: Cell<bool>,
}

impl Ladder {
    pub fn new(location: Vec3, yaw: f32, height: f32) -> Self {
        Self {
            location,
            rotation: Rotator::new(0.0, yaw, 0.0),
            height,
            width: 50.0,
            top_attach_offset: Vec3::new(60.0, 0.0, -120.0),
            on_top: Cell::new(false),
        }
    }

    /// Mark whether a character is standing in the top interaction volume
    pub fn set_on_top(&self, on_top: bool) {
        self.on_top.set(on_top);
    }

    /// Update the top flag from a character position and return it
    pub fn update_top_presence(&self, character_location: Vec3) -> bool {
        let local = self.rotation.to_quat().inverse() * (character_location - self.location);
        let inside = local.x.abs() <= TOP_VOLUME_DEPTH
            && local.y.abs() <= self.width
            && local.z >= self.height
            && local.z <= self.height + TOP_VOLUME_HEIGHT;
        self.on_top.set(inside);
        inside
    }
}

impl LadderAnchor for Ladder {
    fn location(&self) -> Vec3 {
        self.location
    }

    fn up(&self) -> Vec3 {
        UP
    }

    fn forward(&self) -> Vec3 {
        self.rotation.forward()
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn is_on_top(&self) -> bool {
        self.on_top.get()
    }

    fn top_attach_start_location(&self) -> Vec3 {
        self.location + UP * self.height + self.rotation.to_quat() * self.top_attach_offset
    }
}
