// Forced reorientation after launches

use crate::util::math::{fixed_turn, normalize_axis};
use crate::util::Rotator;

/// One-shot reorientation used after jump-offs.
///
/// While active it replaces rotation-follows-movement and turns the character
/// toward `target`, clearing itself once every axis is within tolerance.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForcedRotation {
    target: Rotator,
    active: bool,
}

impl ForcedRotation {
    pub fn install(&mut self, target: Rotator) {
        self.target = target.normalized();
        self.active = true;
    }

    pub fn clear(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn target(&self) -> Option<Rotator> {
        self.active.then_some(self.target)
    }

    /// Turn `current` toward the target at `rate` degrees per second.
    /// Returns the new rotation, or None when inactive.
    pub fn apply(&mut self, current: Rotator, rate: Rotator, dt: f32, tolerance: f32) -> Option<Rotator> {
        if !self.active {
            return None;
        }

        let current = current.normalized();
        if current.equals(self.target, tolerance) {
            self.active = false;
            return Some(current);
        }

        let turn = |from: f32, to: f32, rate: f32| {
            if normalize_axis(to - from).abs() <= tolerance {
                from
            } else {
                fixed_turn(from, to, rate * dt)
            }
        };
        let next = Rotator::new(
            turn(current.pitch, self.target.pitch, rate.pitch),
            turn(current.yaw, self.target.yaw, rate.yaw),
            turn(current.roll, self.target.roll, rate.roll),
        );

        let next = next.normalized();
        if next.equals(self.target, tolerance) {
            self.active = false;
        }
        Some(next)
    }
}
