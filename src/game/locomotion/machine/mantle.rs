// Mantling over a detected ledge

use std::rc::Rc;

use glam::Vec3;
use log::debug;

use super::{ActiveMode, LocomotionStateMachine, LocomotionTimer};
use crate::engine::physics::{CollisionQuery, KinematicBody, SurfaceId};
use crate::game::locomotion::events::LocomotionEvent;
use crate::game::locomotion::state::BaseMode;
use crate::util::math::{lerp, map_range_clamped, UP};
use crate::util::{Rotator, VectorCurve};

/// Everything a mantle needs once started
#[derive(Debug, Clone, Default)]
pub struct MantlingParameters {
    pub initial_location: Vec3,
    pub initial_rotation: Rotator,
    /// Landing location relative to the target surface's owner
    pub target_location: Vec3,
    pub target_rotation: Rotator,
    /// Surface tracked every frame so moving ledges carry the target along
    pub target_surface: Option<SurfaceId>,
    /// Start pose the animation expects, already in world space
    pub initial_animation_location: Vec3,
    pub start_time: f32,
    pub duration: f32,
    /// Time to (position, xy correction, z correction) alphas
    pub curve: Option<Rc<VectorCurve>>,
}

impl LocomotionStateMachine {
    pub fn can_mantle(&self) -> bool {
        !self.is_mantling()
            && !self.is_on_ladder()
            && !self.is_on_zipline()
            && !self.flags.out_of_stamina
            && !self.flags.sliding
            && !self.is_falling()
    }

    /// Probe for a ledge and mantle onto it.
    ///
    /// `force` skips the `can_mantle` gate; reaching the top of a ladder uses it
    /// while the character is still attached.
    pub fn try_mantle(&mut self, body: &mut KinematicBody, world: &dyn CollisionQuery, force: bool) -> bool {
        if !(force || self.can_mantle()) {
            debug!("Mantle rejected by gate");
            return false;
        }

        if body.is_crouched() {
            body.uncrouch(world);
        }

        let Some(ledge) = self.ledge_probe.detect(body, world) else {
            debug!("Mantle ignored: no ledge ahead");
            return false;
        };

        let initial_location = body.location();
        let height = (ledge.impact_point - initial_location).z + body.capsule().half_height;
        let high = height > self.config.mantle.low_max_height;
        let settings = if high {
            &self.config.mantle.high
        } else {
            &self.config.mantle.low
        };

        let start_time = map_range_clamped(
            height,
            (settings.min_height, settings.max_height),
            (settings.min_height_start_time, settings.max_height_start_time),
        );
        let surface_location = world.surface_location(ledge.surface).unwrap_or(Vec3::ZERO);
        let initial_animation_location = ledge.location + surface_location - UP * settings.animation_correction_z
            + ledge.ledge_normal * settings.animation_correction_xy;

        let params = MantlingParameters {
            initial_location,
            initial_rotation: body.rotation(),
            target_location: ledge.location,
            target_rotation: ledge.rotation,
            target_surface: Some(ledge.surface),
            initial_animation_location,
            start_time,
            duration: 0.0,
            curve: settings.curve.clone(),
        };

        if !self.enter_mantle(body, world, params) {
            return false;
        }

        let duration = match &self.mode {
            ActiveMode::Mantling { params, .. } => params.duration,
            _ => 0.0,
        };
        self.events.push(LocomotionEvent::MantleStarted {
            height,
            high,
            start_time,
            duration,
        });
        true
    }

    /// Switch into mantling with prepared parameters. The duration comes from
    /// the curve's authored time range; without a curve the mantle snaps to
    /// the target and completes on the next timer pass.
    pub fn enter_mantle(
        &mut self,
        body: &mut KinematicBody,
        world: &dyn CollisionQuery,
        mut params: MantlingParameters,
    ) -> bool {
        if self.is_mantling() {
            return false;
        }

        params.duration = params.curve.as_ref().map_or(0.0, |curve| {
            let (min, max) = curve.time_range();
            max - min
        });
        let surface_location = params
            .target_surface
            .and_then(|surface| world.surface_location(surface))
            .unwrap_or(Vec3::ZERO);

        let duration = params.duration;
        let instant = params.curve.is_none();
        self.install_custom_mode(body, ActiveMode::Mantling {
            params,
            surface_location,
        });
        self.timers.schedule(LocomotionTimer::MantleComplete, duration);

        if instant {
            self.phys_mantling(body, world, 0.0);
        }
        true
    }

    pub(super) fn phys_mantling(&mut self, body: &mut KinematicBody, world: &dyn CollisionQuery, _dt: f32) {
        let ActiveMode::Mantling {
            params,
            surface_location,
        } = &mut self.mode
        else {
            return;
        };

        // A vanished surface keeps its last known location
        if let Some(location) = params.target_surface.and_then(|s| world.surface_location(s)) {
            *surface_location = location;
        }

        let elapsed = self.timers.elapsed(LocomotionTimer::MantleComplete).unwrap_or(0.0) + params.start_time;
        let alpha = params.curve.as_ref().map_or(Vec3::ONE, |curve| curve.value(elapsed));

        let mut corrected = params.initial_location.lerp(params.initial_animation_location, alpha.y);
        corrected.z = lerp(params.initial_location.z, params.initial_animation_location.z, alpha.z);

        let target = params.target_location + *surface_location;
        let location = corrected.lerp(target, alpha.x);
        let rotation = params.initial_rotation.lerp(params.target_rotation, alpha.x);

        log::trace!("Mantle t={:.3} alpha={:?}", elapsed, alpha);
        body.move_by(world, location - body.location(), rotation, false);
    }

    pub(super) fn end_mantle(&mut self, body: &mut KinematicBody) {
        if !self.is_mantling() {
            return;
        }
        self.leave_custom_mode(body);
        body.set_velocity(Vec3::ZERO);
        self.set_base_mode(body, BaseMode::Grounded);
    }
}
