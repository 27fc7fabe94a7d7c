// Sliding
//
// Not a custom mode: the slide suspends the base mode so the host stops
// integrating, and the host drives it through `update_slide` every frame.

use glam::Vec3;
use log::debug;

use super::{LocomotionStateMachine, LocomotionTimer};
use crate::engine::physics::{CollisionChannel, CollisionProfile, CollisionQuery, KinematicBody, QueryFilter};
use crate::game::locomotion::events::LocomotionEvent;
use crate::game::locomotion::state::BaseMode;
use crate::util::math::UP;
use crate::util::Rotator;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SlideParameters {
    pub direction: Vec3,
    pub rotation: Rotator,
    /// How far the capsule was lowered
    pub height_adjustment: f32,
}

impl LocomotionStateMachine {
    pub fn slide_parameters(&self) -> Option<SlideParameters> {
        self.slide
    }

    /// Current slide speed, zero when not sliding
    pub fn slide_speed(&self) -> f32 {
        if self.flags.sliding {
            self.slide_ramp.value()
        } else {
            0.0
        }
    }

    pub fn start_slide(&mut self, body: &mut KinematicBody) -> bool {
        if !self.flags.sprinting || self.is_swimming() || self.flags.sliding || self.custom_mode().is_active() {
            debug!("Slide rejected");
            return false;
        }

        let start_speed = self.max_speed();
        self.stop_sprint();

        let forward = body.forward();
        let direction = Vec3::new(forward.x, forward.y, 0.0).normalize_or_zero();
        let capsule = body.capsule();
        let height_adjustment = capsule.half_height - self.config.slide.capsule_half_height;

        body.set_capsule_half_height(self.config.slide.capsule_half_height);
        body.set_location(body.location() - UP * height_adjustment);

        self.slide = Some(SlideParameters {
            direction,
            rotation: body.rotation(),
            height_adjustment,
        });
        self.flags.sliding = true;
        self.slide_ramp.play_from_start(start_speed, self.config.slide.max_speed);
        self.timers.schedule(LocomotionTimer::SlideTimeout, self.config.slide.max_time);
        self.set_base_mode(body, BaseMode::Suspended);

        debug!("Slide started at {}", start_speed);
        self.events.push(LocomotionEvent::SlideStarted);
        true
    }

    /// Advance an active slide. Sliding off a ledge ends it with a launch.
    pub fn update_slide(&mut self, body: &mut KinematicBody, world: &dyn CollisionQuery, dt: f32) {
        let Some(slide) = self.slide.filter(|_| self.flags.sliding) else {
            return;
        };

        let start = body.location() + slide.direction * self.config.slide.over_ledge_offset;
        let reach = body.default_capsule().half_height + self.config.slide.down_trace_length;
        let filter = QueryFilter::channel(CollisionChannel::Visibility).ignoring_pawns();

        if world.line_trace(start, start - UP * reach, &filter).is_none() {
            let velocity = slide.direction * self.slide_speed();
            self.end_slide(body, world, BaseMode::Airborne);
            body.launch(velocity);
            debug!("Slid off a ledge at {:?}", velocity);
            self.events.push(LocomotionEvent::Launched(velocity));
            return;
        }

        let speed = self.slide_ramp.tick(dt);
        body.move_by(world, slide.direction * speed * dt, slide.rotation, true);
    }

    /// End the slide, standing up if there is room and crouching otherwise
    pub fn stop_slide(&mut self, body: &mut KinematicBody, world: &dyn CollisionQuery) -> bool {
        self.end_slide(body, world, BaseMode::Grounded)
    }

    fn end_slide(&mut self, body: &mut KinematicBody, world: &dyn CollisionQuery, base_mode: BaseMode) -> bool {
        if !self.flags.sliding {
            return false;
        }

        self.flags.sliding = false;
        self.slide_ramp.stop();
        self.timers.cancel(LocomotionTimer::SlideTimeout);
        self.slide = None;

        let standing = body.default_capsule();
        let standing_center = body.location() + UP * (standing.half_height - body.capsule().half_height);
        let filter = CollisionProfile::IgnoreOnlyPawn.to_filter();
        let crouched = world.overlap_blocking(standing_center, standing.shape(), &filter);

        if crouched {
            body.crouch(self.config.character.crouched_half_height);
        } else {
            body.restore_default_capsule();
            body.set_location(standing_center);
        }
        self.set_base_mode(body, base_mode);

        debug!("Slide ended (crouched: {})", crouched);
        self.events.push(LocomotionEvent::SlideEnded { crouched });
        true
    }
}
