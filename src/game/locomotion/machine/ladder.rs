// Ladder climbing

use std::rc::Rc;

use glam::Vec3;
use log::{debug, warn};

use super::{ActiveMode, LocomotionStateMachine};
use crate::engine::physics::{CollisionQuery, KinematicBody};
use crate::game::interactive::LadderAnchor;
use crate::game::locomotion::events::LocomotionEvent;
use crate::game::locomotion::state::{BaseMode, LadderDetachMethod};
use crate::util::math::project_onto;
use crate::util::Rotator;

/// Integrate `velocity` toward `input * max_speed`.
///
/// With input the velocity is steered onto the input direction and
/// accelerated; without it the speed bleeds off at `braking`.
pub fn calc_velocity(velocity: Vec3, input: Vec3, max_speed: f32, acceleration: f32, braking: f32, dt: f32) -> Vec3 {
    let input = input.clamp_length_max(1.0);

    if input.length_squared() <= 1e-8 {
        let speed = velocity.length();
        if speed <= f32::EPSILON {
            return Vec3::ZERO;
        }
        let braked = (speed - braking * dt).max(0.0);
        return velocity * (braked / speed);
    }

    let direction = input.normalize();
    let speed = velocity.length();
    let steered = direction * speed * velocity.dot(direction).signum();
    let accelerated = steered + input * acceleration * dt;
    accelerated.clamp_length_max(max_speed * input.length())
}

impl LocomotionStateMachine {
    /// Attach to `ladder`, facing it. Rejected while sliding or already on it.
    pub fn attach_to_ladder(&mut self, body: &mut KinematicBody, ladder: &Rc<dyn LadderAnchor>) -> bool {
        if self.flags.sliding {
            debug!("Ladder attach rejected while sliding");
            return false;
        }
        if let Some(current) = self.current_ladder() {
            if Rc::ptr_eq(&current, ladder) {
                return false;
            }
        }

        self.leave_custom_mode(body);

        let mut rotation = Rotator::from_direction(ladder.forward());
        rotation.yaw += 180.0;

        let location = if ladder.is_on_top() {
            ladder.top_attach_start_location()
        } else {
            let projection = (body.location() - ladder.location()).dot(ladder.up());
            ladder.location() + ladder.up() * projection + ladder.forward() * self.config.ladder.character_offset
        };

        body.set_rotation(rotation.normalized());
        body.set_location(location);
        body.set_velocity(Vec3::ZERO);
        self.install_custom_mode(body, ActiveMode::LadderClimb(Rc::downgrade(ladder)));
        true
    }

    /// Distance of `location` along the attached ladder's up axis.
    ///
    /// Panics if no ladder is attached.
    pub fn ladder_projection(&self, location: Vec3) -> f32 {
        let ladder = self
            .current_ladder()
            .expect("ladder_projection called with no ladder attached");
        (location - ladder.location()).dot(ladder.up())
    }

    /// Climbing speed over the maximum climbing speed, for animation.
    ///
    /// Panics if no ladder is attached.
    pub fn ladder_speed_ratio(&self, body: &KinematicBody) -> f32 {
        let ladder = self
            .current_ladder()
            .expect("ladder_speed_ratio called with no ladder attached");
        ladder.up().dot(body.velocity()) / self.config.ladder.climbing_max_speed
    }

    pub(super) fn phys_ladder(&mut self, body: &mut KinematicBody, world: &dyn CollisionQuery, dt: f32) {
        let Some(ladder) = self.current_ladder() else {
            warn!("Ladder dropped while climbing, falling off");
            self.detach_from_ladder(body, world, LadderDetachMethod::Fall);
            return;
        };

        let up = ladder.up();
        let input = project_onto(body.consume_input(), up);
        let velocity = calc_velocity(
            body.velocity(),
            input,
            self.max_speed(),
            self.config.speeds.max_acceleration,
            self.config.ladder.braking_deceleration,
            dt,
        );
        body.set_velocity(project_onto(velocity, up));

        let delta = body.velocity() * dt;
        let projection = self.ladder_projection(body.location() + delta);

        if projection < self.config.ladder.min_bottom_offset {
            self.detach_from_ladder(body, world, LadderDetachMethod::ReachingBottom);
            return;
        }
        if projection > ladder.height() - self.config.ladder.max_top_offset {
            self.detach_from_ladder(body, world, LadderDetachMethod::ReachingTop);
            return;
        }

        let rotation = body.rotation();
        let hit = body.move_by(world, delta, rotation, true);

        // Standing on walkable ground at the foot of the ladder
        let descending = delta.dot(up) < 0.0;
        if let Some(hit) = hit.filter(|h| descending && h.impact_normal.z >= self.config.speeds.walkable_floor_z) {
            log::trace!("Ladder descent blocked by floor at {:?}", hit.impact_point);
            self.detach_from_ladder(body, world, LadderDetachMethod::ReachingBottom);
        }
    }

    /// Leave the ladder. `ReachingTop` mantles onto the ledge above and fails
    /// (staying attached) when there is none.
    pub fn detach_from_ladder(
        &mut self,
        body: &mut KinematicBody,
        world: &dyn CollisionQuery,
        method: LadderDetachMethod,
    ) -> bool {
        if !self.is_on_ladder() {
            return false;
        }

        match method {
            LadderDetachMethod::JumpOff => {
                let forward = self.current_ladder().map_or(-body.forward(), |l| l.forward());
                self.leave_custom_mode(body);
                self.set_base_mode(body, BaseMode::Airborne);

                let velocity = forward * self.config.ladder.jump_off_speed;
                body.launch(velocity);
                self.forced_rotation.install(Rotator::from_direction(forward));
                self.events.push(LocomotionEvent::Launched(velocity));
            }
            LadderDetachMethod::ReachingTop => {
                if !self.try_mantle(body, world, true) {
                    debug!("Reached ladder top with no ledge, holding");
                    body.set_velocity(Vec3::ZERO);
                    return false;
                }
            }
            LadderDetachMethod::ReachingBottom => {
                self.leave_custom_mode(body);
                self.set_base_mode(body, BaseMode::Grounded);
            }
            LadderDetachMethod::Fall => {
                self.leave_custom_mode(body);
                self.set_base_mode(body, BaseMode::Airborne);
            }
        }

        debug!("Detached from ladder: {:?}", method);
        self.events.push(LocomotionEvent::DetachedFromLadder(method));
        true
    }
}
