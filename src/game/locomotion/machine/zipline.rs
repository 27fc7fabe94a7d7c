// Zipline traversal

use std::rc::{Rc, Weak};

use glam::Vec3;
use log::{debug, warn};

use super::{ActiveMode, LocomotionStateMachine};
use crate::engine::physics::{CollisionQuery, KinematicBody};
use crate::game::interactive::ZiplineAnchor;
use crate::game::locomotion::state::BaseMode;
use crate::util::math::{project_onto, UP};
use crate::util::Rotator;

/// Ride state while attached to a zipline
#[derive(Debug, Clone)]
pub struct ZiplineTraversal {
    anchor: Weak<dyn ZiplineAnchor>,
    pub direction: Vec3,
    pub initial_speed: f32,
    pub current_speed: f32,
}

impl ZiplineTraversal {
    pub fn anchor(&self) -> Option<Rc<dyn ZiplineAnchor>> {
        self.anchor.upgrade()
    }
}

impl LocomotionStateMachine {
    pub fn attach_to_zipline(&mut self, body: &mut KinematicBody, zipline: &Rc<dyn ZiplineAnchor>) -> bool {
        if self.is_swimming() || self.flags.sliding || self.is_mantling() || self.is_on_zipline() {
            debug!("Zipline attach rejected");
            return false;
        }

        self.leave_custom_mode(body);

        let direction = zipline.direction();
        let rotation = Rotator::from_direction(direction).flattened();
        let offset = body.capsule().half_height + self.config.zipline.character_offset;
        let location = zipline.attach_point(body.location()) - UP * offset;

        body.set_rotation(rotation);
        body.set_location(location);

        let initial_speed = project_onto(body.velocity(), direction).length();
        self.zipline_ramp.play_from_start(initial_speed, self.config.zipline.max_speed);

        self.install_custom_mode(
            body,
            ActiveMode::ZiplineTraverse(ZiplineTraversal {
                anchor: Rc::downgrade(zipline),
                direction,
                initial_speed,
                current_speed: initial_speed,
            }),
        );
        true
    }

    /// Current ride speed, zero when not on a zipline
    pub fn zipline_speed(&self) -> f32 {
        match &self.mode {
            ActiveMode::ZiplineTraverse(traversal) => traversal.current_speed,
            _ => 0.0,
        }
    }

    pub(super) fn phys_zipline(&mut self, body: &mut KinematicBody, world: &dyn CollisionQuery, dt: f32) {
        let speed = self.zipline_ramp.tick(dt);
        let ActiveMode::ZiplineTraverse(traversal) = &mut self.mode else {
            return;
        };
        let Some(anchor) = traversal.anchor() else {
            warn!("Zipline dropped while riding, letting go");
            self.detach_from_zipline(body);
            return;
        };

        traversal.current_speed = speed;
        let delta = traversal.direction * speed * dt;
        let rotation = body.rotation();

        // End of the cable: the ride ran into the zipline's own geometry
        if let Some(hit) = body.move_by(world, delta, rotation, true) {
            if anchor.owns_surface(hit.surface) {
                debug!("Zipline end reached");
                self.detach_from_zipline(body);
            }
        }
    }

    pub fn detach_from_zipline(&mut self, body: &mut KinematicBody) -> bool {
        if !self.is_on_zipline() {
            return false;
        }
        self.leave_custom_mode(body);
        self.set_base_mode(body, BaseMode::Airborne);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::interactive::Zipline;
    use crate::game::locomotion::config::LocomotionConfig;
    use crate::game::locomotion::events::LocomotionEvent;
    use crate::game::locomotion::state::CustomMode;
    use crate::game::locomotion::test_support::{flat_world, ledge_world, standing_body};
    use approx::assert_relative_eq;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_attach_hangs_below_cable() {
        let mut machine = LocomotionStateMachine::default();
        let mut body = standing_body();
        body.set_location(Vec3::new(200.0, 0.0, 200.0));
        let zipline: Rc<dyn ZiplineAnchor> =
            Rc::new(Zipline::new(Vec3::new(0.0, 0.0, 600.0), Vec3::new(1000.0, 0.0, 400.0)));

        assert!(machine.attach_to_zipline(&mut body, &zipline));
        assert!(machine.is_on_zipline());
        assert!(!machine.can_jump());
        assert_relative_eq!(body.rotation().pitch, 0.0);
        assert_relative_eq!(body.forward().x, 1.0, epsilon = 1e-4);

        let cable = zipline.attach_point(Vec3::new(200.0, 0.0, 200.0));
        assert_relative_eq!(body.location().z, cable.z - 96.0 - 35.0, epsilon = 1e-3);
        assert!(!machine.attach_to_zipline(&mut body, &zipline));
    }

    #[test]
    fn test_initial_speed_is_projected_velocity() {
        let config = LocomotionConfig::default().with_default_curves();
        let mut machine = LocomotionStateMachine::new(config);
        let mut body = standing_body();
        body.set_velocity(Vec3::new(300.0, 400.0, 0.0));
        let zipline: Rc<dyn ZiplineAnchor> =
            Rc::new(Zipline::new(Vec3::new(0.0, 0.0, 600.0), Vec3::new(1000.0, 0.0, 600.0 - 1e-3)));

        machine.attach_to_zipline(&mut body, &zipline);
        assert_relative_eq!(machine.zipline_speed(), 300.0, epsilon = 1e-2);

        let world = crate::engine::physics::CollisionWorld::new();
        let mut last = machine.zipline_speed();
        for _ in 0..30 {
            machine.tick(&mut body, &world, DT);
            assert!(machine.zipline_speed() >= last);
            last = machine.zipline_speed();
        }
        assert!(last > 300.0 && last < 2000.0);
    }

    #[test]
    fn test_without_curve_rides_at_max_speed() {
        let mut machine = LocomotionStateMachine::default();
        let mut body = standing_body();
        let zipline: Rc<dyn ZiplineAnchor> =
            Rc::new(Zipline::new(Vec3::new(0.0, 0.0, 600.0), Vec3::new(5000.0, 0.0, 500.0)));
        machine.attach_to_zipline(&mut body, &zipline);

        let world = crate::engine::physics::CollisionWorld::new();
        let start = body.location();
        machine.tick(&mut body, &world, 0.1);
        assert_relative_eq!(machine.zipline_speed(), 2000.0);
        assert_relative_eq!(body.location().distance(start), 200.0, epsilon = 1e-2);
    }

    #[test]
    fn test_reaching_far_pole_detaches() {
        let mut world = flat_world();
        let zipline: Rc<dyn ZiplineAnchor> = Rc::new(Zipline::build(
            &mut world,
            Vec3::new(0.0, 0.0, 0.0),
            700.0,
            Vec3::new(1500.0, 0.0, 0.0),
            500.0,
        ));
        let mut machine = LocomotionStateMachine::default();
        let mut body = standing_body();
        body.set_location(Vec3::new(100.0, 0.0, 500.0));
        machine.attach_to_zipline(&mut body, &zipline);

        for _ in 0..120 {
            if !machine.is_on_zipline() {
                break;
            }
            machine.tick(&mut body, &world, DT);
        }
        assert!(!machine.is_on_zipline());
        assert_eq!(machine.base_mode(), BaseMode::Airborne);
        assert!(body.location().x < 1500.0);
        assert_relative_eq!(machine.zipline_speed(), 0.0);
    }

    #[test]
    fn test_attach_rejected_while_swimming_or_sliding() {
        let mut machine = LocomotionStateMachine::default();
        let mut body = standing_body();
        let zipline: Rc<dyn ZiplineAnchor> = Rc::new(Zipline::new(Vec3::ZERO, Vec3::new(100.0, 0.0, -10.0)));

        machine.set_base_mode(&mut body, BaseMode::Swimming);
        assert!(!machine.attach_to_zipline(&mut body, &zipline));
        machine.set_base_mode(&mut body, BaseMode::Grounded);
        machine.flags.sliding = true;
        assert!(!machine.attach_to_zipline(&mut body, &zipline));
    }

    #[test]
    fn test_attach_rejected_while_mantling() {
        let (world, _) = ledge_world(150.0);
        let config = LocomotionConfig::default().with_default_curves();
        let mut machine = LocomotionStateMachine::new(config);
        let mut body = standing_body();
        assert!(machine.try_mantle(&mut body, &world, false));
        machine.tick(&mut body, &world, DT);
        assert_eq!(machine.custom_mode(), CustomMode::Mantling);

        let zipline: Rc<dyn ZiplineAnchor> =
            Rc::new(Zipline::new(Vec3::new(0.0, 0.0, 600.0), Vec3::new(1000.0, 0.0, 400.0)));
        assert!(!machine.attach_to_zipline(&mut body, &zipline));
        assert_eq!(machine.custom_mode(), CustomMode::Mantling);
        assert!(!machine.is_on_zipline());
    }

    #[test]
    fn test_wall_run_to_zipline_tears_down_once() {
        let (world, _) = crate::game::locomotion::test_support::wall_world();
        let mut machine = LocomotionStateMachine::default();
        let mut body = standing_body();
        body.set_location(Vec3::new(0.0, 0.0, 300.0));
        machine.set_base_mode(&mut body, BaseMode::Airborne);
        assert!(machine.start_wall_run(&mut body, Vec3::new(0.0, -1.0, 0.0)));
        machine.drain_events();

        let zipline: Rc<dyn ZiplineAnchor> =
            Rc::new(Zipline::new(Vec3::new(0.0, 0.0, 800.0), Vec3::new(2000.0, 0.0, 600.0)));
        assert!(machine.attach_to_zipline(&mut body, &zipline));

        let events = machine.drain_events();
        let exits: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, LocomotionEvent::CustomModeExited(_)))
            .collect();
        assert_eq!(exits, vec![&LocomotionEvent::CustomModeExited(CustomMode::WallRun)]);
        assert!(body.plane_constraint().is_none());
        assert_eq!(machine.custom_mode(), CustomMode::ZiplineTraverse);

        // The wall run timeout was cancelled along with the mode
        for _ in 0..120 {
            machine.tick(&mut body, &world, DT);
        }
        assert!(machine
            .drain_events()
            .iter()
            .all(|e| !matches!(e, LocomotionEvent::WallRunStopped(_))));
    }
}
