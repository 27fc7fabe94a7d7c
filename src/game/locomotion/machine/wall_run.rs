// Wall running

use glam::Vec3;
use log::debug;

use super::{ActiveMode, LocomotionStateMachine, LocomotionTimer};
use crate::engine::physics::{CollisionChannel, CollisionQuery, KinematicBody, QueryFilter};
use crate::game::locomotion::events::LocomotionEvent;
use crate::game::locomotion::state::{BaseMode, WallRunSide, WallRunStopMethod};
use crate::util::math::{is_nearly_zero, UP};
use crate::util::Rotator;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WallRunParameters {
    pub side: WallRunSide,
    pub direction: Vec3,
    pub wall_normal: Vec3,
    pub speed: f32,
}

/// Side of the wall relative to the character and the tangential run direction
fn side_and_direction(normal: Vec3, right: Vec3) -> (WallRunSide, Vec3) {
    if normal.dot(right) > 0.0 {
        (WallRunSide::Left, UP.cross(normal).normalize_or_zero())
    } else {
        (WallRunSide::Right, normal.cross(UP).normalize_or_zero())
    }
}

impl LocomotionStateMachine {
    /// Neither a walkable floor nor an overhang
    pub fn is_surface_wall_runnable(&self, normal: Vec3) -> bool {
        !(normal.z > self.config.speeds.walkable_floor_z || normal.z < -self.config.wall_run.overhang_tolerance)
    }

    pub fn wall_run_parameters(&self) -> WallRunParameters {
        match &self.mode {
            ActiveMode::WallRun(params) => *params,
            _ => WallRunParameters::default(),
        }
    }

    /// Start running along the wall hit with `normal`. Only while falling.
    pub fn start_wall_run(&mut self, body: &mut KinematicBody, normal: Vec3) -> bool {
        if self.is_wall_running() || !self.is_surface_wall_runnable(normal) || !self.is_falling() {
            return false;
        }
        if is_nearly_zero(body.forward() + normal, self.config.wall_run.head_on_tolerance) {
            debug!("Wall run rejected: head-on hit");
            return false;
        }

        self.leave_custom_mode(body);

        let (side, direction) = side_and_direction(normal, body.right());
        body.set_rotation(Rotator::from_direction(direction));
        body.set_plane_constraint(Some(UP));

        self.install_custom_mode(
            body,
            ActiveMode::WallRun(WallRunParameters {
                side,
                direction,
                wall_normal: normal,
                speed: 0.0,
            }),
        );

        // Captured after the switch so the wall-run speed rule applies
        let speed = self.max_speed();
        if let ActiveMode::WallRun(params) = &mut self.mode {
            params.speed = speed;
        }
        body.set_velocity(direction * speed);
        self.timers.schedule(LocomotionTimer::WallRunTimeout, self.config.wall_run.max_time);

        debug!("Wall run started on the {:?} at {}", side, speed);
        self.events.push(LocomotionEvent::WallRunStarted(side));
        true
    }

    pub(super) fn phys_wall_run(&mut self, body: &mut KinematicBody, world: &dyn CollisionQuery, dt: f32) {
        let ActiveMode::WallRun(params) = self.mode else {
            return;
        };

        let probe = match params.side {
            WallRunSide::Right => body.right(),
            _ => -body.right(),
        };
        let start = body.location();
        let end = start + probe * self.config.wall_run.probe_length;
        let filter = QueryFilter::channel(CollisionChannel::WallRunnable).ignoring_pawns();

        let Some(hit) = world.line_trace(start, end, &filter) else {
            self.stop_wall_run(body, WallRunStopMethod::Fall);
            return;
        };

        let (side, direction) = side_and_direction(hit.impact_normal, body.right());
        if side != params.side {
            self.stop_wall_run(body, WallRunStopMethod::Fall);
            return;
        }

        if let ActiveMode::WallRun(current) = &mut self.mode {
            current.direction = direction;
            current.wall_normal = hit.impact_normal;
        }
        let rotation = body.rotation();
        body.move_by(world, direction * params.speed * dt, rotation, true);
    }

    pub fn stop_wall_run(&mut self, body: &mut KinematicBody, method: WallRunStopMethod) -> bool {
        let ActiveMode::WallRun(params) = self.mode else {
            return false;
        };
        let forward = body.forward();

        self.leave_custom_mode(body);
        self.set_base_mode(body, BaseMode::Airborne);

        if method == WallRunStopMethod::JumpOff {
            let direction = (params.wall_normal + forward + UP).normalize_or_zero();
            let velocity = direction * self.config.wall_run.jump_off_speed;
            body.launch(velocity);

            let flat = Vec3::new(direction.x, direction.y, 0.0);
            self.forced_rotation.install(Rotator::from_direction(flat));
            self.events.push(LocomotionEvent::Launched(velocity));
        }

        debug!("Wall run stopped: {:?}", method);
        self.events.push(LocomotionEvent::WallRunStopped(method));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::locomotion::state::CustomMode;
    use crate::game::locomotion::test_support::{flat_world, standing_body, wall_world};
    use approx::assert_relative_eq;

    const DT: f32 = 1.0 / 60.0;

    fn airborne_beside_wall() -> (LocomotionStateMachine, KinematicBody) {
        let mut machine = LocomotionStateMachine::default();
        let mut body = standing_body();
        body.set_location(Vec3::new(0.0, 0.0, 300.0));
        machine.set_base_mode(&mut body, BaseMode::Airborne);
        (machine, body)
    }

    #[test]
    fn test_runnable_surface_test() {
        let machine = LocomotionStateMachine::default();
        assert!(!machine.is_surface_wall_runnable(Vec3::new(0.0, 0.0, 1.0)));
        assert!(!machine.is_surface_wall_runnable(Vec3::new(0.0, 0.0, -1.0)));
        assert!(machine.is_surface_wall_runnable(Vec3::new(1.0, 0.0, 0.0)));
        assert!(machine.is_surface_wall_runnable(Vec3::new(0.0, 0.999_99, -0.004)));
    }

    #[test]
    fn test_walkable_threshold_is_still_runnable() {
        let machine = LocomotionStateMachine::default();
        let z = machine.config.speeds.walkable_floor_z;
        let at = Vec3::new((1.0 - z * z).sqrt(), 0.0, z);
        assert!(machine.is_surface_wall_runnable(at));

        let steeper = z + 1e-3;
        let above = Vec3::new((1.0 - steeper * steeper).sqrt(), 0.0, steeper);
        assert!(!machine.is_surface_wall_runnable(above));
    }

    #[test]
    fn test_start_rejects_floor_and_ceiling_normals() {
        let (mut machine, mut body) = airborne_beside_wall();
        assert!(!machine.start_wall_run(&mut body, Vec3::Z));
        assert!(!machine.start_wall_run(&mut body, -Vec3::Z));
        assert!(machine.start_wall_run(&mut body, Vec3::new(0.0, -1.0, 0.0)));
    }

    #[test]
    fn test_start_requires_falling() {
        let mut machine = LocomotionStateMachine::default();
        let mut body = standing_body();
        assert!(!machine.start_wall_run(&mut body, Vec3::new(0.0, -1.0, 0.0)));
    }

    #[test]
    fn test_head_on_hit_rejected() {
        let (mut machine, mut body) = airborne_beside_wall();
        assert!(!machine.start_wall_run(&mut body, Vec3::new(-1.0, 0.0, 0.0)));
        assert_eq!(machine.custom_mode(), CustomMode::None);
    }

    #[test]
    fn test_side_and_direction() {
        let right = Vec3::new(0.0, -1.0, 0.0);
        let (side, direction) = side_and_direction(Vec3::new(0.0, -1.0, 0.0), right);
        assert_eq!(side, WallRunSide::Left);
        assert_relative_eq!(direction.x, 1.0, epsilon = 1e-5);

        let (side, direction) = side_and_direction(Vec3::new(0.0, 1.0, 0.0), right);
        assert_eq!(side, WallRunSide::Right);
        assert_relative_eq!(direction.x, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_runs_along_wall_until_timeout() {
        let (world, _) = wall_world();
        let (mut machine, mut body) = airborne_beside_wall();
        machine.start_sprint();
        assert!(machine.start_wall_run(&mut body, Vec3::new(0.0, -1.0, 0.0)));

        let params = machine.wall_run_parameters();
        assert_eq!(params.side, WallRunSide::Left);
        assert_eq!(params.speed, 1000.0);
        assert_eq!(body.plane_constraint(), Some(UP));

        for _ in 0..60 {
            machine.tick(&mut body, &world, DT);
        }
        assert!(machine.is_wall_running());
        assert_relative_eq!(body.location().x, 1000.0, epsilon = 1.0);
        assert_relative_eq!(body.location().z, 300.0);

        for _ in 0..31 {
            machine.tick(&mut body, &world, DT);
        }
        assert!(!machine.is_wall_running());
        assert_eq!(machine.base_mode(), BaseMode::Airborne);
        assert!(body.plane_constraint().is_none());
        assert!(machine
            .drain_events()
            .contains(&LocomotionEvent::WallRunStopped(WallRunStopMethod::Fall)));
    }

    #[test]
    fn test_losing_the_wall_stops_run() {
        let world = flat_world();
        let (mut machine, mut body) = airborne_beside_wall();
        assert!(machine.start_wall_run(&mut body, Vec3::new(0.0, -1.0, 0.0)));
        assert_eq!(machine.wall_run_parameters().speed, 600.0);

        machine.tick(&mut body, &world, DT);
        assert!(!machine.is_wall_running());
        assert_eq!(machine.wall_run_parameters(), WallRunParameters::default());
    }

    #[test]
    fn test_jump_off_launches_away_from_wall() {
        let (world, _) = wall_world();
        let (mut machine, mut body) = airborne_beside_wall();
        machine.start_wall_run(&mut body, Vec3::new(0.0, -1.0, 0.0));
        machine.tick(&mut body, &world, DT);

        assert!(machine.stop_wall_run(&mut body, WallRunStopMethod::JumpOff));
        let velocity = body.velocity();
        assert_relative_eq!(velocity.length(), 350.0, epsilon = 1e-2);
        assert!(velocity.y < 0.0 && velocity.x > 0.0 && velocity.z > 0.0);

        let target = machine.forced_rotation().target().unwrap();
        assert_relative_eq!(target.pitch, 0.0, epsilon = 1e-3);
        assert_relative_eq!(target.yaw, -45.0, epsilon = 1e-2);
        assert!(!machine.stop_wall_run(&mut body, WallRunStopMethod::JumpOff));
    }
}
