// Character entity and host-side locomotion orchestration

use std::rc::Rc;

use glam::Vec3;
use log::debug;

use super::attributes::{CharacterAttributes, StaminaSettings};
use crate::engine::physics::{CollisionProfile, CollisionQuery, HitResult, KinematicBody};
use crate::game::interactive::{InteractiveActor, LadderAnchor, ZiplineAnchor};
use crate::game::locomotion::{BaseMode, LadderDetachMethod, LocomotionConfig, LocomotionStateMachine, WallRunStopMethod};
use crate::util::math::UP;
use crate::util::Rotator;

/// Unique identifier for a character
pub type CharacterId = u32;

/// Gravity applied by the simple host simulation (cm/s^2)
const GRAVITY_Z: f32 = -980.0;
/// Initial vertical speed of a jump
const JUMP_Z_VELOCITY: f32 = 500.0;
/// How far below the capsule the grounded check looks
const FLOOR_PROBE_DISTANCE: f32 = 5.0;

/// A player- or AI-controlled character with traversal locomotion
#[derive(Debug)]
pub struct Character {
    /// Unique identifier
    pub id: CharacterId,
    /// Character name (for display and logs)
    pub name: String,

    /// Capsule position, rotation and velocity
    pub body: KinematicBody,
    pub locomotion: LocomotionStateMachine,
    pub attributes: CharacterAttributes,

    /// Interactive actors whose volumes the character is standing in
    available_interactives: Vec<InteractiveActor>,
    sprint_requested: bool,
    wall_run_requested: bool,
}

impl Character {
    pub fn new(
        id: CharacterId,
        name: &str,
        config: LocomotionConfig,
        stamina: StaminaSettings,
        location: Vec3,
    ) -> Self {
        let locomotion = LocomotionStateMachine::new(config);
        let body = locomotion.spawn_body(location);

        Self {
            id,
            name: name.to_string(),
            body,
            locomotion,
            attributes: CharacterAttributes::new(stamina),
            available_interactives: Vec::new(),
            sprint_requested: false,
            wall_run_requested: false,
        }
    }

    // Input

    /// Horizontal movement input for the host simulation
    pub fn add_movement_input(&mut self, direction: Vec3, scale: f32) {
        self.body.add_movement_input(direction, scale);
    }

    pub fn request_sprint(&mut self, world: &dyn CollisionQuery) {
        self.sprint_requested = true;
        if self.body.is_crouched() {
            self.body.uncrouch(world);
        }
    }

    pub fn stop_sprint_request(&mut self) {
        self.sprint_requested = false;
    }

    pub fn is_sprint_requested(&self) -> bool {
        self.sprint_requested
    }

    pub fn start_aiming(&mut self, aim_speed: f32) {
        self.stop_sprint_request();
        self.locomotion.stop_sprint();
        self.locomotion.set_aiming(Some(aim_speed));
    }

    pub fn stop_aiming(&mut self) {
        self.locomotion.set_aiming(None);
    }

    pub fn jump(&mut self) -> bool {
        if !self.locomotion.can_jump() || self.locomotion.base_mode() != BaseMode::Grounded {
            return false;
        }
        let mut velocity = self.body.velocity();
        velocity.z = JUMP_Z_VELOCITY;
        self.body.set_velocity(velocity);
        self.locomotion.set_base_mode(&mut self.body, BaseMode::Airborne);
        true
    }

    pub fn mantle(&mut self, world: &dyn CollisionQuery) -> bool {
        self.locomotion.try_mantle(&mut self.body, world, false)
    }

    pub fn can_slide(&self) -> bool {
        self.locomotion.base_mode() == BaseMode::Grounded && self.locomotion.is_sprinting()
    }

    pub fn start_slide(&mut self) -> bool {
        if !self.can_slide() {
            return false;
        }
        self.locomotion.start_slide(&mut self.body)
    }

    pub fn can_wall_run(&self) -> bool {
        !self.locomotion.is_on_ladder()
            && !self.locomotion.is_mantling()
            && !self.locomotion.is_on_zipline()
            && !self.locomotion.is_swimming()
            && !self.locomotion.is_out_of_stamina()
    }

    /// Jump off the wall while running, otherwise arm a wall run for the next capsule hit
    pub fn request_wall_run(&mut self) {
        if self.locomotion.is_wall_running() {
            self.locomotion.stop_wall_run(&mut self.body, WallRunStopMethod::JumpOff);
        } else if self.locomotion.base_mode() == BaseMode::Grounded && self.can_wall_run() {
            self.wall_run_requested = true;
        }
    }

    pub fn is_wall_run_requested(&self) -> bool {
        self.wall_run_requested
    }

    /// Capsule hit reported by the host simulation
    pub fn on_capsule_hit(&mut self, hit: &HitResult) {
        if !self.wall_run_requested {
            return;
        }
        self.locomotion.start_wall_run(&mut self.body, hit.impact_normal);
        self.wall_run_requested = false;
    }

    pub fn climb_ladder_up(&mut self, value: f32) {
        if value.abs() <= f32::EPSILON {
            return;
        }
        if let Some(ladder) = self.locomotion.current_ladder() {
            self.body.add_movement_input(ladder.up(), value);
        }
    }

    // Interactive actors

    pub fn register_interactive(&mut self, actor: InteractiveActor) {
        if !self.available_interactives.iter().any(|a| a.is_same(&actor)) {
            self.available_interactives.push(actor);
        }
    }

    pub fn unregister_interactive(&mut self, actor: &InteractiveActor) {
        if let Some(index) = self.available_interactives.iter().position(|a| a.is_same(actor)) {
            self.available_interactives.swap_remove(index);
        }
    }

    pub fn available_ladder(&self) -> Option<Rc<dyn LadderAnchor>> {
        self.available_interactives.iter().find_map(|a| a.as_ladder().cloned())
    }

    pub fn available_zipline(&self) -> Option<Rc<dyn ZiplineAnchor>> {
        self.available_interactives.iter().find_map(|a| a.as_zipline().cloned())
    }

    /// Jump off the current ladder, or attach to the first one in reach
    pub fn interact_with_ladder(&mut self, world: &dyn CollisionQuery) -> bool {
        if self.locomotion.is_sliding() {
            return false;
        }
        if self.locomotion.is_on_ladder() {
            return self
                .locomotion
                .detach_from_ladder(&mut self.body, world, LadderDetachMethod::JumpOff);
        }
        match self.available_ladder() {
            Some(ladder) => self.locomotion.attach_to_ladder(&mut self.body, &ladder),
            None => false,
        }
    }

    /// Let go of the current zipline, or attach to the first one in reach
    pub fn interact_with_zipline(&mut self) -> bool {
        if self.locomotion.is_swimming() || self.locomotion.is_sliding() || self.locomotion.is_mantling() {
            return false;
        }
        if self.locomotion.is_on_zipline() {
            return self.locomotion.detach_from_zipline(&mut self.body);
        }
        match self.available_zipline() {
            Some(zipline) => self.locomotion.attach_to_zipline(&mut self.body, &zipline),
            None => false,
        }
    }

    // Frame update

    /// Per-frame update: sprint state, host movement, locomotion, slide, stamina
    pub fn tick(&mut self, world: &dyn CollisionQuery, dt: f32) {
        self.try_change_sprint_state();
        self.update_movement(world, dt);
        self.locomotion.tick(&mut self.body, world, dt);
        self.locomotion.update_slide(&mut self.body, world, dt);

        if let Some(out_of_stamina) = self.attributes.update(dt, self.locomotion.is_sprinting()) {
            debug!("{}: out of stamina {}", self.name, out_of_stamina);
            self.locomotion.set_out_of_stamina(out_of_stamina);
        }
    }

    fn try_change_sprint_state(&mut self) {
        if self.sprint_requested && !self.locomotion.is_sprinting() && self.locomotion.can_sprint(&self.body) {
            self.locomotion.start_sprint();
        }
        if !self.sprint_requested && self.locomotion.is_sprinting() {
            self.locomotion.stop_sprint();
        }
    }

    /// Minimal ground/air/swim integration standing in for the host simulation.
    /// Skipped while the locomotion layer drives the body.
    fn update_movement(&mut self, world: &dyn CollisionQuery, dt: f32) {
        if self.locomotion.drives_body() {
            return;
        }

        let mode = self.locomotion.base_mode();
        let input = self.body.consume_input();
        let max_speed = self.locomotion.max_speed();
        let mut velocity = self.body.velocity();

        match mode {
            BaseMode::Grounded => {
                let horizontal = Vec3::new(input.x, input.y, 0.0) * max_speed;
                velocity = Vec3::new(horizontal.x, horizontal.y, 0.0);
            }
            BaseMode::Airborne => velocity.z += GRAVITY_Z * dt,
            BaseMode::Swimming => velocity = input * max_speed,
            BaseMode::Suspended => return,
        }
        self.body.set_velocity(velocity);

        // Rotation follows movement
        let flat = Vec3::new(velocity.x, velocity.y, 0.0);
        let rotation = if !self.locomotion.overrides_rotation() && flat.length_squared() > 1.0 {
            Rotator::from_direction(flat)
        } else {
            self.body.rotation()
        };

        let walkable = self.locomotion.config().speeds.walkable_floor_z;
        if let Some(hit) = self.body.move_by(world, velocity * dt, rotation, true) {
            if hit.impact_normal.z >= walkable {
                if mode == BaseMode::Airborne {
                    self.body.set_velocity(Vec3::new(velocity.x, velocity.y, 0.0));
                    self.locomotion.set_base_mode(&mut self.body, BaseMode::Grounded);
                }
            } else {
                self.on_capsule_hit(&hit);
            }
        }

        if self.locomotion.base_mode() == BaseMode::Grounded && !self.locomotion.drives_body() && !self.has_floor(world) {
            self.locomotion.set_base_mode(&mut self.body, BaseMode::Airborne);
        }
    }

    fn has_floor(&self, world: &dyn CollisionQuery) -> bool {
        let filter = CollisionProfile::IgnoreOnlyPawn.to_filter();
        let start = self.body.location();
        let end = self.body.bottom() - UP * FLOOR_PROBE_DISTANCE;
        world.line_trace(start, end, &filter).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::interactive::{Ladder, Zipline};
    use crate::game::locomotion::test_support::{flat_world, wall_world};
    use crate::game::locomotion::{CustomMode, LocomotionEvent};
    use approx::assert_relative_eq;

    const DT: f32 = 1.0 / 60.0;

    fn character() -> Character {
        Character::new(
            0,
            "runner",
            LocomotionConfig::default(),
            StaminaSettings::default(),
            Vec3::new(0.0, 0.0, 96.0),
        )
    }

    #[test]
    fn test_walks_on_flat_ground() {
        let world = flat_world();
        let mut c = character();
        for _ in 0..60 {
            c.add_movement_input(Vec3::X, 1.0);
            c.tick(&world, DT);
        }
        assert_eq!(c.locomotion.base_mode(), BaseMode::Grounded);
        assert_relative_eq!(c.body.location().x, 600.0, epsilon = 1.0);
        assert_relative_eq!(c.body.location().z, 96.0, epsilon = 1e-3);
    }

    #[test]
    fn test_sprint_request_until_exhausted() {
        let world = flat_world();
        let mut c = character();
        c.request_sprint(&world);
        c.tick(&world, DT);
        assert!(c.locomotion.is_sprinting());
        assert_eq!(c.locomotion.max_speed(), 1200.0);

        // 100 stamina at 10 per second
        for _ in 0..(60 * 10 + 1) {
            c.tick(&world, DT);
        }
        assert!(c.locomotion.is_out_of_stamina());
        assert!(!c.locomotion.is_sprinting());
        assert!(!c.locomotion.can_jump());
        assert!(!c.jump());

        // Still requested, but the gate keeps sprint off while exhausted
        c.tick(&world, DT);
        assert!(!c.locomotion.is_sprinting());
        assert_eq!(c.locomotion.max_speed(), 75.0);
    }

    #[test]
    fn test_slide_needs_grounded_sprint() {
        let world = flat_world();
        let mut c = character();
        assert!(!c.can_slide());
        c.request_sprint(&world);
        c.tick(&world, DT);
        assert!(c.start_slide());
        assert!(c.locomotion.is_sliding());
    }

    #[test]
    fn test_register_is_unique() {
        let mut c = character();
        let ladder = InteractiveActor::Ladder(Rc::new(Ladder::new(Vec3::ZERO, 0.0, 300.0)));
        c.register_interactive(ladder.clone());
        c.register_interactive(ladder.clone());
        assert!(c.available_ladder().is_some());
        assert!(c.available_zipline().is_none());

        c.unregister_interactive(&ladder);
        assert!(c.available_ladder().is_none());
    }

    #[test]
    fn test_interact_with_ladder_toggles() {
        let world = flat_world();
        let mut c = character();
        assert!(!c.interact_with_ladder(&world));

        c.register_interactive(InteractiveActor::Ladder(Rc::new(Ladder::new(
            Vec3::new(100.0, 0.0, 0.0),
            180.0,
            400.0,
        ))));
        assert!(c.interact_with_ladder(&world));
        assert!(c.locomotion.is_on_ladder());

        c.climb_ladder_up(1.0);
        c.tick(&world, DT);
        assert!(c.body.velocity().z > 0.0);

        assert!(c.interact_with_ladder(&world));
        assert!(!c.locomotion.is_on_ladder());
        assert_eq!(c.locomotion.base_mode(), BaseMode::Airborne);
    }

    #[test]
    fn test_cannot_jump_on_ladder() {
        let world = flat_world();
        let mut c = character();
        c.register_interactive(InteractiveActor::Ladder(Rc::new(Ladder::new(
            Vec3::new(100.0, 0.0, 0.0),
            180.0,
            400.0,
        ))));
        assert!(c.interact_with_ladder(&world));
        let base = c.locomotion.base_mode();

        assert!(!c.locomotion.can_jump());
        assert!(!c.jump());
        assert_eq!(c.locomotion.base_mode(), base);

        c.tick(&world, DT);
        assert!(c.locomotion.is_on_ladder());
        assert!(c.body.velocity().z <= c.locomotion.max_speed() + 1e-3);
    }

    #[test]
    fn test_interact_with_zipline_toggles() {
        let mut c = character();
        let zipline = Zipline::new(Vec3::new(0.0, 0.0, 400.0), Vec3::new(1000.0, 0.0, 300.0));
        c.register_interactive(InteractiveActor::Zipline(Rc::new(zipline)));

        assert!(c.interact_with_zipline());
        assert_eq!(c.locomotion.custom_mode(), CustomMode::ZiplineTraverse);
        assert!(c.interact_with_zipline());
        assert_eq!(c.locomotion.custom_mode(), CustomMode::None);
    }

    #[test]
    fn test_requested_wall_run_starts_on_wall_hit() {
        let (world, _) = wall_world();
        let mut c = character();
        c.request_wall_run();
        assert!(c.is_wall_run_requested());

        c.add_movement_input(Vec3::new(1.0, 0.5, 0.0).normalize(), 1.0);
        c.tick(&world, DT);
        assert!(c.jump());

        for _ in 0..60 {
            if c.locomotion.is_wall_running() {
                break;
            }
            c.tick(&world, DT);
        }
        assert!(c.locomotion.is_wall_running());
        assert!(!c.is_wall_run_requested());
        assert!(c
            .locomotion
            .drain_events()
            .iter()
            .any(|e| matches!(e, LocomotionEvent::WallRunStarted(_))));

        // Second request while running jumps off
        c.request_wall_run();
        assert!(!c.locomotion.is_wall_running());
        assert!(c.locomotion.forced_rotation().is_active());
    }
}
