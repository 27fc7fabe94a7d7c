// Locomotion state machine
//
// Owns the base mode, the active custom mode (with its parameters), the
// modifier flags and the timers that end modes. The host calls `tick` once
// per frame and `update_slide` right after it.

mod ladder;
mod mantle;
mod slide;
mod wall_run;
mod zipline;

use std::mem;
use std::rc::{Rc, Weak};

use glam::Vec3;
use log::debug;

use super::config::LocomotionConfig;
use super::events::LocomotionEvent;
use super::ledge::LedgeProbe;
use super::rotation::ForcedRotation;
use super::state::{BaseMode, CustomMode, ModifierFlags, WallRunStopMethod};
use crate::engine::physics::{Capsule, CollisionQuery, KinematicBody};
use crate::game::interactive::LadderAnchor;
use crate::util::{Ramp, TimerQueue};

pub use ladder::calc_velocity;
pub use mantle::MantlingParameters;
pub use slide::SlideParameters;
pub use wall_run::WallRunParameters;
pub use zipline::ZiplineTraversal;

/// Timers owned by the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocomotionTimer {
    MantleComplete,
    WallRunTimeout,
    SlideTimeout,
}

/// The active custom mode together with its parameters
#[derive(Debug)]
enum ActiveMode {
    None,
    Mantling {
        params: MantlingParameters,
        /// Last known location of the target surface's owner
        surface_location: Vec3,
    },
    LadderClimb(Weak<dyn LadderAnchor>),
    ZiplineTraverse(ZiplineTraversal),
    WallRun(WallRunParameters),
}

impl ActiveMode {
    fn kind(&self) -> CustomMode {
        match self {
            ActiveMode::None => CustomMode::None,
            ActiveMode::Mantling { .. } => CustomMode::Mantling,
            ActiveMode::LadderClimb(_) => CustomMode::LadderClimb,
            ActiveMode::ZiplineTraverse(_) => CustomMode::ZiplineTraverse,
            ActiveMode::WallRun(_) => CustomMode::WallRun,
        }
    }
}

/// Per-frame handler of a custom mode
type ModeHandler = fn(&mut LocomotionStateMachine, &mut KinematicBody, &dyn CollisionQuery, f32);

/// Traversal locomotion for one character
#[derive(Debug)]
pub struct LocomotionStateMachine {
    config: LocomotionConfig,
    ledge_probe: LedgeProbe,
    base_mode: BaseMode,
    mode: ActiveMode,
    flags: ModifierFlags,
    slide: Option<SlideParameters>,
    /// Aim speed reported by the host while aiming
    aiming_speed: Option<f32>,
    jump_allowed: bool,
    zipline_ramp: Ramp,
    slide_ramp: Ramp,
    forced_rotation: ForcedRotation,
    timers: TimerQueue<LocomotionTimer>,
    events: Vec<LocomotionEvent>,
}

impl Default for LocomotionStateMachine {
    fn default() -> Self {
        Self::new(LocomotionConfig::default())
    }
}

impl LocomotionStateMachine {
    pub fn new(config: LocomotionConfig) -> Self {
        Self {
            ledge_probe: LedgeProbe::new(config.ledge.clone()),
            zipline_ramp: Ramp::new(config.zipline.acceleration_curve.clone()),
            slide_ramp: Ramp::new(config.slide.speed_curve.clone()),
            config,
            base_mode: BaseMode::Grounded,
            mode: ActiveMode::None,
            flags: ModifierFlags::default(),
            slide: None,
            aiming_speed: None,
            jump_allowed: true,
            forced_rotation: ForcedRotation::default(),
            timers: TimerQueue::new(),
            events: Vec::with_capacity(16),
        }
    }

    /// Body matching this machine's standing capsule
    pub fn spawn_body(&self, location: Vec3) -> KinematicBody {
        let c = &self.config.character;
        KinematicBody::new(location, Capsule::new(c.capsule_radius, c.capsule_half_height))
    }

    pub fn config(&self) -> &LocomotionConfig {
        &self.config
    }

    pub fn ledge_probe(&self) -> &LedgeProbe {
        &self.ledge_probe
    }

    // Queries

    pub fn base_mode(&self) -> BaseMode {
        self.base_mode
    }

    pub fn custom_mode(&self) -> CustomMode {
        self.mode.kind()
    }

    pub fn is_on_ladder(&self) -> bool {
        self.custom_mode() == CustomMode::LadderClimb
    }

    pub fn is_on_zipline(&self) -> bool {
        self.custom_mode() == CustomMode::ZiplineTraverse
    }

    pub fn is_mantling(&self) -> bool {
        self.custom_mode() == CustomMode::Mantling
    }

    pub fn is_wall_running(&self) -> bool {
        self.custom_mode() == CustomMode::WallRun
    }

    pub fn is_sliding(&self) -> bool {
        self.flags.sliding
    }

    pub fn is_sprinting(&self) -> bool {
        self.flags.sprinting
    }

    pub fn is_out_of_stamina(&self) -> bool {
        self.flags.out_of_stamina
    }

    pub fn is_swimming(&self) -> bool {
        self.base_mode == BaseMode::Swimming
    }

    /// Airborne under ordinary simulation (no custom mode in control)
    pub fn is_falling(&self) -> bool {
        self.base_mode == BaseMode::Airborne && !self.custom_mode().is_active()
    }

    /// True while the host simulation must not integrate the body
    pub fn drives_body(&self) -> bool {
        self.custom_mode().is_active() || self.base_mode == BaseMode::Suspended
    }

    /// True while the host must not apply its own rotation-follows-movement
    pub fn overrides_rotation(&self) -> bool {
        self.forced_rotation.is_active() || self.is_on_ladder()
    }

    pub fn forced_rotation(&self) -> &ForcedRotation {
        &self.forced_rotation
    }

    /// Jumps come from the ground only; custom modes have their own jump-offs
    pub fn can_jump(&self) -> bool {
        self.jump_allowed && !self.custom_mode().is_active()
    }

    /// Whether sprint may start (stance checks included)
    pub fn can_sprint(&self, body: &KinematicBody) -> bool {
        !self.flags.out_of_stamina
            && !self.flags.sliding
            && !self.is_mantling()
            && !self.is_wall_running()
            && !self.is_falling()
            && !body.is_crouched()
    }

    pub fn current_ladder(&self) -> Option<Rc<dyn LadderAnchor>> {
        match &self.mode {
            ActiveMode::LadderClimb(ladder) => ladder.upgrade(),
            _ => None,
        }
    }

    /// Take every event queued since the last call
    pub fn drain_events(&mut self) -> Vec<LocomotionEvent> {
        mem::take(&mut self.events)
    }

    // Host notifications

    /// Report a base mode change from the host simulation
    pub fn set_base_mode(&mut self, body: &mut KinematicBody, mode: BaseMode) {
        if self.base_mode == mode {
            return;
        }

        let previous = self.base_mode;
        self.base_mode = mode;

        if mode == BaseMode::Swimming {
            let c = &self.config.character;
            body.set_capsule(Capsule::new(c.swimming_capsule_radius, c.swimming_capsule_half_height));
        } else if previous == BaseMode::Swimming {
            body.restore_default_capsule();
        }

        debug!("Base mode {:?} -> {:?}", previous, mode);
        self.events.push(LocomotionEvent::BaseModeChanged { from: previous, to: mode });
    }

    /// Aim speed of the equipped item while aiming, None otherwise
    pub fn set_aiming(&mut self, aim_speed: Option<f32>) {
        self.aiming_speed = aim_speed;
    }

    pub fn set_out_of_stamina(&mut self, out_of_stamina: bool) {
        if self.flags.out_of_stamina == out_of_stamina {
            return;
        }

        self.flags.out_of_stamina = out_of_stamina;
        if out_of_stamina {
            self.stop_sprint();
        }
        self.jump_allowed = !out_of_stamina;
        self.events.push(LocomotionEvent::OutOfStaminaChanged(out_of_stamina));
    }

    pub fn start_sprint(&mut self) -> bool {
        if self.flags.sprinting {
            return false;
        }
        self.flags.sprinting = true;
        self.events.push(LocomotionEvent::SprintChanged(true));
        true
    }

    pub fn stop_sprint(&mut self) -> bool {
        if !self.flags.sprinting {
            return false;
        }
        self.flags.sprinting = false;
        self.events.push(LocomotionEvent::SprintChanged(false));
        true
    }

    // Speed policy

    /// Maximum movement speed; the first matching rule wins
    pub fn max_speed(&self) -> f32 {
        let base = self.base_speed();
        if self.is_falling() {
            return base;
        }

        let sprinting = self.flags.sprinting;
        match self.custom_mode() {
            CustomMode::LadderClimb => {
                return if sprinting {
                    self.config.ladder.climbing_max_speed
                } else {
                    self.config.ladder.climbing_regular_speed
                };
            }
            CustomMode::WallRun => {
                return if sprinting { self.config.wall_run.max_speed } else { base };
            }
            _ => {}
        }

        if let Some(aim_speed) = self.aiming_speed {
            aim_speed
        } else if self.flags.out_of_stamina {
            self.config.speeds.out_of_stamina_speed
        } else if sprinting {
            self.config.speeds.sprint_speed
        } else {
            base
        }
    }

    fn base_speed(&self) -> f32 {
        match self.base_mode {
            BaseMode::Swimming => self.config.speeds.max_swim_speed,
            _ => self.config.speeds.max_walk_speed,
        }
    }

    // Frame update

    /// Per-frame physics hook: run the active mode's handler, the forced
    /// rotation, then any timers that expired this frame
    pub fn tick(&mut self, body: &mut KinematicBody, world: &dyn CollisionQuery, dt: f32) {
        self.timers.advance(dt);

        if let Some(handler) = Self::handler_for(self.custom_mode()) {
            handler(self, body, world, dt);
        }

        let rate = self.config.rotation.forced_rotation_rate;
        let tolerance = self.config.rotation.forced_rotation_tolerance;
        if let Some(rotation) = self.forced_rotation.apply(body.rotation(), rate, dt, tolerance) {
            body.set_rotation(rotation);
        }

        self.fire_timers(body, world);
    }

    fn handler_for(mode: CustomMode) -> Option<ModeHandler> {
        match mode {
            CustomMode::None => None,
            CustomMode::Mantling => Some(Self::phys_mantling),
            CustomMode::LadderClimb => Some(Self::phys_ladder),
            CustomMode::ZiplineTraverse => Some(Self::phys_zipline),
            CustomMode::WallRun => Some(Self::phys_wall_run),
        }
    }

    fn fire_timers(&mut self, body: &mut KinematicBody, world: &dyn CollisionQuery) {
        for timer in self.timers.drain_expired() {
            debug!("Timer fired: {:?}", timer);
            match timer {
                LocomotionTimer::MantleComplete => self.end_mantle(body),
                LocomotionTimer::WallRunTimeout => {
                    self.stop_wall_run(body, WallRunStopMethod::Fall);
                }
                LocomotionTimer::SlideTimeout => {
                    self.stop_slide(body, world);
                }
            }
        }
    }

    // Custom mode bookkeeping

    /// Tear down the active custom mode, if any. Teardown runs exactly once per mode.
    fn leave_custom_mode(&mut self, body: &mut KinematicBody) {
        let previous = mem::replace(&mut self.mode, ActiveMode::None);
        match &previous {
            ActiveMode::None => return,
            ActiveMode::Mantling { .. } => {
                self.timers.cancel(LocomotionTimer::MantleComplete);
            }
            ActiveMode::LadderClimb(_) => {}
            ActiveMode::ZiplineTraverse(_) => {
                self.zipline_ramp.stop();
            }
            ActiveMode::WallRun(_) => {
                self.timers.cancel(LocomotionTimer::WallRunTimeout);
                body.set_plane_constraint(None);
            }
        }

        let kind = previous.kind();
        debug!("Leaving custom mode {}", kind.name());
        self.events.push(LocomotionEvent::CustomModeExited(kind));
    }

    /// Install a new custom mode, tearing down the previous one first
    fn install_custom_mode(&mut self, body: &mut KinematicBody, mode: ActiveMode) {
        self.leave_custom_mode(body);
        let kind = mode.kind();
        self.mode = mode;
        debug!("Entering custom mode {}", kind.name());
        self.events.push(LocomotionEvent::CustomModeEntered(kind));
    }
}
