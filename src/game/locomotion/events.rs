use glam::Vec3;

use super::state::{BaseMode, CustomMode, LadderDetachMethod, WallRunSide, WallRunStopMethod};

/// Notification for the host, queued by the state machine and polled with
/// [`LocomotionStateMachine::drain_events`](super::LocomotionStateMachine::drain_events)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocomotionEvent {
    BaseModeChanged { from: BaseMode, to: BaseMode },
    CustomModeEntered(CustomMode),
    CustomModeExited(CustomMode),
    MantleStarted {
        /// Ledge height above the capsule bottom
        height: f32,
        high: bool,
        start_time: f32,
        duration: f32,
    },
    DetachedFromLadder(LadderDetachMethod),
    WallRunStarted(WallRunSide),
    WallRunStopped(WallRunStopMethod),
    SlideStarted,
    SlideEnded { crouched: bool },
    SprintChanged(bool),
    OutOfStaminaChanged(bool),
    Launched(Vec3),
}
