// Traversal locomotion
//
// Layered on top of the host's ordinary ground/air/swim movement:
// - Custom modes (mantle, ladder, zipline, wall run), at most one at a time
// - Modifiers (sprint, slide, out of stamina)
// - Ledge detection for mantling
// - Forced rotation after jump-offs

pub mod config;
pub mod events;
pub mod ledge;
pub mod machine;
pub mod rotation;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use config::{ConfigError, LocomotionConfig, BASE_LOCOMOTION};
pub use events::LocomotionEvent;
pub use ledge::{LedgeDescription, LedgeProbe};
pub use machine::{LocomotionStateMachine, LocomotionTimer, MantlingParameters, SlideParameters, WallRunParameters};
pub use rotation::ForcedRotation;
pub use state::{BaseMode, CustomMode, LadderDetachMethod, ModifierFlags, WallRunSide, WallRunStopMethod};
