// Locomotion modes and modifier flags

use serde::{Deserialize, Serialize};

/// Coarse physics state, mostly maintained by the host simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BaseMode {
    /// Walking on a floor
    Grounded,
    /// Jumping or falling
    Airborne,
    Swimming,
    /// The host must not integrate motion; locomotion drives the body manually
    Suspended,
}

impl Default for BaseMode {
    fn default() -> Self {
        Self::Grounded
    }
}

/// Specialized movement owned by the locomotion layer. At most one is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CustomMode {
    None,
    Mantling,
    LadderClimb,
    ZiplineTraverse,
    WallRun,
}

impl Default for CustomMode {
    fn default() -> Self {
        Self::None
    }
}

impl CustomMode {
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Short label for logs and debug overlays
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Mantling => "mantling",
            Self::LadderClimb => "ladder",
            Self::ZiplineTraverse => "zipline",
            Self::WallRun => "wall_run",
        }
    }
}

/// How a character leaves a ladder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LadderDetachMethod {
    Fall,
    ReachingTop,
    ReachingBottom,
    JumpOff,
}

/// Which side of the character the wall is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WallRunSide {
    None,
    Left,
    Right,
}

impl Default for WallRunSide {
    fn default() -> Self {
        Self::None
    }
}

/// How a wall run ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WallRunStopMethod {
    Fall,
    JumpOff,
}

/// Modifiers layered on top of ordinary movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModifierFlags {
    pub sprinting: bool,
    pub out_of_stamina: bool,
    pub sliding: bool,
}
