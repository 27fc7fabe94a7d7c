use serde::{Deserialize, Serialize};

use super::trace::SurfaceId;

/// Trace channels a surface can block.
///
/// Ledge probing and wall running query their own channels so level designers
/// can mark which geometry is climbable or runnable independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollisionChannel {
    /// Generic line-of-sight and floor probes
    Visibility = 0b0000_0001,

    /// Character capsule movement and clearance checks
    Pawn = 0b0000_0010,

    /// Geometry that can be mantled onto
    Climbable = 0b0000_0100,

    /// Walls that support wall running
    WallRunnable = 0b0000_1000,
}

impl CollisionChannel {
    pub fn bit(self) -> u32 {
        self as u32
    }
}

/// Set of channels a surface blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ChannelMask(u32);

impl ChannelMask {
    pub const NONE: ChannelMask = ChannelMask(0);
    pub const ALL: ChannelMask = ChannelMask(0b0000_1111);

    /// Ordinary level geometry: blocks movement and visibility, nothing special
    pub const WORLD: ChannelMask =
        ChannelMask(CollisionChannel::Visibility as u32 | CollisionChannel::Pawn as u32);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits & Self::ALL.0)
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn with(self, channel: CollisionChannel) -> Self {
        Self(self.0 | channel.bit())
    }

    pub fn without(self, channel: CollisionChannel) -> Self {
        Self(self.0 & !channel.bit())
    }

    pub fn blocks(self, channel: CollisionChannel) -> bool {
        self.0 & channel.bit() != 0
    }
}

impl From<CollisionChannel> for ChannelMask {
    fn from(channel: CollisionChannel) -> Self {
        Self(channel.bit())
    }
}

/// What kind of object owns a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ObjectType {
    #[default]
    WorldStatic,
    /// Another character's capsule
    Pawn,
}

/// Named query presets for capsule overlaps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollisionProfile {
    /// The character's own profile, blocked by everything on the pawn channel
    Pawn,
    /// Like `Pawn` but other characters are ignored
    IgnoreOnlyPawn,
}

impl CollisionProfile {
    pub fn to_filter(self) -> QueryFilter {
        match self {
            CollisionProfile::Pawn => QueryFilter::channel(CollisionChannel::Pawn),
            CollisionProfile::IgnoreOnlyPawn => {
                QueryFilter::channel(CollisionChannel::Pawn).ignoring_pawns()
            }
        }
    }
}

/// Which surfaces a sweep or overlap considers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryFilter {
    pub channel: CollisionChannel,
    pub ignore_pawns: bool,
    pub ignored_surface: Option<SurfaceId>,
}

impl QueryFilter {
    pub fn channel(channel: CollisionChannel) -> Self {
        Self {
            channel,
            ignore_pawns: false,
            ignored_surface: None,
        }
    }

    pub fn ignoring_pawns(mut self) -> Self {
        self.ignore_pawns = true;
        self
    }

    pub fn ignoring(mut self, surface: SurfaceId) -> Self {
        self.ignored_surface = Some(surface);
        self
    }

    /// Whether a surface with these properties takes part in the query
    pub fn accepts(&self, surface: SurfaceId, blocks: ChannelMask, object_type: ObjectType) -> bool {
        if self.ignored_surface == Some(surface) {
            return false;
        }
        if self.ignore_pawns && object_type == ObjectType::Pawn {
            return false;
        }
        blocks.blocks(self.channel)
    }
}
