// Interactive environment actors
//
// Ladders and ziplines are geometry providers. The locomotion layer queries
// them through the anchor traits but never owns or mutates them.

mod ladder;
mod zipline;

use std::rc::Rc;

use glam::Vec3;

use crate::engine::physics::SurfaceId;

pub use ladder::Ladder;
pub use zipline::Zipline;

/// Geometry a character can climb
pub trait LadderAnchor {
    /// Base of the ladder in world space
    fn location(&self) -> Vec3;

    /// Climbing axis
    fn up(&self) -> Vec3;

    /// Direction the climbable face points toward
    fn forward(&self) -> Vec3;

    fn height(&self) -> f32;

    /// True while the character stands in the top interaction volume
    fn is_on_top(&self) -> bool;

    /// Where a character attaching from the top is placed
    fn top_attach_start_location(&self) -> Vec3;
}

/// Cable a character can ride
pub trait ZiplineAnchor {
    /// Fixed traversal direction (down the cable)
    fn direction(&self) -> Vec3;

    /// Closest point on the cable to `from`
    fn attach_point(&self, from: Vec3) -> Vec3;

    /// Whether a surface belongs to this zipline (poles, cable)
    fn owns_surface(&self, surface: SurfaceId) -> bool;
}

/// An actor currently in reach of a character
#[derive(Clone)]
pub enum InteractiveActor {
    Ladder(Rc<dyn LadderAnchor>),
    Zipline(Rc<dyn ZiplineAnchor>),
}

impl InteractiveActor {
    pub fn as_ladder(&self) -> Option<&Rc<dyn LadderAnchor>> {
        match self {
            InteractiveActor::Ladder(ladder) => Some(ladder),
            InteractiveActor::Zipline(_) => None,
        }
    }

    pub fn as_zipline(&self) -> Option<&Rc<dyn ZiplineAnchor>> {
        match self {
            InteractiveActor::Zipline(zipline) => Some(zipline),
            InteractiveActor::Ladder(_) => None,
        }
    }

    /// Identity comparison of the underlying actor
    pub fn is_same(&self, other: &InteractiveActor) -> bool {
        match (self, other) {
            (InteractiveActor::Ladder(a), InteractiveActor::Ladder(b)) => Rc::ptr_eq(a, b),
            (InteractiveActor::Zipline(a), InteractiveActor::Zipline(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl std::fmt::Debug for InteractiveActor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InteractiveActor::Ladder(l) => write!(f, "Ladder(height: {})", l.height()),
            InteractiveActor::Zipline(z) => write!(f, "Zipline(direction: {:?})", z.direction()),
        }
    }
}
