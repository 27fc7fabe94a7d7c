// Shared math, curves, ramps and timers

pub mod curve;
pub mod math;
pub mod ramp;
pub mod timer;

pub use curve::{CurveError, CurveKey, FloatCurve, VectorCurve};
pub use math::{Rotator, UP};
pub use ramp::Ramp;
pub use timer::TimerQueue;
