// Keyed curves sampled by time

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::math::lerp;

/// Curve validation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CurveError {
    #[error("Curve has no keys")]
    Empty,

    #[error("Curve key {0} is not finite")]
    NonFinite(usize),

    #[error("Curve keys are not sorted by time at index {0}")]
    Unsorted(usize),
}

/// A single (time, value) key
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveKey {
    pub time: f32,
    pub value: f32,
}

impl CurveKey {
    pub const fn new(time: f32, value: f32) -> Self {
        Self { time, value }
    }
}

/// Piecewise-linear scalar curve.
///
/// Sampling before the first key or after the last returns the end values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CurveKey>", into = "Vec<CurveKey>")]
pub struct FloatCurve {
    keys: Vec<CurveKey>,
}

impl FloatCurve {
    pub fn new(keys: Vec<CurveKey>) -> Result<Self, CurveError> {
        if keys.is_empty() {
            return Err(CurveError::Empty);
        }
        for (i, key) in keys.iter().enumerate() {
            if !key.time.is_finite() || !key.value.is_finite() {
                return Err(CurveError::NonFinite(i));
            }
            if i > 0 && key.time < keys[i - 1].time {
                return Err(CurveError::Unsorted(i));
            }
        }
        Ok(Self { keys })
    }

    /// Build from `(time, value)` pairs
    pub fn from_points(points: &[(f32, f32)]) -> Result<Self, CurveError> {
        Self::new(points.iter().map(|&(t, v)| CurveKey::new(t, v)).collect())
    }

    /// Straight 0 -> 1 over `duration` seconds
    pub fn linear(duration: f32) -> Self {
        Self {
            keys: vec![CurveKey::new(0.0, 0.0), CurveKey::new(duration.max(0.0), 1.0)],
        }
    }

    /// Authored (first, last) key times
    pub fn time_range(&self) -> (f32, f32) {
        match (self.keys.first(), self.keys.last()) {
            (Some(first), Some(last)) => (first.time, last.time),
            _ => (0.0, 0.0),
        }
    }

    pub fn value(&self, time: f32) -> f32 {
        let Some(first) = self.keys.first() else {
            return 0.0;
        };
        if time <= first.time {
            return first.value;
        }

        for pair in self.keys.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if time <= b.time {
                let span = b.time - a.time;
                if span <= f32::EPSILON {
                    return b.value;
                }
                return lerp(a.value, b.value, (time - a.time) / span);
            }
        }

        self.keys.last().map_or(first.value, |k| k.value)
    }
}

impl TryFrom<Vec<CurveKey>> for FloatCurve {
    type Error = CurveError;

    fn try_from(keys: Vec<CurveKey>) -> Result<Self, Self::Error> {
        Self::new(keys)
    }
}

impl From<FloatCurve> for Vec<CurveKey> {
    fn from(curve: FloatCurve) -> Self {
        curve.keys
    }
}

/// Three scalar curves sampled together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorCurve {
    pub x: FloatCurve,
    pub y: FloatCurve,
    pub z: FloatCurve,
}

impl VectorCurve {
    pub fn new(x: FloatCurve, y: FloatCurve, z: FloatCurve) -> Self {
        Self { x, y, z }
    }

    /// Union of the three channels' time ranges
    pub fn time_range(&self) -> (f32, f32) {
        let (x0, x1) = self.x.time_range();
        let (y0, y1) = self.y.time_range();
        let (z0, z1) = self.z.time_range();
        (x0.min(y0).min(z0), x1.max(y1).max(z1))
    }

    pub fn value(&self, time: f32) -> Vec3 {
        Vec3::new(self.x.value(time), self.y.value(time), self.z.value(time))
    }
}
