// Time-indexed interpolation between two scalar values

use std::rc::Rc;

use super::curve::FloatCurve;
use super::math::lerp;

/// Interpolates `from -> to` using a 0..1 alpha curve sampled by elapsed time.
///
/// Without a curve the ramp is instantaneous and always yields `to`.
#[derive(Debug, Clone, Default)]
pub struct Ramp {
    curve: Option<Rc<FloatCurve>>,
    from: f32,
    to: f32,
    time: f32,
    playing: bool,
}

impl Ramp {
    pub fn new(curve: Option<Rc<FloatCurve>>) -> Self {
        Self {
            curve,
            ..Self::default()
        }
    }

    pub fn has_curve(&self) -> bool {
        self.curve.is_some()
    }

    /// Restart from time zero between the given endpoints
    pub fn play_from_start(&mut self, from: f32, to: f32) {
        self.from = from;
        self.to = to;
        self.time = self.start_time();
        self.playing = true;
    }

    pub fn stop(&mut self) {
        self.playing = false;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    /// Advance by `dt` (while playing) and return the new value
    pub fn tick(&mut self, dt: f32) -> f32 {
        if self.playing {
            let end = self.end_time();
            self.time = (self.time + dt).min(end);
            if self.time >= end {
                self.playing = false;
            }
        }
        self.value()
    }

    pub fn value(&self) -> f32 {
        match &self.curve {
            Some(curve) => lerp(self.from, self.to, curve.value(self.time)),
            None => self.to,
        }
    }

    fn start_time(&self) -> f32 {
        self.curve.as_ref().map_or(0.0, |c| c.time_range().0)
    }

    fn end_time(&self) -> f32 {
        self.curve.as_ref().map_or(0.0, |c| c.time_range().1)
    }
}
