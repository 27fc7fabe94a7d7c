// Per-instance deadline list

/// A pending timer
#[derive(Debug, Clone, Copy)]
struct Timer<K> {
    kind: K,
    started_at: f32,
    deadline: f32,
}

/// Timers keyed by kind, polled by the owner once per frame.
///
/// At most one timer per kind is pending; scheduling an active kind restarts it.
#[derive(Debug, Clone)]
pub struct TimerQueue<K> {
    now: f32,
    timers: Vec<Timer<K>>,
}

impl<K> Default for TimerQueue<K> {
    fn default() -> Self {
        Self {
            now: 0.0,
            timers: Vec::new(),
        }
    }
}

impl<K: Copy + PartialEq> TimerQueue<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current clock in seconds
    pub fn now(&self) -> f32 {
        self.now
    }

    /// Advance the clock. Expired timers are collected by [`TimerQueue::drain_expired`].
    pub fn advance(&mut self, dt: f32) {
        self.now += dt.max(0.0);
    }

    pub fn schedule(&mut self, kind: K, delay: f32) {
        self.cancel(kind);
        self.timers.push(Timer {
            kind,
            started_at: self.now,
            deadline: self.now + delay.max(0.0),
        });
    }

    /// Returns true if a timer of this kind was pending
    pub fn cancel(&mut self, kind: K) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.kind != kind);
        self.timers.len() != before
    }

    pub fn is_active(&self, kind: K) -> bool {
        self.timers.iter().any(|t| t.kind == kind)
    }

    /// Seconds since the timer was scheduled
    pub fn elapsed(&self, kind: K) -> Option<f32> {
        self.find(kind).map(|t| self.now - t.started_at)
    }

    pub fn remaining(&self, kind: K) -> Option<f32> {
        self.find(kind).map(|t| (t.deadline - self.now).max(0.0))
    }

    /// Remove and return every expired timer, earliest deadline first
    pub fn drain_expired(&mut self) -> Vec<K> {
        let now = self.now;
        let mut expired: Vec<Timer<K>> = Vec::new();
        self.timers.retain(|t| {
            if t.deadline <= now {
                expired.push(*t);
                false
            } else {
                true
            }
        });
        expired.sort_by(|a, b| a.deadline.total_cmp(&b.deadline));
        expired.into_iter().map(|t| t.kind).collect()
    }

    pub fn clear(&mut self) {
        self.timers.clear();
    }

    fn find(&self, kind: K) -> Option<&Timer<K>> {
        self.timers.iter().find(|t| t.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Kind {
        A,
        B,
    }

    #[test]
    fn test_timer_fires_after_deadline() {
        let mut timers = TimerQueue::new();
        timers.schedule(Kind::A, 1.0);
        timers.advance(0.6);
        assert!(timers.drain_expired().is_empty());
        assert_relative_eq!(timers.elapsed(Kind::A).unwrap(), 0.6);
        timers.advance(0.6);
        assert_eq!(timers.drain_expired(), vec![Kind::A]);
        assert!(!timers.is_active(Kind::A));
    }

    #[test]
    fn test_expired_sorted_by_deadline() {
        let mut timers = TimerQueue::new();
        timers.schedule(Kind::A, 0.5);
        timers.schedule(Kind::B, 0.2);
        timers.advance(1.0);
        assert_eq!(timers.drain_expired(), vec![Kind::B, Kind::A]);
    }

    #[test]
    fn test_reschedule_restarts() {
        let mut timers = TimerQueue::new();
        timers.schedule(Kind::A, 1.0);
        timers.advance(0.8);
        timers.schedule(Kind::A, 1.0);
        timers.advance(0.8);
        assert!(timers.drain_expired().is_empty());
        assert_relative_eq!(timers.remaining(Kind::A).unwrap(), 0.2, epsilon = 1e-5);
    }

    #[test]
    fn test_cancel() {
        let mut timers = TimerQueue::new();
        timers.schedule(Kind::A, 0.1);
        assert!(timers.cancel(Kind::A));
        assert!(!timers.cancel(Kind::A));
        timers.advance(1.0);
        assert!(timers.drain_expired().is_empty());
    }
}
