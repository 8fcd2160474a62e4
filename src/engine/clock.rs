//! Frame clock management.
//!
//! Turns a monotonically increasing timestamp source into per-tick deltas:
//! - The first frame after creation or [`FrameClock::reset`] yields zero
//! - Later frames yield the gap to the previous timestamp in seconds
//! - Out-of-order timestamps yield a negative delta, which the engine skips

use std::time::Duration;

/// Previous-timestamp baseline owned by the tick driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameClock {
    /// Timestamp of the last observed frame, unset after a reset.
    previous: Option<Duration>,
    /// Frames observed since the last reset.
    frames: u64,
}

impl FrameClock {
    /// Create an unprimed clock.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            previous: None,
            frames: 0,
        }
    }

    /// Record a frame at `now` and return the delta since the previous one.
    #[must_use]
    pub fn delta(&mut self, now: Duration) -> f64 {
        let delta = match self.previous {
            Some(previous) if now >= previous => (now - previous).as_secs_f64(),
            Some(previous) => -(previous - now).as_secs_f64(),
            None => 0.0,
        };
        self.previous = Some(now);
        self.frames += 1;
        delta
    }

    /// Forget the baseline so the next frame yields zero.
    pub fn reset(&mut self) {
        self.previous = None;
        self.frames = 0;
    }

    /// Whether a baseline timestamp is held.
    #[must_use]
    pub const fn is_primed(&self) -> bool {
        self.previous.is_some()
    }

    /// Frames observed since the last reset.
    #[must_use]
    pub const fn frames(&self) -> u64 {
        self.frames
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_first_frame_is_zero() {
        let mut clock = FrameClock::new();
        assert!(!clock.is_primed());
        assert!(clock.delta(Duration::from_secs(100)).abs() < f64::EPSILON);
        assert!(clock.is_primed());
        assert_eq!(clock.frames(), 1);
    }

    #[test]
    fn test_clock_delta() {
        let mut clock = FrameClock::new();
        let _ = clock.delta(Duration::from_millis(1000));
        let dt = clock.delta(Duration::from_millis(1016));
        assert!((dt - 0.016).abs() < 1e-9);
        let dt = clock.delta(Duration::from_millis(1050));
        assert!((dt - 0.034).abs() < 1e-9);
        assert_eq!(clock.frames(), 3);
    }

    #[test]
    fn test_clock_backwards_is_negative() {
        let mut clock = FrameClock::new();
        let _ = clock.delta(Duration::from_millis(500));
        let dt = clock.delta(Duration::from_millis(400));
        assert!((dt + 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_clock_reset_forgets_baseline() {
        let mut clock = FrameClock::new();
        let _ = clock.delta(Duration::from_secs(1));
        clock.reset();
        assert!(!clock.is_primed());
        assert_eq!(clock.frames(), 0);
        // The gap since the last frame is not reported after a reset.
        assert!(clock.delta(Duration::from_secs(60)).abs() < f64::EPSILON);
    }
}
