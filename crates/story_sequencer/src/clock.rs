// SPDX-License-Identifier: MIT OR Apache-2.0
//! Time sources for the pipeline wrapper.

use std::time::Instant;

/// Source of monotonically non-decreasing time, in seconds
pub trait Clock {
    /// Current time in seconds
    fn now(&self) -> f64;
}

/// Wall clock measured from construction
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Create a clock starting at zero now
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Clock driven by the caller, for scripted sessions and tests
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualClock {
    now: f64,
}

impl ManualClock {
    /// Create a clock at the given time
    pub fn at(now: f64) -> Self {
        Self { now }
    }

    /// Move to `now`. Moving backwards is ignored.
    pub fn set(&mut self, now: f64) {
        if now < self.now {
            tracing::debug!("Ignoring clock step backwards: {} -> {}", self.now, now);
            return;
        }
        self.now = now;
    }

    /// Move forward by `delta` seconds
    pub fn advance(&mut self, delta: f64) {
        self.set(self.now + delta);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_is_monotonic() {
        let mut clock = ManualClock::at(1.0);
        clock.advance(0.5);
        assert_eq!(clock.now(), 1.5);

        clock.set(0.2);
        assert_eq!(clock.now(), 1.5);

        clock.set(3.0);
        assert_eq!(clock.now(), 3.0);
    }

    #[test]
    fn test_system_clock_advances() {
        let clock = SystemClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(a >= 0.0);
        assert!(b >= a);
    }
}
