// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timed cross-fade between two prompts.

use serde::{Deserialize, Serialize};

/// Where an in-flight transition stands at a given time
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransitionProgress {
    /// Still blending; carries the blend weight in `[0, 1)`
    Blending(f64),
    /// Elapsed time reached the duration
    Complete,
}

/// A cross-fade from one prompt to another
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    /// Prompt being faded out
    pub from: String,
    /// Prompt being faded in
    pub to: String,
    /// Time the transition began, in seconds
    pub start: f64,
    /// Length in seconds; `0.0` is an instant cut
    pub duration: f64,
}

impl Transition {
    /// Create a new transition
    pub fn new(from: impl Into<String>, to: impl Into<String>, start: f64, duration: f64) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            start,
            duration,
        }
    }

    /// Seconds since the transition began, never negative
    pub fn elapsed(&self, now: f64) -> f64 {
        (now - self.start).max(0.0)
    }

    /// Time at which the transition completes
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    /// Evaluate the transition at `now`.
    ///
    /// The blend weight is a linear ramp over the duration. A non-positive
    /// duration completes immediately.
    pub fn progress(&self, now: f64) -> TransitionProgress {
        let elapsed = self.elapsed(now);
        if self.duration <= 0.0 || elapsed >= self.duration {
            TransitionProgress::Complete
        } else {
            TransitionProgress::Blending(elapsed / self.duration)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_ramp() {
        let transition = Transition::new("A", "B", 10.0, 2.0);
        assert_eq!(transition.progress(10.0), TransitionProgress::Blending(0.0));
        assert_eq!(transition.progress(10.5), TransitionProgress::Blending(0.25));
        assert_eq!(transition.progress(11.0), TransitionProgress::Blending(0.5));
        assert_eq!(transition.progress(12.0), TransitionProgress::Complete);
        assert_eq!(transition.progress(40.0), TransitionProgress::Complete);
        assert_eq!(transition.end(), 12.0);
    }

    #[test]
    fn test_zero_duration_is_instant() {
        let transition = Transition::new("A", "B", 5.0, 0.0);
        assert_eq!(transition.progress(5.0), TransitionProgress::Complete);
    }

    #[test]
    fn test_clock_behind_start() {
        let transition = Transition::new("A", "B", 5.0, 1.0);
        assert_eq!(transition.elapsed(4.0), 0.0);
        assert_eq!(transition.progress(4.0), TransitionProgress::Blending(0.0));
    }

    #[test]
    fn test_monotonic() {
        let transition = Transition::new("A", "B", 0.0, 3.0);
        let mut last = 0.0;
        for step in 0..30 {
            let now = step as f64 * 0.1;
            if let TransitionProgress::Blending(weight) = transition.progress(now) {
                assert!(weight >= last);
                assert!((0.0..1.0).contains(&weight));
                last = weight;
            }
        }
    }
}
