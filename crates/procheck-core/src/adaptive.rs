//! Adaptive check-in interval policy.
//!
//! Adjusts a task's check-in interval in response to check-in and
//! procrastination outcomes, with streak-based hysteresis against
//! oscillation: two consecutive on-task responses are required before the
//! interval relaxes (+2 min), while a single off-task response or
//! procrastination mark tightens it immediately (-3 min). The asymmetry
//! is intentional: drift is punished faster than focus is rewarded.

use serde::{Deserialize, Serialize};

use crate::storage::TaskProfile;

/// Interval for a task seen for the first time, in minutes.
pub const DEFAULT_INTERVAL_MIN: u32 = 10;
/// Lower interval bound, minutes.
pub const MIN_INTERVAL_MIN: u32 = 3;
/// Upper interval bound, minutes.
pub const MAX_INTERVAL_MIN: u32 = 30;
/// Relaxation step after a completed on-task streak, minutes.
pub const STEP_UP_MIN: u32 = 2;
/// Tightening step on any off-task outcome, minutes.
pub const STEP_DOWN_MIN: u32 = 3;
/// Consecutive on-task responses required before relaxing.
pub const STREAK_FOR_STEP_UP: u32 = 2;

/// An interval change produced by the policy. Carries the new value so
/// the caller can log it (`interval_adapt_up` / `interval_adapt_down`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Adaptation {
    Up { interval_min: u32 },
    Down { interval_min: u32 },
}

impl Adaptation {
    pub fn interval_min(&self) -> u32 {
        match *self {
            Adaptation::Up { interval_min } | Adaptation::Down { interval_min } => interval_min,
        }
    }
}

/// The adaptation policy. The defaults are the shipped behavior; the
/// struct exists so tests can exercise other step sizes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdaptivePolicy {
    pub min_interval_min: u32,
    pub max_interval_min: u32,
    pub step_up_min: u32,
    pub step_down_min: u32,
    pub streak_for_step_up: u32,
}

impl Default for AdaptivePolicy {
    fn default() -> Self {
        Self {
            min_interval_min: MIN_INTERVAL_MIN,
            max_interval_min: MAX_INTERVAL_MIN,
            step_up_min: STEP_UP_MIN,
            step_down_min: STEP_DOWN_MIN,
            streak_for_step_up: STREAK_FOR_STEP_UP,
        }
    }
}

impl AdaptivePolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one check-in outcome (or procrastination mark, which is the
    /// off-task branch) into the profile.
    ///
    /// Returns the adaptation when the interval actually changed; a
    /// no-op streak increment, or a step that clamps back to the same
    /// bound, returns `None` and must not be logged.
    pub fn respond(&self, profile: &mut TaskProfile, on_task: bool) -> Option<Adaptation> {
        let before = profile.interval_min;

        if on_task {
            profile.yes_streak += 1;
            if profile.yes_streak < self.streak_for_step_up {
                return None;
            }
            profile.yes_streak = 0;
            profile.interval_min = self.clamp(before + self.step_up_min);
            if profile.interval_min == before {
                return None;
            }
            tracing::debug!(interval_min = profile.interval_min, "interval adapted up");
            Some(Adaptation::Up {
                interval_min: profile.interval_min,
            })
        } else {
            profile.yes_streak = 0;
            profile.interval_min = self.clamp(before.saturating_sub(self.step_down_min));
            if profile.interval_min == before {
                return None;
            }
            tracing::debug!(interval_min = profile.interval_min, "interval adapted down");
            Some(Adaptation::Down {
                interval_min: profile.interval_min,
            })
        }
    }

    /// Manual override: set the interval directly (clamped) and reset the
    /// streak. Returns the clamped value; the caller logs `interval_set`
    /// unconditionally.
    pub fn override_interval(&self, profile: &mut TaskProfile, minutes: u32) -> u32 {
        profile.interval_min = self.clamp(minutes);
        profile.yes_streak = 0;
        profile.interval_min
    }

    fn clamp(&self, minutes: u32) -> u32 {
        minutes.clamp(self.min_interval_min, self.max_interval_min)
    }
}
