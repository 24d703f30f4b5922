//! Remaining-time presentation helpers.

use std::fmt;

/// Remaining time of a cycle, formatted as zero-padded `MM:SS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    remaining_seconds: u64,
}

impl Countdown {
    /// Computes `max(planned - passed, 0)`.
    pub fn new(planned_seconds: u64, seconds_passed: u64) -> Self {
        Self {
            remaining_seconds: planned_seconds.saturating_sub(seconds_passed),
        }
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.remaining_seconds
    }

    pub fn minutes(&self) -> u64 {
        self.remaining_seconds / 60
    }

    pub fn seconds(&self) -> u64 {
        self.remaining_seconds % 60
    }

    /// True when nothing is left on the clock.
    pub fn is_finished(&self) -> bool {
        self.remaining_seconds == 0
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.minutes(), self.seconds())
    }
}

/// Window title for the current countdown.
///
/// `MM:SS | <app>` while time remains, otherwise the bare app name.
pub fn window_title(app_name: &str, countdown: Option<Countdown>) -> String {
    match countdown {
        Some(countdown) if !countdown.is_finished() => format!("{} | {}", countdown, app_name),
        _ => app_name.to_string(),
    }
}
