//! Timer configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::application::{DurationBounds, TimerServiceConfig};

const MAX_TICK_INTERVAL_MS: u64 = 60_000;

/// Tick cadence, window title, and duration choices
#[derive(Debug, Clone, Deserialize)]
pub struct TimerConfig {
    /// Milliseconds between reconciliation ticks
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Application name shown in the window title
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Duration offered when none is given
    #[serde(default = "default_minutes")]
    pub default_minutes: u32,

    /// Shortest duration the input accepts
    #[serde(default = "default_min_minutes")]
    pub min_minutes: u32,

    /// Longest duration the input accepts
    #[serde(default = "default_max_minutes")]
    pub max_minutes: u32,
}

impl TimerConfig {
    /// Get the tick interval as a Duration
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Duration range accepted by the input form
    pub fn bounds(&self) -> DurationBounds {
        DurationBounds {
            min_minutes: self.min_minutes,
            max_minutes: self.max_minutes,
        }
    }

    /// Settings for the timer service
    pub fn service_config(&self) -> TimerServiceConfig {
        TimerServiceConfig::default()
            .with_tick_interval(self.tick_interval())
            .with_app_name(self.app_name.clone())
    }

    /// Validate timer configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.tick_interval_ms == 0 || self.tick_interval_ms > MAX_TICK_INTERVAL_MS {
            return Err(ValidationError::InvalidTickInterval);
        }
        if self.app_name.trim().is_empty() {
            return Err(ValidationError::MissingRequired("timer.app_name"));
        }
        if self.min_minutes == 0
            || self.min_minutes > self.default_minutes
            || self.default_minutes > self.max_minutes
        {
            return Err(ValidationError::InvalidDurationBounds);
        }
        Ok(())
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            app_name: default_app_name(),
            default_minutes: default_minutes(),
            min_minutes: default_min_minutes(),
            max_minutes: default_max_minutes(),
        }
    }
}

fn default_tick_interval_ms() -> u64 {
    1000
}

fn default_app_name() -> String {
    "Work Cycles".to_string()
}

fn default_minutes() -> u32 {
    25
}

fn default_min_minutes() -> u32 {
    5
}

fn default_max_minutes() -> u32 {
    60
}
