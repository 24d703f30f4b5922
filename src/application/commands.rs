//! Commands accepted by the cycle facade.

use crate::domain::foundation::ValidationError;

/// Command to start a new work cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCycleCommand {
    /// What the person is working on.
    pub task: String,
    /// Planned duration in minutes.
    pub planned_minutes: u32,
}

/// Inclusive duration range the input form accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationBounds {
    pub min_minutes: u32,
    pub max_minutes: u32,
}

impl Default for DurationBounds {
    fn default() -> Self {
        Self {
            min_minutes: 5,
            max_minutes: 60,
        }
    }
}

impl CreateCycleCommand {
    pub fn new(task: impl Into<String>, planned_minutes: u32) -> Self {
        Self {
            task: task.into(),
            planned_minutes,
        }
    }

    /// Form-level validation, run by the input collaborator before submitting.
    ///
    /// Trims the task and checks the duration against `bounds`. The facade
    /// itself does not enforce the bounds.
    pub fn validated(self, bounds: DurationBounds) -> Result<Self, ValidationError> {
        let task = self.task.trim().to_string();
        if task.is_empty() {
            return Err(ValidationError::empty_field("task"));
        }
        if !(bounds.min_minutes..=bounds.max_minutes).contains(&self.planned_minutes) {
            return Err(ValidationError::out_of_range(
                "planned_minutes",
                i64::from(bounds.min_minutes),
                i64::from(bounds.max_minutes),
                i64::from(self.planned_minutes),
            ));
        }
        Ok(Self {
            task,
            planned_minutes: self.planned_minutes,
        })
    }

    /// Minimal well-formedness the facade insists on regardless of caller.
    pub(crate) fn ensure_well_formed(&self) -> Result<(), ValidationError> {
        if self.task.trim().is_empty() {
            return Err(ValidationError::empty_field("task"));
        }
        if self.planned_minutes == 0 {
            return Err(ValidationError::out_of_range(
                "planned_minutes",
                1,
                i64::from(u32::MAX),
                0,
            ));
        }
        Ok(())
    }
}
