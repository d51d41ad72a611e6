use chrono::NaiveDate;
use thiserror::Error;

/// Failures raised by the scheduler. Parsing problems never end up here;
/// they are reported through [`crate::date_parse::DateParseReport`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScheduleError {
    #[error("daily budget must be a positive number of hours (got {hours})")]
    InvalidBudget { hours: f64 },

    #[error(
        "no available day found for item {sequence_index} within {horizon_days} days of {searched_from}"
    )]
    Exhausted {
        sequence_index: i32,
        searched_from: NaiveDate,
        horizon_days: i64,
    },

    #[error(
        "item {sequence_index} needs {days_needed} working days, more than the {horizon_days}-day search horizon"
    )]
    EffortExceedsHorizon {
        sequence_index: i32,
        days_needed: i64,
        horizon_days: i64,
    },

    #[error("invalid work items: {0}")]
    InvalidItems(String),

    #[error("invalid availability rules: {0}")]
    InvalidRules(String),

    #[error("work item {0} not found")]
    ItemNotFound(i32),
}

impl ScheduleError {
    /// True when the failure comes from the caller's parameters rather than
    /// from the calendar running out of days.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ScheduleError::InvalidBudget { .. }
                | ScheduleError::InvalidItems(_)
                | ScheduleError::InvalidRules(_)
                | ScheduleError::ItemNotFound(_)
        )
    }
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },
}
