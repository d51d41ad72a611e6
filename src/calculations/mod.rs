pub mod due_dates;
pub mod reschedule;

use crate::calendar::DEFAULT_SEARCH_HORIZON_DAYS;
use serde::{Deserialize, Serialize};

pub use due_dates::{DueDateAssignment, assign_due_dates, days_needed};
pub use reschedule::{Reschedule, RescheduleOutcome, reschedule};

/// Knobs shared by both scheduling passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerOptions {
    /// Longest run of unavailable days a forward search may cross.
    pub horizon_days: i64,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            horizon_days: DEFAULT_SEARCH_HORIZON_DAYS,
        }
    }
}
