use super::SchedulerOptions;
use crate::calendar::AvailabilityRules;
use crate::error::{ScheduleError, ScheduleResult};
use crate::item::WorkItem;
use crate::item_validation;
use chrono::{Duration, NaiveDate};
use tracing::debug;

/// Whole available days an item occupies: effort over budget, rounded half
/// to even, never less than one. Missing or non-positive effort is one day.
pub fn days_needed(estimated_effort_hours: Option<f64>, daily_budget_hours: f64) -> i64 {
    let Some(hours) = estimated_effort_hours.filter(|h| h.is_finite() && *h > 0.0) else {
        return 1;
    };
    let days = (hours / daily_budget_hours).round_ties_even();
    // Saturates on overflow; oversized items are caught by the horizon check.
    (days as i64).max(1)
}

/// Serial due-date assignment: each item consumes its full allotment of
/// available days and the next item starts on the first available day after
/// the previous due date.
pub struct DueDateAssignment<'a> {
    rules: &'a AvailabilityRules,
    daily_budget_hours: f64,
    options: SchedulerOptions,
}

impl<'a> DueDateAssignment<'a> {
    pub fn new(rules: &'a AvailabilityRules, daily_budget_hours: f64) -> Self {
        Self {
            rules,
            daily_budget_hours,
            options: SchedulerOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SchedulerOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the items in `sequence_index` order with `due_date` set.
    pub fn execute(&self, start: NaiveDate, items: &[WorkItem]) -> ScheduleResult<Vec<WorkItem>> {
        item_validation::validate_budget(self.daily_budget_hours)?;
        item_validation::validate_unique_indices(items)?;

        let mut ordered = items.to_vec();
        ordered.sort_by_key(|item| item.sequence_index);

        let horizon = self.options.horizon_days;
        let mut cursor = start;
        for idx in 0..ordered.len() {
            let sequence_index = ordered[idx].sequence_index;
            let needed = days_needed(ordered[idx].estimated_effort_hours, self.daily_budget_hours);
            if needed > horizon {
                return Err(ScheduleError::EffortExceedsHorizon {
                    sequence_index,
                    days_needed: needed,
                    horizon_days: horizon,
                });
            }

            let due = self.find_due_date(sequence_index, cursor, needed)?;
            debug!(sequence_index, days_needed = needed, %cursor, %due, "assigned due date");
            ordered[idx].due_date = Some(due);

            if let Some(next) = ordered.get(idx + 1) {
                cursor = self.rules.next_available(due, horizon).ok_or_else(|| {
                    ScheduleError::Exhausted {
                        sequence_index: next.sequence_index,
                        searched_from: due.succ_opt().unwrap_or(due),
                        horizon_days: horizon,
                    }
                })?;
            }
        }

        Ok(ordered)
    }

    /// Walk forward from `from`, counting available days until `needed` of
    /// them have been seen. `from` itself counts when available.
    fn find_due_date(
        &self,
        sequence_index: i32,
        from: NaiveDate,
        needed: i64,
    ) -> ScheduleResult<NaiveDate> {
        let exhausted = || ScheduleError::Exhausted {
            sequence_index,
            searched_from: from,
            horizon_days: self.options.horizon_days,
        };

        let mut counted = 0;
        let mut gap = 0;
        let mut day = from;
        loop {
            if self.rules.is_available(day) {
                counted += 1;
                gap = 0;
                if counted == needed {
                    return Ok(day);
                }
            } else {
                gap += 1;
                if gap > self.options.horizon_days {
                    return Err(exhausted());
                }
            }
            day = day
                .checked_add_signed(Duration::days(1))
                .ok_or_else(exhausted)?;
        }
    }
}

/// Assign due dates with the default search horizon.
pub fn assign_due_dates(
    start: NaiveDate,
    items: &[WorkItem],
    daily_budget_hours: f64,
    rules: &AvailabilityRules,
) -> ScheduleResult<Vec<WorkItem>> {
    DueDateAssignment::new(rules, daily_budget_hours).execute(start, items)
}
