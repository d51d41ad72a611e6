use super::SchedulerOptions;
use super::due_dates::DueDateAssignment;
use crate::calendar::AvailabilityRules;
use crate::error::ScheduleResult;
use crate::item::WorkItem;
use crate::item_validation;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RescheduleOutcome {
    /// Every item, completed and rescheduled, in `sequence_index` order.
    pub items: Vec<WorkItem>,
    /// Sequence indices that went through the scheduler.
    pub rescheduled: Vec<i32>,
    /// Subset of `rescheduled` whose due date actually moved.
    pub changed: Vec<i32>,
}

impl RescheduleOutcome {
    /// Items that need writing back to storage.
    pub fn changed_items(&self) -> impl Iterator<Item = &WorkItem> {
        self.items
            .iter()
            .filter(|item| self.changed.contains(&item.sequence_index))
    }
}

/// Re-run due-date assignment over the incomplete items only. Completed items
/// are carried through untouched, including their historical due dates.
pub struct Reschedule<'a> {
    rules: &'a AvailabilityRules,
    daily_budget_hours: f64,
    options: SchedulerOptions,
}

impl<'a> Reschedule<'a> {
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

    pub fn execute(
        &self,
        new_start: NaiveDate,
        items: &[WorkItem],
    ) -> ScheduleResult<RescheduleOutcome> {
        item_validation::validate_budget(self.daily_budget_hours)?;
        // Indices only; completed items' other fields are never inspected.
        item_validation::validate_unique_indices(items)?;

        let (completed, incomplete): (Vec<WorkItem>, Vec<WorkItem>) =
            items.iter().cloned().partition(|item| item.is_completed);

        let previous: HashMap<i32, Option<NaiveDate>> = incomplete
            .iter()
            .map(|item| (item.sequence_index, item.due_date))
            .collect();

        let scheduled = DueDateAssignment::new(self.rules, self.daily_budget_hours)
            .with_options(self.options)
            .execute(new_start, &incomplete)?;

        let rescheduled: Vec<i32> = scheduled.iter().map(|item| item.sequence_index).collect();
        let changed: Vec<i32> = scheduled
            .iter()
            .filter(|item| previous.get(&item.sequence_index) != Some(&item.due_date))
            .map(|item| item.sequence_index)
            .collect();

        let mut merged = completed;
        merged.extend(scheduled);
        merged.sort_by_key(|item| item.sequence_index);

        info!(
            %new_start,
            kept = merged.len() - rescheduled.len(),
            rescheduled = rescheduled.len(),
            changed = changed.len(),
            "rescheduled incomplete items"
        );

        Ok(RescheduleOutcome {
            items: merged,
            rescheduled,
            changed,
        })
    }
}

/// Reschedule with the default search horizon.
pub fn reschedule(
    items: &[WorkItem],
    new_start: NaiveDate,
    new_daily_budget_hours: f64,
    new_rules: &AvailabilityRules,
) -> ScheduleResult<RescheduleOutcome> {
    Reschedule::new(new_rules, new_daily_budget_hours).execute(new_start, items)
}
