use crate::error::ScheduleError;
use crate::item::WorkItem;
use std::collections::HashSet;

fn invalid(message: String) -> ScheduleError {
    ScheduleError::InvalidItems(message)
}

/// Checks the progress fields. Effort is not checked here: a missing, zero,
/// negative or non-finite estimate is scheduled as a single day.
pub fn validate_item(item: &WorkItem) -> Result<(), ScheduleError> {
    if item.time_spent_minutes < 0 {
        return Err(invalid(format!(
            "item {} has negative time_spent_minutes {}",
            item.sequence_index, item.time_spent_minutes
        )));
    }

    if item.completed_at.is_some() && !item.is_completed {
        return Err(invalid(format!(
            "item {} has completed_at but is not marked completed",
            item.sequence_index
        )));
    }

    Ok(())
}

/// Scheduling only needs a total order; per-item effort oddities are absorbed
/// by `days_needed`.
pub fn validate_unique_indices(items: &[WorkItem]) -> Result<(), ScheduleError> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if !seen.insert(item.sequence_index) {
            return Err(invalid(format!(
                "duplicate sequence_index {}",
                item.sequence_index
            )));
        }
    }
    Ok(())
}

pub fn validate_item_collection(items: &[WorkItem]) -> Result<(), ScheduleError> {
    validate_unique_indices(items)?;
    items.iter().try_for_each(validate_item)
}

pub fn validate_budget(hours: f64) -> Result<(), ScheduleError> {
    if hours.is_finite() && hours > 0.0 {
        Ok(())
    } else {
        Err(ScheduleError::InvalidBudget { hours })
    }
}
