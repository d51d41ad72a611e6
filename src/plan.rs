use crate::calculations::{Reschedule, RescheduleOutcome, SchedulerOptions};
use crate::calendar::AvailabilityRules;
use crate::error::{ScheduleError, ScheduleResult};
use crate::item::WorkItem;
use crate::item_validation;
use crate::metadata::{PlanMetadata, ScheduleParameters};
use crate::status::{self, DateStatus, StatusDisplay};
use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressStats {
    pub total_items: usize,
    pub completed_items: usize,
    pub progress_percentage: f64,
    pub time_spent_minutes: i64,
    pub time_spent_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub item_count: usize,
    pub completed_count: usize,
    pub overdue_count: usize,
    pub due_today_count: usize,
    pub first_due: Option<NaiveDate>,
    pub last_due: Option<NaiveDate>,
}

impl PlanSummary {
    pub fn to_cli_summary(&self) -> String {
        let mut parts = Vec::new();
        parts.push(format!("items={}", self.item_count));
        parts.push(format!("done={}", self.completed_count));
        if self.overdue_count > 0 {
            parts.push(format!("overdue={}", self.overdue_count));
        }
        if self.due_today_count > 0 {
            parts.push(format!("today={}", self.due_today_count));
        }
        if let Some(date) = self.first_due {
            parts.push(format!("first={date}"));
        }
        if let Some(date) = self.last_due {
            parts.push(format!("last={date}"));
        }
        parts.join(", ")
    }
}

/// A goal plan: ordered work items, the availability rules and the budget
/// they were scheduled with.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    metadata: PlanMetadata,
    items: Vec<WorkItem>,
    rules: AvailabilityRules,
    parameters: ScheduleParameters,
    options: SchedulerOptions,
}

impl Plan {
    pub(crate) fn from_parts(
        metadata: PlanMetadata,
        mut items: Vec<WorkItem>,
        parameters: ScheduleParameters,
        rules: AvailabilityRules,
    ) -> ScheduleResult<Self> {
        item_validation::validate_budget(parameters.daily_budget_hours)?;
        item_validation::validate_item_collection(&items)?;
        items.sort_by_key(|item| item.sequence_index);
        Ok(Self {
            metadata,
            items,
            rules,
            parameters,
            options: SchedulerOptions::default(),
        })
    }

    /// An empty plan; items are added later and scheduled with [`Plan::refresh`].
    pub fn new(
        metadata: PlanMetadata,
        parameters: ScheduleParameters,
        rules: AvailabilityRules,
    ) -> ScheduleResult<Self> {
        Self::from_parts(metadata, Vec::new(), parameters, rules)
    }

    /// Build a plan and assign every item its due date.
    pub fn create(
        metadata: PlanMetadata,
        items: Vec<WorkItem>,
        parameters: ScheduleParameters,
        rules: AvailabilityRules,
    ) -> ScheduleResult<Self> {
        let mut plan = Self::from_parts(metadata, items, parameters, rules)?;
        plan.refresh()?;
        info!(
            goal = %plan.metadata.goal,
            items = plan.items.len(),
            start = %plan.parameters.start_date,
            "plan created"
        );
        Ok(plan)
    }

    pub fn with_options(mut self, options: SchedulerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn metadata(&self) -> &PlanMetadata {
        &self.metadata
    }

    pub fn items(&self) -> &[WorkItem] {
        &self.items
    }

    pub fn rules(&self) -> &AvailabilityRules {
        &self.rules
    }

    pub fn parameters(&self) -> &ScheduleParameters {
        &self.parameters
    }

    pub fn start_date(&self) -> NaiveDate {
        self.parameters.start_date
    }

    pub fn daily_budget_hours(&self) -> f64 {
        self.parameters.daily_budget_hours
    }

    pub fn options(&self) -> SchedulerOptions {
        self.options
    }

    pub fn set_goal(&mut self, goal: impl Into<String>) {
        self.metadata.goal = goal.into();
    }

    pub fn find_item(&self, sequence_index: i32) -> Option<&WorkItem> {
        self.items
            .iter()
            .find(|item| item.sequence_index == sequence_index)
    }

    fn find_item_mut(&mut self, sequence_index: i32) -> ScheduleResult<&mut WorkItem> {
        self.items
            .iter_mut()
            .find(|item| item.sequence_index == sequence_index)
            .ok_or(ScheduleError::ItemNotFound(sequence_index))
    }

    /// Insert a new item or replace the one with the same `sequence_index`.
    /// Due dates are left as given until the next refresh.
    pub fn upsert_item(&mut self, item: WorkItem) -> ScheduleResult<()> {
        item_validation::validate_item(&item)?;
        match self
            .items
            .binary_search_by_key(&item.sequence_index, |existing| existing.sequence_index)
        {
            Ok(pos) => self.items[pos] = item,
            Err(pos) => self.items.insert(pos, item),
        }
        Ok(())
    }

    pub fn remove_item(&mut self, sequence_index: i32) -> bool {
        let before = self.items.len();
        self.items
            .retain(|item| item.sequence_index != sequence_index);
        self.items.len() != before
    }

    /// Re-run the scheduler with the current parameters. Completed items keep
    /// their due dates.
    pub fn refresh(&mut self) -> ScheduleResult<RescheduleOutcome> {
        let outcome = Reschedule::new(&self.rules, self.parameters.daily_budget_hours)
            .with_options(self.options)
            .execute(self.parameters.start_date, &self.items)?;
        self.items = outcome.items.clone();
        Ok(outcome)
    }

    /// Reschedule incomplete items from `new_start`. The budget and rule set
    /// replace the old ones only when scheduling succeeds.
    pub fn reschedule(
        &mut self,
        new_start: NaiveDate,
        new_daily_budget_hours: f64,
        new_rules: AvailabilityRules,
    ) -> ScheduleResult<RescheduleOutcome> {
        let outcome = Reschedule::new(&new_rules, new_daily_budget_hours)
            .with_options(self.options)
            .execute(new_start, &self.items)?;

        self.items = outcome.items.clone();
        self.rules = new_rules;
        self.parameters = ScheduleParameters {
            start_date: new_start,
            daily_budget_hours: new_daily_budget_hours,
        };
        Ok(outcome)
    }

    /// Toggle completion and add any time spent. Never touches `due_date`.
    pub fn set_completion(
        &mut self,
        sequence_index: i32,
        completed: bool,
        time_spent_minutes: i64,
        now: NaiveDateTime,
    ) -> ScheduleResult<&WorkItem> {
        if time_spent_minutes < 0 {
            return Err(ScheduleError::InvalidItems(format!(
                "time spent must not be negative (got {time_spent_minutes})"
            )));
        }
        let item = self.find_item_mut(sequence_index)?;
        if completed {
            item.mark_completed(now);
        } else {
            item.mark_incomplete();
        }
        item.add_time_spent(time_spent_minutes);
        Ok(item)
    }

    pub fn log_time(&mut self, sequence_index: i32, minutes: i64) -> ScheduleResult<()> {
        if minutes < 0 {
            return Err(ScheduleError::InvalidItems(format!(
                "time spent must not be negative (got {minutes})"
            )));
        }
        self.find_item_mut(sequence_index)?.add_time_spent(minutes);
        Ok(())
    }

    pub fn item_status(&self, sequence_index: i32, today: NaiveDate) -> Option<StatusDisplay> {
        self.find_item(sequence_index)
            .map(|item| status::classify(item.due_date, item.is_completed, today))
    }

    pub fn progress_stats(&self) -> ProgressStats {
        let total_items = self.items.len();
        let completed_items = self.items.iter().filter(|item| item.is_completed).count();
        let time_spent_minutes: i64 = self.items.iter().map(|item| item.time_spent_minutes).sum();
        let progress_percentage = if total_items > 0 {
            completed_items as f64 / total_items as f64 * 100.0
        } else {
            0.0
        };
        ProgressStats {
            total_items,
            completed_items,
            progress_percentage,
            time_spent_minutes,
            time_spent_hours: (time_spent_minutes as f64 / 60.0 * 10.0).round() / 10.0,
        }
    }

    pub fn summary(&self, today: NaiveDate) -> PlanSummary {
        let mut summary = PlanSummary {
            item_count: self.items.len(),
            completed_count: 0,
            overdue_count: 0,
            due_today_count: 0,
            first_due: None,
            last_due: None,
        };
        for item in &self.items {
            match status::classify(item.due_date, item.is_completed, today).status {
                DateStatus::Completed => summary.completed_count += 1,
                DateStatus::Overdue => summary.overdue_count += 1,
                DateStatus::DueToday => summary.due_today_count += 1,
                DateStatus::Upcoming => {}
            }
        }
        summary.first_due = self.items.iter().filter_map(|item| item.due_date).min();
        summary.last_due = self.items.iter().filter_map(|item| item.due_date).max();
        summary
    }

    /// Tabular view of the items, one row per item in sequence order.
    pub fn dataframe(&self) -> PolarsResult<DataFrame> {
        let mut df = DataFrame::empty_with_schema(&Self::default_schema());
        for item in &self.items {
            df = df.vstack(&item.to_dataframe_row()?)?;
        }
        Ok(df)
    }

    fn default_schema() -> Schema {
        Schema::from_iter(vec![
            Field::new("sequence_index".into(), DataType::Int32),
            Field::new("title".into(), DataType::String),
            Field::new("estimated_effort_hours".into(), DataType::Float64),
            Field::new("is_completed".into(), DataType::Boolean),
            Field::new("due_date".into(), DataType::Date),
            Field::new("completed_at".into(), DataType::String),
            Field::new("time_spent_minutes".into(), DataType::Int64),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn sample_plan() -> Plan {
        let parameters = ScheduleParameters {
            start_date: d(2025, 3, 3),
            daily_budget_hours: 2.0,
        };
        let items = vec![
            WorkItem::new(1, "Basics", 2.0),
            WorkItem::new(2, "Practice", 4.0),
        ];
        Plan::create(
            PlanMetadata::default(),
            items,
            parameters,
            AvailabilityRules::new(),
        )
        .unwrap()
    }

    #[test]
    fn default_schema_contains_expected_columns() {
        let schema = Plan::default_schema();
        for name in [
            "sequence_index",
            "title",
            "estimated_effort_hours",
            "is_completed",
            "due_date",
            "completed_at",
            "time_spent_minutes",
        ] {
            assert!(schema.contains(name), "missing column {name}");
        }
    }

    #[test]
    fn dataframe_has_one_row_per_item() {
        let plan = sample_plan();
        let df = plan.dataframe().unwrap();
        assert_eq!(df.height(), 2);
        let titles = df.column("title").unwrap().str().unwrap();
        assert_eq!(titles.get(1), Some("Practice"));
    }

    #[test]
    fn upsert_keeps_sequence_order() {
        let mut plan = sample_plan();
        plan.upsert_item(WorkItem::new(0, "Setup", 1.0)).unwrap();
        let order: Vec<i32> = plan.items().iter().map(|i| i.sequence_index).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }
}
