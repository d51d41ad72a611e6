use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::PlSmallStr;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// One schedulable unit of a plan. `due_date` is written only by the
/// scheduler; completion fields only by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    pub sequence_index: i32,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_effort_hours: Option<f64>,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub time_spent_minutes: i64,
}

impl WorkItem {
    pub fn new(sequence_index: i32, title: impl Into<String>, estimated_effort_hours: f64) -> Self {
        Self {
            sequence_index,
            title: title.into(),
            estimated_effort_hours: Some(estimated_effort_hours),
            is_completed: false,
            due_date: None,
            completed_at: None,
            time_spent_minutes: 0,
        }
    }

    /// An item without an effort estimate; scheduled as a single day.
    pub fn unestimated(sequence_index: i32, title: impl Into<String>) -> Self {
        Self {
            estimated_effort_hours: None,
            ..Self::new(sequence_index, title, 0.0)
        }
    }

    pub fn mark_completed(&mut self, at: NaiveDateTime) {
        self.is_completed = true;
        self.completed_at = Some(at);
    }

    pub fn mark_incomplete(&mut self) {
        self.is_completed = false;
        self.completed_at = None;
    }

    pub fn add_time_spent(&mut self, minutes: i64) {
        self.time_spent_minutes = self.time_spent_minutes.saturating_add(minutes);
    }

    pub fn to_dataframe_row(&self) -> PolarsResult<DataFrame> {
        let mut columns: Vec<Column> = Vec::with_capacity(7);

        let seq_data: [i32; 1] = [self.sequence_index];
        columns.push(
            Series::new(PlSmallStr::from_static("sequence_index"), seq_data).into_column(),
        );

        let title_data: [&str; 1] = [self.title.as_str()];
        columns.push(Series::new(PlSmallStr::from_static("title"), title_data).into_column());

        let effort: [Option<f64>; 1] = [self.estimated_effort_hours];
        columns.push(
            Series::new(PlSmallStr::from_static("estimated_effort_hours"), effort).into_column(),
        );

        let completed: [bool; 1] = [self.is_completed];
        columns.push(
            Series::new(PlSmallStr::from_static("is_completed"), completed).into_column(),
        );

        columns.push(Self::series_from_date("due_date", self.due_date)?.into_column());

        let completed_at_text = self
            .completed_at
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string());
        let completed_at: [Option<&str>; 1] = [completed_at_text.as_deref()];
        columns.push(
            Series::new(PlSmallStr::from_static("completed_at"), completed_at).into_column(),
        );

        let minutes: [i64; 1] = [self.time_spent_minutes];
        columns.push(
            Series::new(PlSmallStr::from_static("time_spent_minutes"), minutes).into_column(),
        );

        DataFrame::new(columns)
    }

    fn series_from_date(name: &str, date: Option<NaiveDate>) -> PolarsResult<Series> {
        let data: [Option<i32>; 1] = [date.map(Self::date_to_i32)];
        Series::new(name.into(), data).cast(&DataType::Date)
    }

    fn date_to_i32(date: NaiveDate) -> i32 {
        let epoch = NaiveDate::default();
        (date - epoch).num_days() as i32
    }
}
