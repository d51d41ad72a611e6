use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateStatus {
    Completed,
    Overdue,
    DueToday,
    Upcoming,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayColor {
    Green,
    Red,
    Yellow,
    Gray,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDisplay {
    pub status: DateStatus,
    pub color: DisplayColor,
}

impl DateStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DateStatus::Completed => "completed",
            DateStatus::Overdue => "overdue",
            DateStatus::DueToday => "due_today",
            DateStatus::Upcoming => "upcoming",
        }
    }

    pub fn color(self) -> DisplayColor {
        match self {
            DateStatus::Completed => DisplayColor::Green,
            DateStatus::Overdue => DisplayColor::Red,
            DateStatus::DueToday => DisplayColor::Yellow,
            DateStatus::Upcoming => DisplayColor::Gray,
        }
    }
}

impl fmt::Display for DateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derived display state for an item. Recomputed on every read; `today` is
/// supplied by the caller.
pub fn classify(due_date: Option<NaiveDate>, is_completed: bool, today: NaiveDate) -> StatusDisplay {
    let status = if is_completed {
        DateStatus::Completed
    } else {
        match due_date {
            None => DateStatus::Upcoming,
            Some(due) if due < today => DateStatus::Overdue,
            Some(due) if due == today => DateStatus::DueToday,
            Some(_) => DateStatus::Upcoming,
        }
    };
    StatusDisplay {
        status,
        color: status.color(),
    }
}

/// Days from `today` until `due_date`; negative once overdue.
pub fn days_until(due_date: Option<NaiveDate>, today: NaiveDate) -> Option<i64> {
    due_date.map(|due| (due - today).num_days())
}

/// Human rendering, e.g. `Nov 16, 2025`. One-way: never parsed back.
pub fn format_date_display(date: NaiveDate) -> String {
    date.format("%b %d, %Y").to_string()
}
