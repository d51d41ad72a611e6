use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalType {
    #[default]
    Learning,
    Career,
    Freelance,
    Project,
    Personal,
}

impl GoalType {
    pub fn as_str(self) -> &'static str {
        match self {
            GoalType::Learning => "learning",
            GoalType::Career => "career",
            GoalType::Freelance => "freelance",
            GoalType::Project => "project",
            GoalType::Personal => "personal",
        }
    }
}

impl fmt::Display for GoalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GoalType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "learning" => Ok(GoalType::Learning),
            "career" => Ok(GoalType::Career),
            "freelance" => Ok(GoalType::Freelance),
            "project" => Ok(GoalType::Project),
            "personal" => Ok(GoalType::Personal),
            other => Err(format!("unknown goal type '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanMetadata {
    pub goal: String,
    #[serde(default)]
    pub goal_type: GoalType,
    pub timeframe_days: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
}

impl PlanMetadata {
    pub fn new(goal: impl Into<String>, goal_type: GoalType, timeframe_days: u32) -> Self {
        Self {
            goal: goal.into(),
            goal_type,
            timeframe_days,
            created_at: None,
        }
    }
}

impl Default for PlanMetadata {
    fn default() -> Self {
        Self::new("New Goal", GoalType::Learning, 30)
    }
}

/// Parameters the scheduler ran with. Replaced wholesale on reschedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleParameters {
    pub start_date: NaiveDate,
    pub daily_budget_hours: f64,
}
