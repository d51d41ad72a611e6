//! Boundary to whatever produces the day-by-day curriculum text. The
//! scheduler only consumes the parsed [`WorkItem`]s; providers live outside
//! this crate and plug in through [`CurriculumGenerator`].

use crate::item::WorkItem;
use crate::metadata::GoalType;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum CurriculumError {
    #[error("curriculum generation failed: {0}")]
    Generation(String),
    #[error("generated text contains no JSON object")]
    MissingJson,
    #[error("generated JSON is malformed: {0}")]
    MalformedJson(#[from] serde_json::Error),
    #[error("generated plan has no curriculum entries")]
    Empty,
}

pub trait CurriculumGenerator: Send + Sync {
    fn generate(&self, prompt: &str, system_prompt: &str) -> Result<String, CurriculumError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurriculumRequest {
    pub goal: String,
    pub goal_type: GoalType,
    pub timeframe_days: u32,
    pub hours_per_day: f64,
}

impl CurriculumRequest {
    pub fn system_prompt(&self) -> String {
        format!(
            "You are an expert {} planner. Return ONLY valid JSON with a \"curriculum\" array; \
             each entry has \"day\", \"topic\" and \"estimated_hours\".",
            self.goal_type
        )
    }

    pub fn prompt(&self) -> String {
        let total_hours = self.hours_per_day * f64::from(self.timeframe_days);
        format!(
            "Create a {}-day plan for the goal: {}\n\
             The user has {} hours per day ({} hours in total).\n\
             Every day must be achievable within the daily hours.",
            self.timeframe_days, self.goal, self.hours_per_day, total_hours
        )
    }
}

/// Pull the JSON object out of generated text: a fenced ```json block, the
/// whole text when it is already an object, else first `{` to last `}`.
pub fn extract_json(text: &str) -> Option<&str> {
    const FENCE: &str = "```json";
    let trimmed = text.trim();
    if let Some(start) = trimmed.find(FENCE) {
        let body = &trimmed[start + FENCE.len()..];
        let end = body.rfind("```").unwrap_or(body.len());
        let candidate = body[..end].trim();
        if !candidate.is_empty() {
            return Some(candidate);
        }
    }
    if trimmed.starts_with('{') && trimmed.ends_with('}') {
        return Some(trimmed);
    }
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    (start < end).then(|| &trimmed[start..=end])
}

/// Read the `curriculum` (or career-style `schedule`) array into work items.
/// Entries without a usable title are dropped.
pub fn parse_curriculum(text: &str) -> Result<Vec<WorkItem>, CurriculumError> {
    let json = extract_json(text).ok_or(CurriculumError::MissingJson)?;
    let value: Value = serde_json::from_str(json)?;

    let entries = value
        .get("curriculum")
        .or_else(|| value.get("schedule"))
        .and_then(Value::as_array)
        .ok_or(CurriculumError::Empty)?;

    let mut items = Vec::with_capacity(entries.len());
    for (position, entry) in entries.iter().enumerate() {
        let sequence_index = entry
            .get("day")
            .and_then(Value::as_i64)
            .and_then(|day| i32::try_from(day).ok())
            .unwrap_or(position as i32 + 1);

        let Some(title) = ["topic", "focus", "task"]
            .iter()
            .find_map(|key| entry.get(*key).and_then(Value::as_str))
            .map(str::trim)
            .filter(|title| !title.is_empty())
        else {
            warn!(position, "curriculum entry without a title dropped");
            continue;
        };

        let mut item = WorkItem::unestimated(sequence_index, title);
        item.estimated_effort_hours = entry.get("estimated_hours").and_then(Value::as_f64);
        items.push(item);
    }

    if items.is_empty() {
        return Err(CurriculumError::Empty);
    }
    // Duplicate days collapse onto consecutive indices in document order.
    items.sort_by_key(|item| item.sequence_index);
    for idx in 1..items.len() {
        if items[idx].sequence_index <= items[idx - 1].sequence_index {
            items[idx].sequence_index = items[idx - 1].sequence_index + 1;
        }
    }
    debug!(items = items.len(), "parsed curriculum");
    Ok(items)
}

/// Ask the generator for a plan and turn the answer into work items. Entries
/// without an estimate get the requested hours per day.
pub fn generate_items(
    generator: &dyn CurriculumGenerator,
    request: &CurriculumRequest,
) -> Result<Vec<WorkItem>, CurriculumError> {
    let text = generator.generate(&request.prompt(), &request.system_prompt())?;
    let mut items = parse_curriculum(&text)?;
    for item in &mut items {
        if item.estimated_effort_hours.is_none() {
            item.estimated_effort_hours = Some(request.hours_per_day);
        }
    }
    Ok(items)
}
