use super::{PersistenceError, PersistenceResult};
use crate::{
    calculations::SchedulerOptions,
    calendar::{AvailabilityConfig, AvailabilityRules},
    item::WorkItem,
    metadata::{PlanMetadata, ScheduleParameters},
    plan::Plan,
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use tracing::debug;

const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Serialize, Deserialize)]
struct PlanSnapshot {
    metadata: PlanMetadata,
    parameters: ScheduleParameters,
    #[serde(default)]
    availability: AvailabilityConfig,
    #[serde(default)]
    options: SchedulerOptions,
    items: Vec<WorkItem>,
}

impl PlanSnapshot {
    fn from_plan(plan: &Plan) -> Self {
        Self {
            metadata: plan.metadata().clone(),
            parameters: plan.parameters().clone(),
            availability: plan.rules().to_config(),
            options: plan.options(),
            items: plan.items().to_vec(),
        }
    }

    fn into_plan(self) -> PersistenceResult<Plan> {
        let rules = AvailabilityRules::from_config(&self.availability)?;
        let plan = Plan::from_parts(self.metadata, self.items, self.parameters, rules)?;
        Ok(plan.with_options(self.options))
    }
}

/// Snapshot the whole plan, due dates included. Loading does not reschedule.
pub fn save_plan_to_json<P: AsRef<Path>>(plan: &Plan, path: P) -> PersistenceResult<()> {
    let snapshot = PlanSnapshot::from_plan(plan);
    let file = File::create(path.as_ref())?;
    serde_json::to_writer_pretty(file, &snapshot)?;
    debug!(path = %path.as_ref().display(), items = snapshot.items.len(), "saved plan json");
    Ok(())
}

pub fn load_plan_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<Plan> {
    let file = File::open(path)?;
    let snapshot: PlanSnapshot = serde_json::from_reader(file)?;
    snapshot.into_plan()
}

#[derive(Default, Serialize, Deserialize)]
struct ItemCsvRecord {
    sequence_index: i32,
    title: String,
    estimated_effort_hours: String,
    is_completed: String,
    due_date: String,
    completed_at: String,
    time_spent_minutes: String,
    #[serde(default)]
    metadata_json: String,
    #[serde(default)]
    parameters_json: String,
    #[serde(default)]
    availability_json: String,
    #[serde(default)]
    options_json: String,
}

impl From<&WorkItem> for ItemCsvRecord {
    fn from(item: &WorkItem) -> Self {
        Self {
            sequence_index: item.sequence_index,
            title: item.title.clone(),
            estimated_effort_hours: item
                .estimated_effort_hours
                .map(|v| v.to_string())
                .unwrap_or_default(),
            is_completed: item.is_completed.to_string(),
            due_date: format_date(item.due_date),
            completed_at: item
                .completed_at
                .map(|at| at.format(DATETIME_FORMAT).to_string())
                .unwrap_or_default(),
            time_spent_minutes: item.time_spent_minutes.to_string(),
            ..Self::default()
        }
    }
}

impl ItemCsvRecord {
    fn metadata_row(plan: &Plan) -> PersistenceResult<Self> {
        Ok(Self {
            title: "__metadata__".to_string(),
            metadata_json: serde_json::to_string(plan.metadata())?,
            parameters_json: serde_json::to_string(plan.parameters())?,
            availability_json: serde_json::to_string(&plan.rules().to_config())?,
            options_json: serde_json::to_string(&plan.options())?,
            ..Self::default()
        })
    }

    fn is_metadata_row(&self) -> bool {
        !self.metadata_json.trim().is_empty()
    }

    fn into_item(self) -> PersistenceResult<WorkItem> {
        if self.is_metadata_row() {
            return Err(PersistenceError::InvalidData(
                "metadata row cannot be converted to a work item".into(),
            ));
        }
        Ok(WorkItem {
            sequence_index: self.sequence_index,
            title: self.title,
            estimated_effort_hours: parse_f64(&self.estimated_effort_hours)?,
            is_completed: parse_bool(&self.is_completed)?.unwrap_or(false),
            due_date: parse_date(&self.due_date)?,
            completed_at: parse_datetime(&self.completed_at)?,
            time_spent_minutes: parse_i64(&self.time_spent_minutes)?.unwrap_or(0),
        })
    }
}

/// One row per item preceded by a metadata row carrying the plan header as JSON.
pub fn save_plan_to_csv<P: AsRef<Path>>(plan: &Plan, path: P) -> PersistenceResult<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = csv::Writer::from_writer(file);
    writer.serialize(ItemCsvRecord::metadata_row(plan)?)?;
    for item in plan.items() {
        writer.serialize(ItemCsvRecord::from(item))?;
    }
    writer.flush()?;
    debug!(path = %path.as_ref().display(), items = plan.items().len(), "saved plan csv");
    Ok(())
}

pub fn load_plan_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<Plan> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut items = Vec::new();
    let mut metadata: Option<PlanMetadata> = None;
    let mut parameters: Option<ScheduleParameters> = None;
    let mut availability: Option<AvailabilityConfig> = None;
    let mut options = SchedulerOptions::default();

    for record in reader.deserialize::<ItemCsvRecord>() {
        let record = record?;
        if record.is_metadata_row() {
            if metadata.is_some() {
                return Err(PersistenceError::InvalidData(
                    "CSV file contained multiple metadata rows".into(),
                ));
            }
            metadata = Some(serde_json::from_str(&record.metadata_json).map_err(|err| {
                PersistenceError::InvalidData(format!("invalid metadata json: {err}"))
            })?);
            if !record.parameters_json.trim().is_empty() {
                parameters = Some(serde_json::from_str(&record.parameters_json).map_err(
                    |err| PersistenceError::InvalidData(format!("invalid parameters json: {err}")),
                )?);
            }
            if !record.availability_json.trim().is_empty() {
                availability = Some(serde_json::from_str(&record.availability_json).map_err(
                    |err| {
                        PersistenceError::InvalidData(format!("invalid availability json: {err}"))
                    },
                )?);
            }
            if !record.options_json.trim().is_empty() {
                options = serde_json::from_str(&record.options_json).map_err(|err| {
                    PersistenceError::InvalidData(format!("invalid options json: {err}"))
                })?;
            }
            continue;
        }
        items.push(record.into_item()?);
    }

    let metadata = metadata.ok_or_else(|| {
        PersistenceError::InvalidData("CSV file has no metadata row".into())
    })?;
    let parameters = parameters.ok_or_else(|| {
        PersistenceError::InvalidData("CSV metadata row has no schedule parameters".into())
    })?;
    let rules = match availability {
        Some(config) => AvailabilityRules::from_config(&config)?,
        None => AvailabilityRules::new(),
    };

    Ok(Plan::from_parts(metadata, items, parameters, rules)?.with_options(options))
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn parse_date(input: &str) -> PersistenceResult<Option<NaiveDate>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map(Some)
        .map_err(|e| PersistenceError::InvalidData(format!("invalid date '{input}': {e}")))
}

fn parse_datetime(input: &str) -> PersistenceResult<Option<NaiveDateTime>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    NaiveDateTime::parse_from_str(input.trim(), DATETIME_FORMAT)
        .map(Some)
        .map_err(|e| PersistenceError::InvalidData(format!("invalid timestamp '{input}': {e}")))
}

fn parse_f64(input: &str) -> PersistenceResult<Option<f64>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    input
        .trim()
        .parse::<f64>()
        .map(Some)
        .map_err(|e| PersistenceError::InvalidData(format!("invalid float '{input}': {e}")))
}

fn parse_i64(input: &str) -> PersistenceResult<Option<i64>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    input
        .trim()
        .parse::<i64>()
        .map(Some)
        .map_err(|e| PersistenceError::InvalidData(format!("invalid integer '{input}': {e}")))
}

fn parse_bool(input: &str) -> PersistenceResult<Option<bool>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    match input.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(Some(true)),
        "false" => Ok(Some(false)),
        other => Err(PersistenceError::InvalidData(format!(
            "invalid boolean '{other}'"
        ))),
    }
}
