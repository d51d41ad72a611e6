use super::{PersistenceError, PersistenceResult, PlanStore};
use crate::calculations::{RescheduleOutcome, SchedulerOptions};
use crate::calendar::{AvailabilityConfig, AvailabilityRules};
use crate::item::WorkItem;
use crate::metadata::{PlanMetadata, ScheduleParameters};
use crate::plan::Plan;
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{Connection, OptionalExtension, Row, Transaction, params};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEntry {
    pub sequence_index: i32,
    pub action: String,
    pub notes: Option<String>,
    pub logged_at: NaiveDateTime,
}

pub struct SqlitePlanStore {
    connection: Mutex<Connection>,
}

impl SqlitePlanStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    pub fn in_memory() -> PersistenceResult<Self> {
        let connection = Connection::open_in_memory()?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            PRAGMA foreign_keys = ON;
            CREATE TABLE IF NOT EXISTS plan_metadata (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                metadata_json TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS schedule_parameters (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                start_date TEXT NOT NULL,
                daily_budget_hours REAL NOT NULL,
                availability_json TEXT NOT NULL,
                horizon_days INTEGER NOT NULL
            );
            CREATE TABLE IF NOT EXISTS work_items (
                sequence_index INTEGER PRIMARY KEY,
                title TEXT NOT NULL,
                estimated_effort_hours REAL,
                is_completed INTEGER NOT NULL DEFAULT 0,
                due_date TEXT,
                completed_at TEXT,
                time_spent_minutes INTEGER NOT NULL DEFAULT 0
            );
            CREATE TABLE IF NOT EXISTS progress_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                sequence_index INTEGER NOT NULL,
                action TEXT NOT NULL,
                notes TEXT,
                logged_at TEXT NOT NULL
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn lock(&self) -> PersistenceResult<MutexGuard<'_, Connection>> {
        self.connection
            .lock()
            .map_err(|_| PersistenceError::InvalidData("sqlite connection lock poisoned".into()))
    }

    fn save_metadata(tx: &Transaction, metadata: &PlanMetadata) -> PersistenceResult<()> {
        let json = serde_json::to_string(metadata)?;
        tx.execute("DELETE FROM plan_metadata", [])?;
        tx.execute(
            "INSERT INTO plan_metadata (id, metadata_json) VALUES (1, ?1)",
            params![json],
        )?;
        Ok(())
    }

    fn save_parameters(tx: &Transaction, plan: &Plan) -> PersistenceResult<()> {
        let parameters = plan.parameters();
        let availability = serde_json::to_string(&plan.rules().to_config())?;
        tx.execute(
            "INSERT INTO schedule_parameters (id, start_date, daily_budget_hours, availability_json, horizon_days)
             VALUES (1, ?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
                start_date = excluded.start_date,
                daily_budget_hours = excluded.daily_budget_hours,
                availability_json = excluded.availability_json,
                horizon_days = excluded.horizon_days",
            params![
                parameters.start_date.format(DATE_FORMAT).to_string(),
                parameters.daily_budget_hours,
                availability,
                plan.options().horizon_days,
            ],
        )?;
        Ok(())
    }

    fn upsert_item(tx: &Transaction, item: &WorkItem) -> PersistenceResult<()> {
        tx.execute(
            "INSERT INTO work_items
                (sequence_index, title, estimated_effort_hours, is_completed, due_date, completed_at, time_spent_minutes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(sequence_index) DO UPDATE SET
                title = excluded.title,
                estimated_effort_hours = excluded.estimated_effort_hours,
                is_completed = excluded.is_completed,
                due_date = excluded.due_date,
                completed_at = excluded.completed_at,
                time_spent_minutes = excluded.time_spent_minutes",
            params![
                item.sequence_index,
                item.title,
                item.estimated_effort_hours,
                item.is_completed,
                item.due_date.map(|d| d.format(DATE_FORMAT).to_string()),
                item.completed_at.map(|at| at.format(DATETIME_FORMAT).to_string()),
                item.time_spent_minutes,
            ],
        )?;
        Ok(())
    }

    /// Write a single item, e.g. after a completion toggle.
    pub fn save_item(&self, item: &WorkItem) -> PersistenceResult<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        Self::upsert_item(&tx, item)?;
        tx.commit()?;
        Ok(())
    }

    pub fn log_progress(
        &self,
        sequence_index: i32,
        action: &str,
        notes: Option<&str>,
        logged_at: NaiveDateTime,
    ) -> PersistenceResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO progress_log (sequence_index, action, notes, logged_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                sequence_index,
                action,
                notes,
                logged_at.format(DATETIME_FORMAT).to_string()
            ],
        )?;
        debug!(sequence_index, action, "logged progress");
        Ok(())
    }

    pub fn progress_log(&self, sequence_index: i32) -> PersistenceResult<Vec<ProgressEntry>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT sequence_index, action, notes, logged_at FROM progress_log
             WHERE sequence_index = ?1 ORDER BY id ASC",
        )?;
        let rows = stmt.query_map(params![sequence_index], |row| {
            Ok((
                row.get::<_, i32>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (sequence_index, action, notes, logged_at) = row?;
            entries.push(ProgressEntry {
                sequence_index,
                action,
                notes,
                logged_at: parse_datetime(&logged_at)?,
            });
        }
        Ok(entries)
    }

    fn item_from_row(row: &Row<'_>) -> rusqlite::Result<(WorkItem, Option<String>, Option<String>)> {
        let item = WorkItem {
            sequence_index: row.get(0)?,
            title: row.get(1)?,
            estimated_effort_hours: row.get(2)?,
            is_completed: row.get(3)?,
            due_date: None,
            completed_at: None,
            time_spent_minutes: row.get(6)?,
        };
        Ok((item, row.get(4)?, row.get(5)?))
    }
}

impl PlanStore for SqlitePlanStore {
    fn save_plan(&self, plan: &Plan) -> PersistenceResult<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        Self::save_metadata(&tx, plan.metadata())?;
        Self::save_parameters(&tx, plan)?;
        tx.execute("DELETE FROM work_items", [])?;
        for item in plan.items() {
            Self::upsert_item(&tx, item)?;
        }
        tx.commit()?;
        debug!(items = plan.items().len(), "stored plan");
        Ok(())
    }

    /// Only items whose due date moved are rewritten, together with the new
    /// start date, budget and rules.
    fn save_rescheduled(
        &self,
        plan: &Plan,
        outcome: &RescheduleOutcome,
    ) -> PersistenceResult<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        Self::save_parameters(&tx, plan)?;
        let mut written = 0usize;
        for item in outcome.changed_items() {
            Self::upsert_item(&tx, item)?;
            written += 1;
        }
        tx.commit()?;
        info!(written, "stored rescheduled items");
        Ok(())
    }

    fn load_plan(&self) -> PersistenceResult<Option<Plan>> {
        let conn = self.lock()?;

        let metadata_json: Option<String> = conn
            .query_row(
                "SELECT metadata_json FROM plan_metadata WHERE id = 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        let Some(metadata_json) = metadata_json else {
            return Ok(None);
        };
        let metadata: PlanMetadata = serde_json::from_str(&metadata_json)?;

        let (start_date, daily_budget_hours, availability_json, horizon_days): (
            String,
            f64,
            String,
            i64,
        ) = conn
            .query_row(
                "SELECT start_date, daily_budget_hours, availability_json, horizon_days
                 FROM schedule_parameters WHERE id = 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()?
            .ok_or(PersistenceError::NotFound)?;
        let availability: AvailabilityConfig = serde_json::from_str(&availability_json)?;
        let parameters = ScheduleParameters {
            start_date: parse_date(&start_date)?,
            daily_budget_hours,
        };

        let mut stmt = conn.prepare(
            "SELECT sequence_index, title, estimated_effort_hours, is_completed, due_date, completed_at, time_spent_minutes
             FROM work_items ORDER BY sequence_index ASC",
        )?;
        let rows = stmt.query_map([], Self::item_from_row)?;
        let mut items = Vec::new();
        for row in rows {
            let (mut item, due_date, completed_at) = row?;
            item.due_date = due_date.as_deref().map(parse_date).transpose()?;
            item.completed_at = completed_at.as_deref().map(parse_datetime).transpose()?;
            items.push(item);
        }

        let rules = AvailabilityRules::from_config(&availability)?;
        let plan = Plan::from_parts(metadata, items, parameters, rules)?
            .with_options(SchedulerOptions { horizon_days });
        Ok(Some(plan))
    }
}

fn parse_date(input: &str) -> PersistenceResult<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT)
        .map_err(|e| PersistenceError::InvalidData(format!("invalid date '{input}': {e}")))
}

fn parse_datetime(input: &str) -> PersistenceResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(input.trim(), DATETIME_FORMAT)
        .map_err(|e| PersistenceError::InvalidData(format!("invalid timestamp '{input}': {e}")))
}
