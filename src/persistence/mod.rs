use crate::calculations::RescheduleOutcome;
use crate::error::ScheduleError;
use crate::plan::Plan;
use polars::prelude::PolarsError;
use serde_json::Error as SerdeJsonError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] SerdeJsonError),
    #[error("dataframe conversion error: {0}")]
    DataFrame(#[from] PolarsError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("stored plan is inconsistent: {0}")]
    Schedule(#[from] ScheduleError),
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("no plan stored")]
    NotFound,
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

pub trait PlanStore {
    fn save_plan(&self, plan: &Plan) -> PersistenceResult<()>;
    fn load_plan(&self) -> PersistenceResult<Option<Plan>>;

    /// Persist the outcome of a reschedule: the plan's new parameters and
    /// rules plus only the items listed in `outcome.changed`.
    fn save_rescheduled(&self, plan: &Plan, outcome: &RescheduleOutcome)
    -> PersistenceResult<()>;
}

#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod file;

pub use file::{load_plan_from_csv, load_plan_from_json, save_plan_to_csv, save_plan_to_json};
