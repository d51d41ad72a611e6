pub mod calculations;
pub mod calendar;
pub mod config;
pub mod curriculum;
pub mod date_parse;
pub mod error;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod item;
pub(crate) mod item_validation;
pub mod metadata;
pub mod persistence;
pub mod plan;
pub mod status;

pub use calculations::{
    DueDateAssignment, Reschedule, RescheduleOutcome, SchedulerOptions, assign_due_dates,
    days_needed, reschedule,
};
pub use calendar::{AvailabilityConfig, AvailabilityRules, DEFAULT_SEARCH_HORIZON_DAYS};
pub use config::ServiceConfig;
pub use curriculum::{
    CurriculumError, CurriculumGenerator, CurriculumRequest, generate_items, parse_curriculum,
};
pub use date_parse::{DateParseReport, parse_excluded_dates, parse_single_date};
pub use error::{ConfigError, ScheduleError, ScheduleResult};
pub use item::WorkItem;
pub use metadata::{GoalType, PlanMetadata, ScheduleParameters};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::{ProgressEntry, SqlitePlanStore};
pub use persistence::{
    PersistenceError, PlanStore, load_plan_from_csv, load_plan_from_json, save_plan_to_csv,
    save_plan_to_json,
};
pub use plan::{Plan, PlanSummary, ProgressStats};
pub use status::{DateStatus, DisplayColor, StatusDisplay, classify, days_until, format_date_display};
