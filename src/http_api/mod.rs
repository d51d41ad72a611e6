use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use chrono::{Local, NaiveDate, NaiveDateTime};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

use crate::{
    calculations::RescheduleOutcome,
    calendar::{AvailabilityConfig, AvailabilityRules},
    date_parse::{self, DateParseReport},
    error::ScheduleError,
    item::WorkItem,
    metadata::{PlanMetadata, ScheduleParameters},
    persistence::{PersistenceError, PlanStore},
    plan::{Plan, PlanSummary, ProgressStats},
    status::{self, DateStatus, DisplayColor},
};

pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;
pub type SharedStore = Arc<dyn PlanStore + Send + Sync>;

#[derive(Clone)]
pub struct AppState {
    plan: Arc<RwLock<Plan>>,
    clock: Clock,
    store: Option<SharedStore>,
}

impl AppState {
    pub fn new(plan: Plan) -> Self {
        Self::with_shared(Arc::new(RwLock::new(plan)))
    }

    pub fn with_shared(plan: Arc<RwLock<Plan>>) -> Self {
        Self {
            plan,
            clock: Arc::new(|| Local::now().naive_local()),
            store: None,
        }
    }

    /// Replace the wall clock, e.g. to pin "today" in tests.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Persist the plan after every mutation.
    pub fn with_store(mut self, store: SharedStore) -> Self {
        self.store = Some(store);
        self
    }

    fn plan(&self) -> Arc<RwLock<Plan>> {
        self.plan.clone()
    }

    fn now(&self) -> NaiveDateTime {
        (self.clock)()
    }

    fn today(&self) -> NaiveDate {
        self.now().date()
    }

    fn persist(&self, plan: &Plan) -> Result<(), ApiError> {
        if let Some(store) = &self.store {
            store.save_plan(plan)?;
        }
        Ok(())
    }

    fn persist_rescheduled(
        &self,
        plan: &Plan,
        outcome: &RescheduleOutcome,
    ) -> Result<(), ApiError> {
        if let Some(store) = &self.store {
            store.save_rescheduled(plan, outcome)?;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Invalid(String),
    Unprocessable(String),
    Internal(String),
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }
}

impl From<ScheduleError> for ApiError {
    fn from(value: ScheduleError) -> Self {
        match value {
            ScheduleError::ItemNotFound(_) => ApiError::NotFound(value.to_string()),
            err if err.is_validation() => ApiError::Invalid(err.to_string()),
            err => ApiError::Unprocessable(err.to_string()),
        }
    }
}

impl From<PersistenceError> for ApiError {
    fn from(value: PersistenceError) -> Self {
        error!(error = %value, "failed to persist plan");
        ApiError::Internal(value.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::Unprocessable(message) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "unprocessable", message)
            }
            ApiError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

/// An item together with its status as of the request's "today".
#[derive(Debug, Serialize, Deserialize)]
pub struct ItemView {
    #[serde(flatten)]
    pub item: WorkItem,
    pub status: DateStatus,
    pub color: DisplayColor,
    pub days_until: Option<i64>,
    pub due_display: Option<String>,
}

impl ItemView {
    fn new(item: &WorkItem, today: NaiveDate) -> Self {
        let display = status::classify(item.due_date, item.is_completed, today);
        Self {
            item: item.clone(),
            status: display.status,
            color: display.color,
            days_until: status::days_until(item.due_date, today),
            due_display: item.due_date.map(status::format_date_display),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PlanView {
    pub metadata: PlanMetadata,
    pub parameters: ScheduleParameters,
    pub availability: AvailabilityConfig,
    pub summary: PlanSummary,
    pub items: Vec<ItemView>,
}

#[derive(Debug, Deserialize)]
struct CompletionPayload {
    completed: bool,
    #[serde(default)]
    time_spent_minutes: i64,
}

#[derive(Debug, Deserialize)]
struct ReschedulePayload {
    start_date: NaiveDate,
    daily_budget_hours: f64,
    /// Replaces the current rules wholesale. When only `excluded_text` is
    /// given the new rules start empty; when both are omitted the current
    /// rules are kept.
    #[serde(default)]
    availability: Option<AvailabilityConfig>,
    /// Free-text exclusions added to the new rules, e.g. "Nov 20-22, Dec 25".
    #[serde(default)]
    excluded_text: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RescheduleResponse {
    pub rescheduled: Vec<i32>,
    pub changed: Vec<i32>,
    pub skipped_tokens: Vec<String>,
    pub items: Vec<ItemView>,
}

#[derive(Debug, Deserialize)]
struct ParsePayload {
    text: String,
    #[serde(default)]
    today: Option<NaiveDate>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/plan", get(get_plan))
        .route("/items", get(list_items))
        .route("/items/:seq", get(get_item))
        .route("/items/:seq/completion", put(set_completion))
        .route("/stats", get(get_stats))
        .route("/reschedule", post(reschedule_plan))
        .route("/availability/parse", post(parse_availability))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "goalpath HTTP API listening");
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn get_plan(State(state): State<AppState>) -> Json<PlanView> {
    let today = state.today();
    let plan = state.plan();
    let guard = plan.read();
    Json(PlanView {
        metadata: guard.metadata().clone(),
        parameters: guard.parameters().clone(),
        availability: guard.rules().to_config(),
        summary: guard.summary(today),
        items: guard
            .items()
            .iter()
            .map(|item| ItemView::new(item, today))
            .collect(),
    })
}

async fn list_items(State(state): State<AppState>) -> Json<Vec<ItemView>> {
    let today = state.today();
    let plan = state.plan();
    let items = {
        let guard = plan.read();
        guard
            .items()
            .iter()
            .map(|item| ItemView::new(item, today))
            .collect()
    };
    Json(items)
}

async fn get_item(
    State(state): State<AppState>,
    Path(seq): Path<i32>,
) -> Result<Json<ItemView>, ApiError> {
    let today = state.today();
    let plan = state.plan();
    let guard = plan.read();
    guard
        .find_item(seq)
        .map(|item| Json(ItemView::new(item, today)))
        .ok_or_else(|| ApiError::not_found(format!("work item {seq} not found")))
}

async fn set_completion(
    State(state): State<AppState>,
    Path(seq): Path<i32>,
    Json(payload): Json<CompletionPayload>,
) -> Result<Json<ItemView>, ApiError> {
    let now = state.now();
    let plan = state.plan();
    let mut guard = plan.write();
    let item = guard
        .set_completion(seq, payload.completed, payload.time_spent_minutes, now)?
        .clone();
    state.persist(&guard)?;
    Ok(Json(ItemView::new(&item, now.date())))
}

async fn get_stats(State(state): State<AppState>) -> Json<ProgressStats> {
    let plan = state.plan();
    let stats = plan.read().progress_stats();
    Json(stats)
}

async fn reschedule_plan(
    State(state): State<AppState>,
    Json(payload): Json<ReschedulePayload>,
) -> Result<Json<RescheduleResponse>, ApiError> {
    let today = state.today();
    let plan = state.plan();
    let mut guard = plan.write();

    let mut rules = match (&payload.availability, &payload.excluded_text) {
        (Some(config), _) => AvailabilityRules::from_config(config)?,
        (None, Some(_)) => AvailabilityRules::new(),
        (None, None) => guard.rules().clone(),
    };
    let mut skipped_tokens = Vec::new();
    if let Some(text) = payload.excluded_text.as_deref() {
        let DateParseReport { dates, skipped } = date_parse::parse_excluded_dates(text, today);
        rules = rules.with_excluded_dates(dates);
        skipped_tokens = skipped;
    }

    let outcome = guard.reschedule(payload.start_date, payload.daily_budget_hours, rules)?;
    state.persist_rescheduled(&guard, &outcome)?;
    let RescheduleOutcome {
        items,
        rescheduled,
        changed,
    } = outcome;

    Ok(Json(RescheduleResponse {
        rescheduled,
        changed,
        skipped_tokens,
        items: items.iter().map(|item| ItemView::new(item, today)).collect(),
    }))
}

async fn parse_availability(
    State(state): State<AppState>,
    Json(payload): Json<ParsePayload>,
) -> Result<Json<DateParseReport>, ApiError> {
    if payload.text.trim().is_empty() {
        return Err(ApiError::invalid("text must not be empty"));
    }
    let today = payload.today.unwrap_or_else(|| state.today());
    Ok(Json(date_parse::parse_excluded_dates(&payload.text, today)))
}
