#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use chrono::Local;
    use goalpath::{
        AvailabilityRules, Plan, PlanMetadata, ScheduleParameters, ServiceConfig, http_api,
    };
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("goalpath=info")),
        )
        .init();

    let config = ServiceConfig::from_env()?;
    let empty_plan = || {
        Plan::new(
            PlanMetadata::default(),
            ScheduleParameters {
                start_date: Local::now().date_naive(),
                daily_budget_hours: 2.0,
            },
            AvailabilityRules::new(),
        )
    };

    #[cfg(feature = "sqlite")]
    let state = match &config.db_path {
        Some(path) => {
            use goalpath::{PlanStore, SqlitePlanStore};
            use std::sync::Arc;

            let store = Arc::new(SqlitePlanStore::new(path)?);
            let plan = match store.load_plan()? {
                Some(plan) => plan,
                None => empty_plan()?,
            };
            tracing::info!(path = %path.display(), items = plan.items().len(), "loaded plan store");
            http_api::AppState::new(plan.with_options(config.scheduler)).with_store(store)
        }
        None => http_api::AppState::new(empty_plan()?.with_options(config.scheduler)),
    };
    #[cfg(not(feature = "sqlite"))]
    let state = http_api::AppState::new(empty_plan()?.with_options(config.scheduler));

    http_api::serve(config.http_addr, state).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
