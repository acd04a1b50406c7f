#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::sync::Arc;

    use study_planner::{AppConfig, InMemoryStore, SchedulerStore, WeeklyPlanner, http_api, logging};

    let config = AppConfig::from_env()?;
    logging::init_tracing(&config.log_level).map_err(|err| err.to_string())?;

    let store: Arc<dyn SchedulerStore> = match &config.database_path {
        #[cfg(feature = "sqlite")]
        Some(path) => {
            tracing::info!(path = %path.display(), "using sqlite store");
            Arc::new(study_planner::SqliteStore::new(path)?)
        }
        #[cfg(not(feature = "sqlite"))]
        Some(path) => {
            tracing::warn!(path = %path.display(), "sqlite feature disabled; falling back to memory");
            Arc::new(InMemoryStore::new())
        }
        None => {
            tracing::info!("no database configured; using in-memory store");
            Arc::new(InMemoryStore::new())
        }
    };

    http_api::serve(config.http_addr, WeeklyPlanner::new(store)).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
