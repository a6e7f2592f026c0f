use checkpointer::{AppState, config, metrics, telemetry};

/// Application entry point
///
/// # Setup
/// 1. Load configuration from file and environment
/// 2. Initialize tracing/logging
/// 3. Initialize metrics
/// 4. Initialize AppState
/// 5. Run one notification sweep and log the feed
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration
    let config = config::AppConfig::load()?;

    // 2. Initialize tracing/logging
    telemetry::init(&config.logging)?;
    tracing::info!(
        database = %config.database.path.display(),
        "Starting Checkpointer..."
    );

    // 3. Initialize metrics
    metrics::init_metrics();

    // 4. Initialize application state
    let state = AppState::new(config).await?;

    // 5. Notification sweep
    let feed = state.notifications().feed().await?;
    for notification in &feed {
        tracing::info!(
            kind = notification.kind.as_str(),
            post_id = %notification.post_id,
            priority = notification.priority,
            "{}",
            notification.message
        );
    }

    tracing::info!(count = feed.len(), "Notification sweep complete");

    Ok(())
}
