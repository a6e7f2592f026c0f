//! Tracing subscriber setup

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;
use crate::error::AppError;

/// Install the global tracing subscriber
///
/// `RUST_LOG` wins over `logging.level`. The format is `"json"` or
/// anything else for pretty output.
///
/// # Errors
/// Returns error if a global subscriber is already installed
pub fn init(config: &LoggingConfig) -> Result<(), AppError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("checkpointer={}", config.level).into());

    let result = if config.format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init()
    };

    result.map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to install subscriber: {}", e)))
}
