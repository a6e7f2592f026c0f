//! Configuration management
//!
//! Loads configuration from:
//! 1. Default values
//! 2. Configuration file (config/local.toml)
//! 3. Environment variables (override)

use chrono::Duration;
use serde::Deserialize;
use std::path::PathBuf;

use crate::engine::FeedSettings;
use crate::error::AppError;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub notifications: NotificationConfig,
}

/// Database configuration (SQLite only)
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to SQLite database file
    pub path: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
    /// Log format: "pretty" or "json"
    pub format: String,
}

/// Notification feed configuration
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationConfig {
    /// Positive signals are surfaced for posts published within this many days (default: 7)
    pub positive_signal_window_days: i64,
    /// Lead time for upcoming-checkpoint reminders; disabled when unset
    pub upcoming_lead_minutes: Option<i64>,
    /// Maximum feed length; unlimited when unset
    pub max_items: Option<usize>,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            positive_signal_window_days: 7,
            upcoming_lead_minutes: None,
            max_items: None,
        }
    }
}

impl NotificationConfig {
    /// Feed settings for the notification generator
    pub fn feed_settings(&self) -> FeedSettings {
        FeedSettings {
            positive_signal_window: Duration::days(self.positive_signal_window_days),
            upcoming_lead: self.upcoming_lead_minutes.map(Duration::minutes),
            max_items: self.max_items,
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// # Loading Order
    /// 1. Default values
    /// 2. config/default.toml (if exists)
    /// 3. config/local.toml (if exists)
    /// 4. Environment variables (CHECKPOINTER__*)
    ///
    /// # Errors
    /// Returns error if configuration is invalid
    pub fn load() -> Result<Self, AppError> {
        use config::{Config, Environment, File};

        let config = Config::builder()
            // Start with default values
            .set_default("database.path", "data/checkpointer.db")?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .set_default("notifications.positive_signal_window_days", 7)?
            // Load from config/default.toml if it exists
            .add_source(File::with_name("config/default").required(false))
            // Load from config/local.toml if it exists (overrides default)
            .add_source(File::with_name("config/local").required(false))
            // Load from environment variables (CHECKPOINTER__*)
            .add_source(
                Environment::with_prefix("CHECKPOINTER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::Config(e.to_string()))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::Config(e.to_string()))?;
        app_config.validate()?;
        Ok(app_config)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.notifications.positive_signal_window_days <= 0 {
            return Err(AppError::Config(
                "notifications.positive_signal_window_days must be greater than 0".to_string(),
            ));
        }

        if self.notifications.max_items == Some(0) {
            return Err(AppError::Config(
                "notifications.max_items must be greater than 0 when set".to_string(),
            ));
        }

        if let Some(minutes) = self.notifications.upcoming_lead_minutes {
            if minutes <= 0 {
                return Err(AppError::Config(
                    "notifications.upcoming_lead_minutes must be greater than 0 when set"
                        .to_string(),
                ));
            }
        }

        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            tracing::warn!(
                format = %self.logging.format,
                "Unknown logging format, falling back to pretty"
            );
        }

        Ok(())
    }
}
