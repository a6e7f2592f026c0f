//! Checkpointer - checkpoint scheduling and metrics for short-form video posts
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Service Layer                            │
//! │  - Checkpoint capture and timeline view                     │
//! │  - Notification feed                                        │
//! │  - Tag management and merges                                │
//! └─────────────────────────────────────────────────────────────┘
//!                │                               │
//! ┌──────────────────────────────┐ ┌────────────────────────────┐
//! │           Engine             │ │         Data Layer          │
//! │  - Checkpoint catalog        │ │  - SQLite (sqlx)            │
//! │  - Schedule / metrics        │ │  - Embedded migrations      │
//! │  - Signals / deltas          │ │                             │
//! └──────────────────────────────┘ └────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - `engine`: Pure scheduling, metrics, signal, delta and feed logic
//! - `service`: Business logic layer
//! - `data`: Database layer
//! - `clock`: Injectable wall clock
//! - `config`: Configuration management
//! - `error`: Error types
//! - `metrics`: Prometheus instruments
//! - `telemetry`: Tracing subscriber setup

pub mod clock;
pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod service;
pub mod telemetry;

use std::sync::Arc;

/// Application state shared across services
///
/// Cheap to clone; every field is reference-counted.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<config::AppConfig>,

    /// Database connection pool
    pub db: Arc<data::Database>,

    /// Source of "now" for every schedule decision
    pub clock: Arc<dyn clock::Clock>,
}

impl AppState {
    /// Initialize application state with the system clock
    ///
    /// # Errors
    /// Returns error if the database cannot be opened or migrated
    pub async fn new(config: config::AppConfig) -> Result<Self, error::AppError> {
        Self::with_clock(config, Arc::new(clock::SystemClock)).await
    }

    /// Initialize application state with a custom clock
    pub async fn with_clock(
        config: config::AppConfig,
        clock: Arc<dyn clock::Clock>,
    ) -> Result<Self, error::AppError> {
        tracing::info!("Initializing application state...");

        let db = data::Database::connect(&config.database.path).await?;

        tracing::info!("Application state initialized");

        Ok(Self {
            config: Arc::new(config),
            db: Arc::new(db),
            clock,
        })
    }

    pub fn checkpoints(&self) -> service::CheckpointService {
        service::CheckpointService::new(self.db.clone(), self.clock.clone())
    }

    pub fn notifications(&self) -> service::NotificationService {
        service::NotificationService::new(
            self.db.clone(),
            self.clock.clone(),
            self.config.notifications.feed_settings(),
        )
    }

    pub fn tags(&self) -> service::TagService {
        service::TagService::new(self.db.clone())
    }
}
