//! Data layer module
//!
//! Handles all data persistence:
//! - SQLite database operations
//! - Row models for posts, checkpoints and tags

mod database;
mod models;

pub use database::Database;
pub use models::*;
