//! Shared library for the movie scraper.
//!
//! This crate provides common functionality used by the scraper:
//! - Configuration management
//! - Movie and torrent data models
//! - SQLite database and movie store
//! - Logging infrastructure

pub mod config;
pub mod db;
pub mod logging;
pub mod models;
pub mod store;

// Re-export commonly used types
pub use config::Config;
pub use db::Database;
pub use logging::LogConfig;
pub use models::*;
pub use store::{MovieStore, SqliteMovieStore};

/// Common result type using anyhow::Error
pub type Result<T> = anyhow::Result<T>;
