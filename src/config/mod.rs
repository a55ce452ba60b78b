/// Runtime settings read from the environment
pub mod app;

/// Database configuration and connection management
pub mod database;

/// Seed data loading from config.toml
pub mod seed;

pub use app::AppConfig;
