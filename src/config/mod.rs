/// Application configuration loading from TOML and the environment
pub mod app;

/// In-memory database connection and table creation
pub mod database;

/// Tracing subscriber setup
pub mod logging;
