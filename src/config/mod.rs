/// Database connection and table creation
pub mod database;

/// Fare type seed loading from fares.toml
pub mod fares;

/// Process settings read from the environment
pub mod settings;
