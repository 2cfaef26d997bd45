//! Process settings read once at start-up.
//!
//! Values come from the environment (a `.env` file is loaded by `main` through
//! `dotenvy` before this runs). Lookups go through a closure so tests can feed
//! a map instead of touching the process environment.

use std::path::PathBuf;

/// Default `SQLite` database used when nothing else is configured.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/fare_desk.sqlite?mode=rwc";

/// Runtime settings for the fare desk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Connection URL handed to `SeaORM`
    pub database_url: String,
    /// Socket address the HTTP server binds to
    pub bind_addr: String,
    /// Directory for uploaded exemption documents
    pub uploads_dir: PathBuf,
    /// Optional TOML file with fare types to seed into an empty database
    pub fares_config: PathBuf,
}

impl Settings {
    /// Reads settings from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            database_url: resolve_database_url(&lookup),
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8000".to_string()),
            uploads_dir: lookup("UPLOADS_DIR").map_or_else(|| PathBuf::from("uploads"), PathBuf::from),
            fares_config: lookup("FARES_CONFIG")
                .map_or_else(|| PathBuf::from("fares.toml"), PathBuf::from),
        }
    }
}

/// Picks the database URL.
///
/// `DATABASE_URL` wins. Otherwise, when `DB_HOST` is set, a `MySQL` URL is built
/// from `DB_HOST`, `DB_USER` (default `root`), `DB_PASSWORD` (default empty) and
/// `DB_NAME` (default `tariffs_exemptions`). Otherwise the local `SQLite` file.
pub fn resolve_database_url<F>(lookup: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup("DATABASE_URL").filter(|u| !u.trim().is_empty()) {
        return url;
    }

    let Some(host) = lookup("DB_HOST").filter(|h| !h.trim().is_empty()) else {
        return DEFAULT_DATABASE_URL.to_string();
    };
    let user = lookup("DB_USER").unwrap_or_else(|| "root".to_string());
    let password = lookup("DB_PASSWORD").unwrap_or_default();
    let name = lookup("DB_NAME").unwrap_or_else(|| "tariffs_exemptions".to_string());

    if password.is_empty() {
        format!("mysql://{user}@{host}/{name}")
    } else {
        format!("mysql://{user}:{password}@{host}/{name}")
    }
}
