//! HTTP interface - axum router, persona handlers and HTML views.

mod admin;
/// Mapping of errors to HTTP responses
pub mod error;
mod forms;
mod passenger;
mod ticketing;
/// HTML rendering
pub mod views;

use crate::{
    core::documents::{MAX_DOCUMENT_BYTES, UploadStore},
    errors::{Error, Result},
};
use axum::{Router, extract::DefaultBodyLimit, response::Html, routing::get};
use sea_orm::{DatabaseConnection, prelude::Date};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Request bodies may be this large, so an oversized document still reaches
/// the size check and gets a proper message.
pub const BODY_LIMIT_BYTES: usize = 2 * MAX_DOCUMENT_BYTES;

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Database pool
    pub db: DatabaseConnection,
    /// Uploaded document storage
    pub uploads: UploadStore,
}

impl AppState {
    /// Bundles the pool and the upload store.
    pub const fn new(db: DatabaseConnection, uploads: UploadStore) -> Self {
        Self { db, uploads }
    }

    /// The local calendar day requests are evaluated against.
    fn today(&self) -> Date {
        chrono::Local::now().date_naive()
    }
}

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .merge(passenger::routes())
        .merge(ticketing::routes())
        .merge(admin::routes())
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn home() -> Html<String> {
    views::home()
}

async fn health() -> &'static str {
    "ok"
}

/// Binds `addr` and serves the router until the process is stopped.
pub async fn serve(addr: &str, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Config {
            message: format!("Failed to bind {addr}: {e}"),
        })?;

    info!("Fare desk listening on {addr}");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
