//! Error responses for web handlers.
//!
//! Domain errors become HTML error pages with a status code. Server-side
//! failures are logged in full and shown with a generic message only.

use super::views;
use crate::errors::Error;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

/// Message shown instead of the details of a server-side failure.
pub const GENERIC_MESSAGE: &str = "Something went wrong. Please try again later.";

/// Status code a domain error is reported with.
#[must_use]
pub const fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::PassengerNotFound { .. }
        | Error::FareTypeNotFound { .. }
        | Error::ApplicationNotFound { .. }
        | Error::DocumentNotFound { .. } => StatusCode::NOT_FOUND,
        Error::Validation { .. } | Error::InvalidAmount { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        Error::Conflict { .. } | Error::InvalidTransition { .. } => StatusCode::CONFLICT,
        Error::Config { .. } | Error::Database(_) | Error::Io(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Splits a failed form submission into what the form shows again and what
/// becomes an error page.
///
/// Validation and conflict messages return `Ok` so the handler can re-render
/// the form with them.
pub fn form_failure(err: Error) -> Result<(StatusCode, String), WebError> {
    let status = status_for(&err);
    match err {
        Error::Validation { .. }
        | Error::Conflict { .. }
        | Error::InvalidAmount { .. }
        | Error::InvalidTransition { .. } => Ok((status, err.to_string())),
        other => Err(other.into()),
    }
}

/// An error page response.
#[derive(Debug)]
pub struct WebError {
    status: StatusCode,
    message: String,
}

impl WebError {
    /// A 400 for a request the handlers could not even read.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    /// Status code the response will carry.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<Error> for WebError {
    fn from(err: Error) -> Self {
        let status = status_for(&err);
        let message = if status.is_server_error() {
            error!(error = %err, "request failed");
            GENERIC_MESSAGE.to_string()
        } else {
            err.to_string()
        };
        Self { status, message }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        (self.status, views::error_page(self.status, &self.message)).into_response()
    }
}
