//! Unified error type for the fare desk.
//!
//! Core operations return [`Result`]; the web layer decides how each variant
//! is shown to the user.

use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Every failure the fare desk can report.
#[derive(Debug, Error)]
pub enum Error {
    /// Settings or seed file could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// User input broke a domain rule; the message is shown on the form
    #[error("{message}")]
    Validation {
        /// First violated rule
        message: String,
    },

    /// A uniqueness or reference constraint refused the write
    #[error("{message}")]
    Conflict {
        /// Human-readable reason
        message: String,
    },

    /// A monetary amount or rate was negative, out of range or not finite
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected value
        amount: f64,
    },

    /// No passenger row with this id
    #[error("Passenger not found: {id}")]
    PassengerNotFound {
        /// The requested id
        id: i64,
    },

    /// No fare type row with this id
    #[error("Fare type not found: {id}")]
    FareTypeNotFound {
        /// The requested id
        id: i64,
    },

    /// No exemption application row with this id
    #[error("Exemption application not found: {id}")]
    ApplicationNotFound {
        /// The requested id
        id: i64,
    },

    /// No document row with this id
    #[error("Document not found: {id}")]
    DocumentNotFound {
        /// The requested id
        id: i64,
    },

    /// The application is not in a state that allows the requested move
    #[error("Cannot move application from {from} to {to}")]
    InvalidTransition {
        /// Current status
        from: String,
        /// Requested status
        to: String,
    },

    /// Driver or query failure
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// Upload storage failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Converts a database error, turning constraint violations into [`Error::Conflict`].
    ///
    /// UNIQUE and FOREIGN KEY violations carry `conflict_message`; every other
    /// driver error stays a [`Error::Database`].
    pub fn from_db(err: DbErr, conflict_message: impl Into<String>) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_) | SqlErr::ForeignKeyConstraintViolation(_)) => {
                Self::Conflict {
                    message: conflict_message.into(),
                }
            }
            _ => Self::Database(err),
        }
    }

    /// Shorthand for a validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// True for errors that mean "the referenced row does not exist".
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::PassengerNotFound { .. }
                | Self::FareTypeNotFound { .. }
                | Self::ApplicationNotFound { .. }
                | Self::DocumentNotFound { .. }
        )
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
