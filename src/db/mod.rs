//! Persistence gateway and shared query helpers.

/// Traced statement helpers
pub mod gateway;

pub use gateway::{WriteOutcome, execute, fetch_all, fetch_one, statement};
