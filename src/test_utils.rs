//! Shared test utilities for the fare desk.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        application::{self, NewApplication},
        documents::{UploadStore, UploadedDocument},
        fare_type::{self, FareTypeInput, FareTypeWithTariff},
        passenger,
        review::EXEMPTION_VALIDITY_DAYS,
    },
    entities::{self, ExemptionCategory},
    errors::Result,
};
use chrono::Days;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set, prelude::Date};
use tempfile::TempDir;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Sets up a database and an upload store in a temporary directory.
///
/// Keep the returned `TempDir` alive for as long as the store is used.
pub async fn setup_with_store() -> Result<(DatabaseConnection, UploadStore, TempDir)> {
    let db = setup_test_db().await?;
    let dir = tempfile::tempdir()?;
    let store = UploadStore::new(dir.path().join("uploads"));
    Ok((db, store, dir))
}

/// Registers a test passenger.
pub async fn create_test_passenger(
    db: &DatabaseConnection,
    full_name: &str,
    email: &str,
) -> Result<entities::passenger::Model> {
    passenger::register_passenger(db, full_name, email).await
}

/// Creates a test fare type with its tariff.
///
/// # Defaults
/// * `description`: "Test fare type"
/// * `validity`: "Single journey"
pub async fn create_test_fare_type(
    db: &DatabaseConnection,
    name: &str,
    base_price: f64,
    discount_rate: f64,
) -> Result<FareTypeWithTariff> {
    fare_type::create_fare_type(
        db,
        FareTypeInput {
            name: name.to_string(),
            description: "Test fare type".to_string(),
            validity: "Single journey".to_string(),
            base_price,
            discount_rate,
        },
    )
    .await
}

/// A small PDF upload.
pub fn test_document() -> UploadedDocument {
    UploadedDocument {
        file_name: "student_card.pdf".to_string(),
        content_type: "application/pdf".to_string(),
        bytes: b"%PDF-1.4".to_vec(),
    }
}

/// An application form carrying [`test_document`].
pub fn new_application(passenger_id: i64, fare_type_id: i64, category: &str) -> NewApplication {
    NewApplication {
        passenger_id,
        fare_type_id,
        category: category.to_string(),
        document_description: "Student card".to_string(),
        document: test_document(),
    }
}

/// Submits a Student application for the passenger.
pub async fn create_test_application(
    db: &DatabaseConnection,
    store: &UploadStore,
    passenger_id: i64,
    fare_type_id: i64,
) -> Result<entities::exemption_application::Model> {
    application::submit_application(
        db,
        store,
        new_application(passenger_id, fare_type_id, "Student"),
    )
    .await
}

/// Inserts a Student exemption valid from `valid_from` for the usual window,
/// without going through an application.
pub async fn create_test_exemption(
    db: &DatabaseConnection,
    passenger_id: i64,
    fare_type_id: i64,
    valid_from: Date,
) -> Result<entities::exemption::Model> {
    entities::exemption::ActiveModel {
        category: Set(ExemptionCategory::Student),
        passenger_id: Set(passenger_id),
        fare_type_id: Set(fare_type_id),
        valid_from: Set(valid_from),
        valid_to: Set(valid_from + Days::new(EXEMPTION_VALIDITY_DAYS)),
        application_id: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}
