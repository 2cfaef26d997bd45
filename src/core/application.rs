//! Exemption application submission and listing.
//!
//! Submission checks the form in a fixed order and stops at the first broken
//! rule. The application row, its document record and the activity entry
//! are written in one transaction; the uploaded file is removed again if
//! that transaction does not commit.

use crate::{
    core::{
        activity::{self, ActivityKind},
        documents::{UploadStore, UploadedDocument},
        fare_type, passenger,
    },
    entities::{
        ApplicationStatus, DocumentRecord, ExemptionApplication, ExemptionCategory, FareType,
        Passenger, document_record, exemption_application, fare_type as fare_type_entity,
        passenger as passenger_entity,
    },
    errors::{Error, Result},
};
use sea_orm::{DatabaseTransaction, QueryOrder, Select, Set, TransactionTrait, prelude::*};
use std::collections::HashMap;
use tracing::{info, instrument};

const OPEN_APPLICATION_MESSAGE: &str = "You already have a pending exemption application";

/// A submitted application form.
#[derive(Debug, Clone)]
pub struct NewApplication {
    /// Applicant
    pub passenger_id: i64,
    /// Fare type the exemption is requested for
    pub fare_type_id: i64,
    /// Category name as typed in the form, checked during submission
    pub category: String,
    /// Free-text description of the document (e.g. "Student card")
    pub document_description: String,
    /// The uploaded supporting document
    pub document: UploadedDocument,
}

/// An application with the names the listings show.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationSummary {
    /// The application row
    pub application: exemption_application::Model,
    /// Applicant's full name
    pub passenger_name: String,
    /// Requested fare type name
    pub fare_type_name: String,
}

/// Everything the review page needs about one application.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationDetail {
    /// The application row
    pub application: exemption_application::Model,
    /// Applicant
    pub passenger: passenger_entity::Model,
    /// Requested fare type
    pub fare_type: fare_type_entity::Model,
    /// Uploaded documents, oldest first
    pub documents: Vec<document_record::Model>,
}

/// Submits an exemption application with its supporting document.
///
/// # Errors
/// - `Error::Validation` for the first broken rule: unknown passenger, unknown
///   fare type, unknown category, document format, document size, an
///   application already open
/// - `Error::Conflict` if a concurrent submission opened an application first
#[instrument(skip(db, store, new), fields(passenger_id = new.passenger_id))]
pub async fn submit_application(
    db: &DatabaseConnection,
    store: &UploadStore,
    new: NewApplication,
) -> Result<exemption_application::Model> {
    if passenger::get_passenger(db, new.passenger_id).await?.is_none() {
        return Err(Error::validation("Invalid passenger ID"));
    }
    if fare_type::get_fare_type(db, new.fare_type_id).await?.is_none() {
        return Err(Error::validation("Invalid fare type selected"));
    }
    let category = ExemptionCategory::parse(new.category.trim())
        .ok_or_else(|| Error::validation("Invalid exemption category"))?;
    new.document.validate()?;
    if has_open_application(db, new.passenger_id).await? {
        return Err(Error::validation(OPEN_APPLICATION_MESSAGE));
    }

    let txn = db.begin().await?;

    let application = exemption_application::ActiveModel {
        submitted_date: Set(chrono::Local::now().date_naive()),
        passenger_id: Set(new.passenger_id),
        fare_type_id: Set(new.fare_type_id),
        category: Set(category),
        status: Set(ApplicationStatus::Submitted),
        open_for_passenger: Set(Some(new.passenger_id)),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(|e| Error::from_db(e, OPEN_APPLICATION_MESSAGE))?;

    let stored_path = store.save(&new.document).await?;

    if let Err(e) = finish_submission(txn, &application, &new, &stored_path).await {
        store.remove(&stored_path).await;
        return Err(e);
    }

    info!(
        "Passenger {} submitted application {} ({})",
        application.passenger_id, application.id, application.category
    );
    Ok(application)
}

async fn finish_submission(
    txn: DatabaseTransaction,
    application: &exemption_application::Model,
    new: &NewApplication,
    stored_path: &str,
) -> Result<()> {
    document_record::ActiveModel {
        application_id: Set(application.id),
        document_type: Set(new.document_description.trim().to_string()),
        document_path: Set(stored_path.to_string()),
        content_type: Set(new.document.content_type.clone()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    activity::record(
        &txn,
        ActivityKind::ApplicationCreation,
        application.id,
        format!(
            "New {} exemption application submitted by passenger {}",
            application.category, application.passenger_id
        ),
    )
    .await?;

    txn.commit().await.map_err(Into::into)
}

/// True if the passenger has an application awaiting a decision.
pub async fn has_open_application<C>(db: &C, passenger_id: i64) -> Result<bool>
where
    C: ConnectionTrait,
{
    let open = ExemptionApplication::find()
        .filter(exemption_application::Column::PassengerId.eq(passenger_id))
        .filter(exemption_application::Column::Status.is_in(ApplicationStatus::OPEN))
        .count(db)
        .await?;
    Ok(open > 0)
}

/// Applications newest first, optionally only those with `status`.
pub async fn list_applications(
    db: &DatabaseConnection,
    status: Option<ApplicationStatus>,
) -> Result<Vec<ApplicationSummary>> {
    let mut query = ExemptionApplication::find();
    if let Some(status) = status {
        query = query.filter(exemption_application::Column::Status.eq(status));
    }
    summarize(db, query).await
}

/// One passenger's applications, newest first.
pub async fn applications_for_passenger(
    db: &DatabaseConnection,
    passenger_id: i64,
) -> Result<Vec<ApplicationSummary>> {
    summarize(
        db,
        ExemptionApplication::find()
            .filter(exemption_application::Column::PassengerId.eq(passenger_id)),
    )
    .await
}

async fn summarize(
    db: &DatabaseConnection,
    query: Select<ExemptionApplication>,
) -> Result<Vec<ApplicationSummary>> {
    let rows = query
        .find_also_related(Passenger)
        .order_by_desc(exemption_application::Column::SubmittedDate)
        .order_by_desc(exemption_application::Column::Id)
        .all(db)
        .await?;

    let fare_type_names: HashMap<i64, String> = FareType::find()
        .all(db)
        .await?
        .into_iter()
        .map(|f| (f.id, f.name))
        .collect();

    Ok(rows
        .into_iter()
        .map(|(application, passenger)| ApplicationSummary {
            passenger_name: passenger.map(|p| p.full_name).unwrap_or_default(),
            fare_type_name: fare_type_names
                .get(&application.fare_type_id)
                .cloned()
                .unwrap_or_default(),
            application,
        })
        .collect())
}

/// Finds an application, failing with `Error::ApplicationNotFound`.
pub async fn require_application<C>(db: &C, application_id: i64) -> Result<exemption_application::Model>
where
    C: ConnectionTrait,
{
    ExemptionApplication::find_by_id(application_id)
        .one(db)
        .await?
        .ok_or(Error::ApplicationNotFound { id: application_id })
}

/// Loads an application with its passenger, requested fare type and documents.
pub async fn application_detail(
    db: &DatabaseConnection,
    application_id: i64,
) -> Result<ApplicationDetail> {
    let application = require_application(db, application_id).await?;
    let passenger = passenger::require_passenger(db, application.passenger_id).await?;
    let fare_type = FareType::find_by_id(application.fare_type_id)
        .one(db)
        .await?
        .ok_or(Error::FareTypeNotFound {
            id: application.fare_type_id,
        })?;
    let documents = application
        .find_related(DocumentRecord)
        .order_by_asc(document_record::Column::Id)
        .all(db)
        .await?;

    Ok(ApplicationDetail {
        application,
        passenger,
        fare_type,
        documents,
    })
}

/// Finds a document record, failing with `Error::DocumentNotFound`.
pub async fn get_document(
    db: &DatabaseConnection,
    document_id: i64,
) -> Result<document_record::Model> {
    DocumentRecord::find_by_id(document_id)
        .one(db)
        .await?
        .ok_or(Error::DocumentNotFound { id: document_id })
}
