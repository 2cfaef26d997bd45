//! Administrative review of exemption applications.
//!
//! Status moves are compare-and-set updates: the UPDATE only matches while
//! the row is still in one of the allowed source statuses, so when two
//! reviewers act on the same application only one of them wins. Deciding an
//! application clears its open slot, which lets the passenger apply again.

use crate::{
    core::{
        activity::{self, ActivityKind},
        application::require_application,
        fare_type,
    },
    db::{execute, statement},
    entities::{ApplicationStatus, ExemptionCategory, exemption, exemption_application},
    errors::{Error, Result},
};
use chrono::Days;
use sea_orm::{Set, TransactionTrait, Value, prelude::*};
use tracing::{info, instrument};

/// Days an approved exemption stays valid.
pub const EXEMPTION_VALIDITY_DAYS: u64 = 365;

const VALIDATE_FROM: [ApplicationStatus; 2] =
    [ApplicationStatus::Submitted, ApplicationStatus::Pending];

/// Marks the documents of an application as checked.
///
/// # Errors
/// - `Error::ApplicationNotFound` if the id is unknown
/// - `Error::InvalidTransition` unless the application is Submitted or Pending
#[instrument(skip(db))]
pub async fn validate_documents(
    db: &DatabaseConnection,
    application_id: i64,
) -> Result<exemption_application::Model> {
    let txn = db.begin().await?;

    let application = require_application(&txn, application_id).await?;
    transition(&txn, &application, &VALIDATE_FROM, ApplicationStatus::Validated).await?;

    activity::record(
        &txn,
        ActivityKind::ApplicationValidation,
        application_id,
        format!("Documents for application {application_id} validated"),
    )
    .await?;

    let application = require_application(&txn, application_id).await?;
    txn.commit().await?;

    info!("Validated application {}", application_id);
    Ok(application)
}

/// Approves an application and grants the exemption.
///
/// The exemption belongs to the application's passenger, uses the given fare
/// type and category, and is valid from today for
/// [`EXEMPTION_VALIDITY_DAYS`] days.
///
/// # Errors
/// - `Error::ApplicationNotFound` if the id is unknown
/// - `Error::Validation` for an unknown fare type or category
/// - `Error::InvalidTransition` if the application was already decided
#[instrument(skip(db))]
pub async fn approve_application(
    db: &DatabaseConnection,
    application_id: i64,
    fare_type_id: i64,
    category: &str,
) -> Result<exemption::Model> {
    require_application(db, application_id).await?;
    if fare_type::get_fare_type(db, fare_type_id).await?.is_none() {
        return Err(Error::validation("Invalid fare type selected"));
    }
    let category = ExemptionCategory::parse(category.trim())
        .ok_or_else(|| Error::validation("Invalid exemption category"))?;

    let txn = db.begin().await?;

    let application = require_application(&txn, application_id).await?;
    transition(
        &txn,
        &application,
        &ApplicationStatus::OPEN,
        ApplicationStatus::Approved,
    )
    .await?;

    let valid_from = chrono::Local::now().date_naive();
    let exemption = exemption::ActiveModel {
        category: Set(category),
        passenger_id: Set(application.passenger_id),
        fare_type_id: Set(fare_type_id),
        valid_from: Set(valid_from),
        valid_to: Set(valid_from + Days::new(EXEMPTION_VALIDITY_DAYS)),
        application_id: Set(Some(application_id)),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    activity::record(
        &txn,
        ActivityKind::ApplicationApproval,
        application_id,
        format!(
            "Application {application_id} approved; {category} exemption {} granted to passenger {} until {}",
            exemption.id, exemption.passenger_id, exemption.valid_to
        ),
    )
    .await?;

    txn.commit().await?;

    info!(
        "Approved application {} as exemption {}",
        application_id, exemption.id
    );
    Ok(exemption)
}

/// Rejects an application.
///
/// # Errors
/// - `Error::ApplicationNotFound` if the id is unknown
/// - `Error::InvalidTransition` if the application was already decided
#[instrument(skip(db))]
pub async fn reject_application(
    db: &DatabaseConnection,
    application_id: i64,
) -> Result<exemption_application::Model> {
    let txn = db.begin().await?;

    let application = require_application(&txn, application_id).await?;
    transition(
        &txn,
        &application,
        &ApplicationStatus::OPEN,
        ApplicationStatus::Rejected,
    )
    .await?;

    activity::record(
        &txn,
        ActivityKind::ApplicationRejection,
        application_id,
        format!("Application {application_id} rejected"),
    )
    .await?;

    let application = require_application(&txn, application_id).await?;
    txn.commit().await?;

    info!("Rejected application {}", application_id);
    Ok(application)
}

/// Moves `application` to `to` if it is still in one of `allowed_from`.
async fn transition<C>(
    db: &C,
    application: &exemption_application::Model,
    allowed_from: &[ApplicationStatus],
    to: ApplicationStatus,
) -> Result<()>
where
    C: ConnectionTrait,
{
    let invalid = || Error::InvalidTransition {
        from: application.status.to_string(),
        to: to.to_string(),
    };
    if !allowed_from.contains(&application.status) {
        return Err(invalid());
    }

    let placeholders = vec!["?"; allowed_from.len()].join(", ");
    let clear_open_slot = if to.is_open() {
        ""
    } else {
        ", open_for_passenger = NULL"
    };
    let sql = format!(
        "UPDATE exemption_application SET status = ?{clear_open_slot} \
         WHERE id = ? AND status IN ({placeholders})"
    );

    let mut values: Vec<Value> = vec![to.into(), application.id.into()];
    values.extend(allowed_from.iter().copied().map(Into::<Value>::into));

    let outcome = execute(db, statement(db, &sql, values)).await?;
    if outcome.affected_rows == 0 {
        // another reviewer moved it first
        return Err(invalid());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{core::application, entities::Exemption, test_utils::*};

    #[tokio::test]
    async fn test_validate_then_approve() -> Result<()> {
        let (db, store, _dir) = setup_with_store().await?;
        let passenger = create_test_passenger(&db, "Ada Lovelace", "ada@example.com").await?;
        let adult = create_test_fare_type(&db, "Adult", 2.0, 0.0).await?;
        let student = create_test_fare_type(&db, "Student", 2.0, 50.0).await?;
        let submitted = create_test_application(&db, &store, passenger.id, adult.fare_type.id).await?;

        let validated = validate_documents(&db, submitted.id).await?;
        assert_eq!(validated.status, ApplicationStatus::Validated);
        assert_eq!(validated.open_for_passenger, Some(passenger.id));

        let exemption =
            approve_application(&db, submitted.id, student.fare_type.id, "Student").await?;
        assert_eq!(exemption.passenger_id, passenger.id);
        assert_eq!(exemption.fare_type_id, student.fare_type.id);
        assert_eq!(exemption.category, ExemptionCategory::Student);
        assert_eq!(exemption.application_id, Some(submitted.id));
        assert_eq!((exemption.valid_to - exemption.valid_from).num_days(), 365);

        let decided = application::require_application(&db, submitted.id).await?;
        assert_eq!(decided.status, ApplicationStatus::Approved);
        assert_eq!(decided.open_for_passenger, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_decided_application_is_final() -> Result<()> {
        let (db, store, _dir) = setup_with_store().await?;
        let passenger = create_test_passenger(&db, "Ada Lovelace", "ada@example.com").await?;
        let fare = create_test_fare_type(&db, "Adult", 2.0, 25.0).await?;
        let submitted = create_test_application(&db, &store, passenger.id, fare.fare_type.id).await?;

        let rejected = reject_application(&db, submitted.id).await?;
        assert_eq!(rejected.status, ApplicationStatus::Rejected);
        assert_eq!(rejected.open_for_passenger, None);

        let again = approve_application(&db, submitted.id, fare.fare_type.id, "Senior").await;
        assert!(matches!(
            again,
            Err(Error::InvalidTransition { ref from, ref to }) if from == "Rejected" && to == "Approved"
        ));
        assert!(matches!(
            validate_documents(&db, submitted.id).await,
            Err(Error::InvalidTransition { .. })
        ));
        assert!(matches!(
            reject_application(&db, submitted.id).await,
            Err(Error::InvalidTransition { .. })
        ));
        assert!(Exemption::find().all(&db).await?.is_empty());

        // the slot is free again
        create_test_application(&db, &store, passenger.id, fare.fare_type.id).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_validate_only_from_submitted_or_pending() -> Result<()> {
        let (db, store, _dir) = setup_with_store().await?;
        let passenger = create_test_passenger(&db, "Ada Lovelace", "ada@example.com").await?;
        let fare = create_test_fare_type(&db, "Adult", 2.0, 25.0).await?;
        let submitted = create_test_application(&db, &store, passenger.id, fare.fare_type.id).await?;

        validate_documents(&db, submitted.id).await?;
        assert!(matches!(
            validate_documents(&db, submitted.id).await,
            Err(Error::InvalidTransition { .. })
        ));

        let legacy = exemption_application::ActiveModel {
            submitted_date: Set(chrono::Local::now().date_naive()),
            passenger_id: Set(passenger.id),
            fare_type_id: Set(fare.fare_type.id),
            category: Set(ExemptionCategory::Senior),
            status: Set(ApplicationStatus::Pending),
            open_for_passenger: Set(None),
            ..Default::default()
        }
        .insert(&db)
        .await?;
        let validated = validate_documents(&db, legacy.id).await?;
        assert_eq!(validated.status, ApplicationStatus::Validated);
        Ok(())
    }

    #[tokio::test]
    async fn test_approve_checks_inputs() -> Result<()> {
        let (db, store, _dir) = setup_with_store().await?;
        let passenger = create_test_passenger(&db, "Ada Lovelace", "ada@example.com").await?;
        let fare = create_test_fare_type(&db, "Adult", 2.0, 25.0).await?;
        let submitted = create_test_application(&db, &store, passenger.id, fare.fare_type.id).await?;

        assert!(matches!(
            approve_application(&db, 999, fare.fare_type.id, "Student").await,
            Err(Error::ApplicationNotFound { id: 999 })
        ));
        assert!(matches!(
            approve_application(&db, submitted.id, 999, "Student").await,
            Err(Error::Validation { .. })
        ));
        assert!(matches!(
            approve_application(&db, submitted.id, fare.fare_type.id, "Veteran").await,
            Err(Error::Validation { .. })
        ));

        let untouched = application::require_application(&db, submitted.id).await?;
        assert_eq!(untouched.status, ApplicationStatus::Submitted);
        Ok(())
    }

    #[tokio::test]
    async fn test_lost_race_reports_invalid_transition() -> Result<()> {
        let (db, store, _dir) = setup_with_store().await?;
        let passenger = create_test_passenger(&db, "Ada Lovelace", "ada@example.com").await?;
        let fare = create_test_fare_type(&db, "Adult", 2.0, 25.0).await?;
        let submitted = create_test_application(&db, &store, passenger.id, fare.fare_type.id).await?;

        // a stale copy still says Submitted
        let stale = submitted.clone();
        reject_application(&db, submitted.id).await?;

        let result = transition(&db, &stale, &ApplicationStatus::OPEN, ApplicationStatus::Approved).await;
        assert!(matches!(result, Err(Error::InvalidTransition { .. })));
        Ok(())
    }
}
