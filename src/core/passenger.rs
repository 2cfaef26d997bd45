//! Passenger business logic - registration and lookups.
//!
//! Registration validates the form in a fixed order and reports only the
//! first violation, so the page can show a single message next to the
//! values the user typed.

use crate::{
    core::activity::{self, ActivityKind},
    entities::{Passenger, passenger},
    errors::{Error, Result},
};
use regex::Regex;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use std::sync::LazyLock;
use tracing::{info, instrument};

/// Minimum length of a passenger's full name, in characters.
pub const NAME_MIN_CHARS: usize = 3;
/// Maximum length of a passenger's full name, in characters.
pub const NAME_MAX_CHARS: usize = 100;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)] // literal pattern, checked by the tests below
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
});

/// Checks a full name against the length rule.
pub fn validate_full_name(full_name: &str) -> Result<()> {
    let len = full_name.trim().chars().count();
    if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&len) {
        return Err(Error::validation(format!(
            "Name must be between {NAME_MIN_CHARS} and {NAME_MAX_CHARS} characters"
        )));
    }
    Ok(())
}

/// Checks the shape of an email address.
pub fn validate_email(email: &str) -> Result<()> {
    if !EMAIL_PATTERN.is_match(email.trim()) {
        return Err(Error::validation("Please provide a valid email address"));
    }
    Ok(())
}

/// Registers a new passenger.
///
/// # Errors
/// - `Error::Validation` for the first broken rule: name length, email shape,
///   email already registered
/// - `Error::Conflict` if a concurrent registration took the email between the
///   check and the insert
#[instrument(skip(db))]
pub async fn register_passenger(
    db: &DatabaseConnection,
    full_name: &str,
    email: &str,
) -> Result<passenger::Model> {
    validate_full_name(full_name)?;
    validate_email(email)?;

    let full_name = full_name.trim().to_string();
    let email = email.trim().to_string();

    if get_passenger_by_email(db, &email).await?.is_some() {
        return Err(Error::validation("This email address is already registered"));
    }

    let txn = db.begin().await?;

    let passenger = passenger::ActiveModel {
        full_name: Set(full_name),
        email: Set(email),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(|e| Error::from_db(e, "This email address is already registered"))?;

    activity::record(
        &txn,
        ActivityKind::PassengerRegistration,
        passenger.id,
        format!("Passenger '{}' registered", passenger.full_name),
    )
    .await?;

    txn.commit().await?;

    info!("Registered passenger {} ({})", passenger.id, passenger.email);
    Ok(passenger)
}

/// Finds a passenger by id.
pub async fn get_passenger<C>(db: &C, passenger_id: i64) -> Result<Option<passenger::Model>>
where
    C: ConnectionTrait,
{
    Passenger::find_by_id(passenger_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a passenger by id, failing with `Error::PassengerNotFound`.
pub async fn require_passenger<C>(db: &C, passenger_id: i64) -> Result<passenger::Model>
where
    C: ConnectionTrait,
{
    get_passenger(db, passenger_id)
        .await?
        .ok_or(Error::PassengerNotFound { id: passenger_id })
}

/// Finds a passenger by exact email.
pub async fn get_passenger_by_email(
    db: &DatabaseConnection,
    email: &str,
) -> Result<Option<passenger::Model>> {
    Passenger::find()
        .filter(passenger::Column::Email.eq(email))
        .one(db)
        .await
        .map_err(Into::into)
}

/// All passengers, ordered by name.
pub async fn list_passengers(db: &DatabaseConnection) -> Result<Vec<passenger::Model>> {
    Passenger::find()
        .order_by_asc(passenger::Column::FullName)
        .order_by_asc(passenger::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn test_email_pattern() {
        assert!(validate_email("ada@example.com").is_ok());
        assert!(validate_email("first.last+tag@sub.example.co").is_ok());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("missing@tld").is_err());
        assert!(validate_email("a@b.c").is_err());
    }

    #[test]
    fn test_name_length_bounds() {
        assert!(validate_full_name("Al").is_err());
        assert!(validate_full_name("Ali").is_ok());
        assert!(validate_full_name(&"x".repeat(100)).is_ok());
        assert!(validate_full_name(&"x".repeat(101)).is_err());
        // counted in characters, not bytes
        assert!(validate_full_name("Zoë").is_ok());
    }

    #[tokio::test]
    async fn test_register_reports_first_violation_only() -> Result<()> {
        let db = setup_test_db().await?;

        let err = register_passenger(&db, "Al", "bad").await.unwrap_err();
        assert!(
            matches!(err, Error::Validation { ref message } if message.starts_with("Name must be"))
        );

        let err = register_passenger(&db, "Alan Turing", "bad").await.unwrap_err();
        assert!(
            matches!(err, Error::Validation { ref message } if message == "Please provide a valid email address")
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_register_round_trip() -> Result<()> {
        let db = setup_test_db().await?;

        let created = register_passenger(&db, "  Ada Lovelace ", "ada@example.com").await?;
        let found = get_passenger(&db, created.id).await?.unwrap();

        assert_eq!(found.full_name, "Ada Lovelace");
        assert_eq!(found.email, "ada@example.com");
        Ok(())
    }

    #[tokio::test]
    async fn test_register_duplicate_email_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        register_passenger(&db, "Ada Lovelace", "ada@example.com").await?;

        let err = register_passenger(&db, "Ada Byron", "ada@example.com")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Validation { ref message } if message == "This email address is already registered"
        ));
        assert_eq!(list_passengers(&db).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_unique_index_backs_the_check() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_passenger(&db, "Ada Lovelace", "ada@example.com").await?;

        // Bypass the pre-check to hit the constraint directly
        let result = passenger::ActiveModel {
            full_name: Set("Impostor".to_string()),
            email: Set("ada@example.com".to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await
        .map_err(|e| Error::from_db(e, "taken"));

        assert!(matches!(result, Err(Error::Conflict { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_require_passenger_not_found() -> Result<()> {
        let db = setup_test_db().await?;
        let err = require_passenger(&db, 42).await.unwrap_err();
        assert!(matches!(err, Error::PassengerNotFound { id: 42 }));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_passengers_sorted_by_name() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_passenger(&db, "Zed Shaw", "zed@example.com").await?;
        create_test_passenger(&db, "Ada Lovelace", "ada@example.com").await?;

        let names: Vec<String> = list_passengers(&db)
            .await?
            .into_iter()
            .map(|p| p.full_name)
            .collect();
        assert_eq!(names, vec!["Ada Lovelace", "Zed Shaw"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_registration_is_logged() -> Result<()> {
        let db = setup_test_db().await?;
        let passenger = register_passenger(&db, "Ada Lovelace", "ada@example.com").await?;
        let history = activity::activity_for_entity(&db, "passenger", passenger.id).await?;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].activity_type, "passenger_registration");
        Ok(())
    }
}
