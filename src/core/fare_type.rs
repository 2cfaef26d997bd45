//! Fare type business logic - fare types and their tariffs.
//!
//! A fare type and its tariff are always written together in one
//! transaction, so every fare type has exactly one tariff. Deletion relies on
//! the foreign keys: the tariff cascades, while tickets, exemptions and
//! applications that still reference the fare type make the delete fail with
//! a conflict.

use crate::{
    core::activity::{self, ActivityKind},
    entities::{FareType, Tariff, Ticket, fare_type, tariff, ticket},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{info, instrument};

/// Editable fields of a fare type and its tariff.
#[derive(Debug, Clone, PartialEq)]
pub struct FareTypeInput {
    /// Display name, 2 to 50 characters
    pub name: String,
    /// At least 5 characters
    pub description: String,
    /// Non-empty validity text
    pub validity: String,
    /// Non-negative price
    pub base_price: f64,
    /// Percent, 0 to 100
    pub discount_rate: f64,
}

/// A fare type joined with its tariff.
#[derive(Debug, Clone, PartialEq)]
pub struct FareTypeWithTariff {
    /// The fare type row
    pub fare_type: fare_type::Model,
    /// Its tariff
    pub tariff: tariff::Model,
}

/// Checks the field rules that do not need the database.
///
/// # Errors
/// `Error::Validation` with the first violated rule.
pub fn validate_input(input: &FareTypeInput) -> Result<()> {
    let name_len = input.name.trim().chars().count();
    if !(2..=50).contains(&name_len) {
        return Err(Error::validation("Type name must be between 2 and 50 characters"));
    }
    if input.description.trim().chars().count() < 5 {
        return Err(Error::validation(
            "Please provide a more detailed description (at least 5 characters)",
        ));
    }
    if input.validity.trim().is_empty() {
        return Err(Error::validation("Please describe how long the fare is valid"));
    }
    if !input.base_price.is_finite() || input.base_price < 0.0 {
        return Err(Error::validation("Base price must be a positive number"));
    }
    if !input.discount_rate.is_finite() || !(0.0..=100.0).contains(&input.discount_rate) {
        return Err(Error::validation("Discount rate must be between 0 and 100"));
    }
    Ok(())
}

fn duplicate_name_message(name: &str) -> String {
    format!("A fare type with name '{name}' already exists")
}

/// Creates a fare type together with its tariff.
///
/// # Errors
/// - `Error::Validation` for broken field rules or a taken name
/// - `Error::Conflict` when the UNIQUE index catches a concurrent duplicate
#[instrument(skip(db))]
pub async fn create_fare_type(
    db: &DatabaseConnection,
    input: FareTypeInput,
) -> Result<FareTypeWithTariff> {
    validate_input(&input)?;
    let name = input.name.trim().to_string();

    if find_by_name(db, &name).await?.is_some() {
        return Err(Error::validation(duplicate_name_message(&name)));
    }

    let txn = db.begin().await?;

    let fare_type = fare_type::ActiveModel {
        name: Set(name.clone()),
        description: Set(input.description.trim().to_string()),
        validity: Set(input.validity.trim().to_string()),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(|e| Error::from_db(e, duplicate_name_message(&name)))?;

    let tariff = tariff::ActiveModel {
        base_price: Set(input.base_price),
        discount_rate: Set(input.discount_rate),
        fare_type_id: Set(fare_type.id),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    activity::record(
        &txn,
        ActivityKind::FareTypeCreation,
        fare_type.id,
        format!(
            "New fare type '{}' created with base price {} and discount rate {}%",
            fare_type.name, tariff.base_price, tariff.discount_rate
        ),
    )
    .await?;

    txn.commit().await?;

    info!("Created fare type {} '{}'", fare_type.id, fare_type.name);
    Ok(FareTypeWithTariff { fare_type, tariff })
}

/// Updates a fare type and its tariff.
///
/// # Errors
/// - `Error::FareTypeNotFound` if the id is unknown
/// - `Error::Validation` for broken field rules or a name taken by another fare type
#[instrument(skip(db))]
pub async fn update_fare_type(
    db: &DatabaseConnection,
    fare_type_id: i64,
    input: FareTypeInput,
) -> Result<FareTypeWithTariff> {
    validate_input(&input)?;
    let name = input.name.trim().to_string();

    let existing = require_fare_type(db, fare_type_id).await?;

    if let Some(other) = find_by_name(db, &name).await? {
        if other.id != fare_type_id {
            return Err(Error::validation(duplicate_name_message(&name)));
        }
    }

    let txn = db.begin().await?;

    let mut fare_type: fare_type::ActiveModel = existing.fare_type.into();
    fare_type.name = Set(name.clone());
    fare_type.description = Set(input.description.trim().to_string());
    fare_type.validity = Set(input.validity.trim().to_string());
    let fare_type = fare_type
        .update(&txn)
        .await
        .map_err(|e| Error::from_db(e, duplicate_name_message(&name)))?;

    let mut tariff: tariff::ActiveModel = existing.tariff.into();
    tariff.base_price = Set(input.base_price);
    tariff.discount_rate = Set(input.discount_rate);
    let tariff = tariff.update(&txn).await?;

    activity::record(
        &txn,
        ActivityKind::FareTypeUpdate,
        fare_type.id,
        format!(
            "Fare type '{}' (ID: {}) updated with base price {} and discount rate {}%",
            fare_type.name, fare_type.id, tariff.base_price, tariff.discount_rate
        ),
    )
    .await?;

    txn.commit().await?;

    info!("Updated fare type {} '{}'", fare_type.id, fare_type.name);
    Ok(FareTypeWithTariff { fare_type, tariff })
}

/// Loads what the delete confirmation page shows: the fare type and how many
/// tickets reference it.
pub async fn delete_preview(
    db: &DatabaseConnection,
    fare_type_id: i64,
) -> Result<(FareTypeWithTariff, u64)> {
    let fare_type = require_fare_type(db, fare_type_id).await?;
    let tickets = Ticket::find()
        .filter(ticket::Column::FareTypeId.eq(fare_type_id))
        .count(db)
        .await?;
    Ok((fare_type, tickets))
}

/// Deletes a fare type; its tariff is removed by the cascade.
///
/// # Errors
/// - `Error::FareTypeNotFound` if the id is unknown
/// - `Error::Conflict` if tickets, exemptions or applications still reference it
#[instrument(skip(db))]
pub async fn delete_fare_type(db: &DatabaseConnection, fare_type_id: i64) -> Result<()> {
    let existing = require_fare_type(db, fare_type_id).await?;
    let name = existing.fare_type.name;

    let txn = db.begin().await?;

    FareType::delete_by_id(fare_type_id)
        .exec(&txn)
        .await
        .map_err(|e| {
            Error::from_db(
                e,
                format!("Fare type '{name}' is still used by tickets, exemptions or applications and cannot be deleted"),
            )
        })?;

    activity::record(
        &txn,
        ActivityKind::FareTypeDeletion,
        fare_type_id,
        format!("Fare type '{name}' (ID: {fare_type_id}) was deleted"),
    )
    .await?;

    txn.commit().await?;

    info!("Deleted fare type {} '{}'", fare_type_id, name);
    Ok(())
}

/// All fare types with their tariffs, ordered by name.
///
/// A fare type without a tariff is skipped; it cannot be priced.
pub async fn list_fare_types(db: &DatabaseConnection) -> Result<Vec<FareTypeWithTariff>> {
    let rows = FareType::find()
        .find_also_related(Tariff)
        .order_by_asc(fare_type::Column::Name)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(fare_type, tariff)| {
            tariff.map(|tariff| FareTypeWithTariff { fare_type, tariff })
        })
        .collect())
}

/// Finds a fare type with its tariff.
pub async fn get_fare_type<C>(db: &C, fare_type_id: i64) -> Result<Option<FareTypeWithTariff>>
where
    C: ConnectionTrait,
{
    let row = FareType::find_by_id(fare_type_id)
        .find_also_related(Tariff)
        .one(db)
        .await?;

    Ok(row.and_then(|(fare_type, tariff)| {
        tariff.map(|tariff| FareTypeWithTariff { fare_type, tariff })
    }))
}

/// Finds a fare type with its tariff, failing with `Error::FareTypeNotFound`.
pub async fn require_fare_type<C>(db: &C, fare_type_id: i64) -> Result<FareTypeWithTariff>
where
    C: ConnectionTrait,
{
    get_fare_type(db, fare_type_id)
        .await?
        .ok_or(Error::FareTypeNotFound { id: fare_type_id })
}

async fn find_by_name(db: &DatabaseConnection, name: &str) -> Result<Option<fare_type::Model>> {
    FareType::find()
        .filter(fare_type::Column::Name.eq(name))
        .one(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    fn input(name: &str) -> FareTypeInput {
        FareTypeInput {
            name: name.to_string(),
            description: "Standard single journey".to_string(),
            validity: "Single journey".to_string(),
            base_price: 2.0,
            discount_rate: 25.0,
        }
    }

    #[tokio::test]
    async fn test_create_fare_type_validation() -> Result<()> {
        let db = setup_test_db().await?;

        let result = create_fare_type(&db, input("A")).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let mut short_description = input("Adult");
        short_description.description = "abc".to_string();
        assert!(matches!(
            create_fare_type(&db, short_description).await,
            Err(Error::Validation { .. })
        ));

        let mut negative_price = input("Adult");
        negative_price.base_price = -1.0;
        assert!(matches!(
            create_fare_type(&db, negative_price).await,
            Err(Error::Validation { ref message }) if message == "Base price must be a positive number"
        ));

        let mut high_rate = input("Adult");
        high_rate.discount_rate = 100.5;
        assert!(matches!(
            create_fare_type(&db, high_rate).await,
            Err(Error::Validation { ref message }) if message == "Discount rate must be between 0 and 100"
        ));

        let mut nan_rate = input("Adult");
        nan_rate.discount_rate = f64::NAN;
        assert!(create_fare_type(&db, nan_rate).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_create_fare_type_integration() -> Result<()> {
        let db = setup_test_db().await?;
        let created = create_fare_type(&db, input("Adult")).await?;

        assert_eq!(created.fare_type.name, "Adult");
        assert_eq!(created.tariff.fare_type_id, created.fare_type.id);
        assert_eq!(created.tariff.base_price, 2.0);
        assert_eq!(created.tariff.discount_rate, 25.0);

        let listed = list_fare_types(&db).await?;
        assert_eq!(listed, vec![created]);
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        create_fare_type(&db, input("Adult")).await?;

        let err = create_fare_type(&db, input("Adult")).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Validation { ref message } if message == "A fare type with name 'Adult' already exists"
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_one_tariff_per_fare_type_enforced() -> Result<()> {
        let db = setup_test_db().await?;
        let created = create_fare_type(&db, input("Adult")).await?;

        let second = tariff::ActiveModel {
            base_price: Set(1.0),
            discount_rate: Set(0.0),
            fare_type_id: Set(created.fare_type.id),
            ..Default::default()
        }
        .insert(&db)
        .await
        .map_err(|e| Error::from_db(e, "second tariff"));
        assert!(matches!(second, Err(Error::Conflict { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_fare_type() -> Result<()> {
        let db = setup_test_db().await?;
        let created = create_fare_type(&db, input("Adult")).await?;
        create_fare_type(&db, input("Student")).await?;

        let mut changed = input("Adult Peak");
        changed.base_price = 2.5;
        changed.discount_rate = 10.0;
        let updated = update_fare_type(&db, created.fare_type.id, changed).await?;
        assert_eq!(updated.fare_type.name, "Adult Peak");
        assert_eq!(updated.tariff.id, created.tariff.id);
        assert_eq!(updated.tariff.base_price, 2.5);

        // keeping its own name is fine, taking another's is not
        update_fare_type(&db, created.fare_type.id, input("Adult Peak")).await?;
        let err = update_fare_type(&db, created.fare_type.id, input("Student"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));

        let missing = update_fare_type(&db, 999, input("Ghost")).await.unwrap_err();
        assert!(matches!(missing, Error::FareTypeNotFound { id: 999 }));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_cascades_tariff() -> Result<()> {
        let db = setup_test_db().await?;
        let created = create_fare_type(&db, input("Weekend")).await?;

        let (_, tickets) = delete_preview(&db, created.fare_type.id).await?;
        assert_eq!(tickets, 0);

        delete_fare_type(&db, created.fare_type.id).await?;

        assert!(get_fare_type(&db, created.fare_type.id).await?.is_none());
        assert!(Tariff::find_by_id(created.tariff.id).one(&db).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_refused_while_tickets_reference_it() -> Result<()> {
        let db = setup_test_db().await?;
        let passenger = create_test_passenger(&db, "Ada Lovelace", "ada@example.com").await?;
        let fare = create_fare_type(&db, input("Adult")).await?;
        crate::core::fare::issue_ticket(
            &db,
            crate::core::fare::TicketOrder {
                passenger_id: passenger.id,
                fare_type_id: fare.fare_type.id,
                exemption_id: None,
                payment_method: "Cash".to_string(),
            },
        )
        .await?;

        let (_, tickets) = delete_preview(&db, fare.fare_type.id).await?;
        assert_eq!(tickets, 1);

        let err = delete_fare_type(&db, fare.fare_type.id).await.unwrap_err();
        assert!(matches!(err, Error::Conflict { .. }));
        assert!(get_fare_type(&db, fare.fare_type.id).await?.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_refused_while_only_an_application_references_it() -> Result<()> {
        let (db, store, _dir) = setup_with_store().await?;
        let passenger = create_test_passenger(&db, "Ada Lovelace", "ada@example.com").await?;
        let requested = create_fare_type(&db, input("Student")).await?;
        create_test_application(&db, &store, passenger.id, requested.fare_type.id).await?;

        let (_, tickets) = delete_preview(&db, requested.fare_type.id).await?;
        assert_eq!(tickets, 0);

        let err = delete_fare_type(&db, requested.fare_type.id).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Conflict { ref message } if message.contains("'Student' is still used")
        ));
        let kept = require_fare_type(&db, requested.fare_type.id).await?;
        assert_eq!(kept.tariff, requested.tariff);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_refused_while_only_an_exemption_references_it() -> Result<()> {
        let db = setup_test_db().await?;
        let passenger = create_test_passenger(&db, "Ada Lovelace", "ada@example.com").await?;
        let granted = create_fare_type(&db, input("Senior")).await?;
        create_test_exemption(
            &db,
            passenger.id,
            granted.fare_type.id,
            chrono::Local::now().date_naive(),
        )
        .await?;

        assert!(matches!(
            delete_fare_type(&db, granted.fare_type.id).await,
            Err(Error::Conflict { .. })
        ));
        assert!(get_fare_type(&db, granted.fare_type.id).await?.is_some());
        Ok(())
    }
}
