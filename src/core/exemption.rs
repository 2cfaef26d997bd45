//! Exemption lookups.
//!
//! Exemptions are never updated after approval; whether one still applies
//! is decided against the day passed in by the caller.

use crate::{
    db::{fetch_all, fetch_one, statement},
    entities::{ExemptionCategory, exemption},
    errors::{Error, Result},
};
use sea_orm::{ConnectionTrait, FromQueryResult, prelude::Date};

/// An exemption with its fare type name and the discount it grants.
#[derive(Debug, Clone, PartialEq)]
pub struct ExemptionView {
    /// The exemption row
    pub exemption: exemption::Model,
    /// Name of the exemption's fare type
    pub fare_type_name: String,
    /// Tariff discount rate of the exemption's fare type, percent
    pub discount_rate: f64,
    /// Valid on the day the view was built
    pub is_active: bool,
}

#[derive(Debug, FromQueryResult)]
struct ExemptionRow {
    id: i64,
    category: ExemptionCategory,
    passenger_id: i64,
    fare_type_id: i64,
    valid_from: Date,
    valid_to: Date,
    application_id: Option<i64>,
    fare_type_name: String,
    discount_rate: f64,
}

impl ExemptionRow {
    fn into_view(self, today: Date) -> ExemptionView {
        let exemption = exemption::Model {
            id: self.id,
            category: self.category,
            passenger_id: self.passenger_id,
            fare_type_id: self.fare_type_id,
            valid_from: self.valid_from,
            valid_to: self.valid_to,
            application_id: self.application_id,
        };
        ExemptionView {
            is_active: exemption.is_valid_on(today),
            exemption,
            fare_type_name: self.fare_type_name,
            discount_rate: self.discount_rate,
        }
    }
}

const SELECT_EXEMPTIONS: &str = "SELECT e.id, e.category, e.passenger_id, e.fare_type_id, \
     e.valid_from, e.valid_to, e.application_id, f.name AS fare_type_name, t.discount_rate \
     FROM exemption e \
     JOIN fare_type f ON f.id = e.fare_type_id \
     JOIN tariff t ON t.fare_type_id = f.id";

/// Every exemption a passenger holds, latest expiry first.
pub async fn exemptions_for_passenger<C>(
    db: &C,
    passenger_id: i64,
    today: Date,
) -> Result<Vec<ExemptionView>>
where
    C: ConnectionTrait,
{
    let rows: Vec<ExemptionRow> = fetch_all(
        db,
        statement(
            db,
            &format!("{SELECT_EXEMPTIONS} WHERE e.passenger_id = ? ORDER BY e.valid_to DESC, e.id DESC"),
            [passenger_id.into()],
        ),
    )
    .await?;
    Ok(rows.into_iter().map(|row| row.into_view(today)).collect())
}

/// Exemptions of a passenger that are valid on `today`.
pub async fn active_exemptions<C>(
    db: &C,
    passenger_id: i64,
    today: Date,
) -> Result<Vec<ExemptionView>>
where
    C: ConnectionTrait,
{
    Ok(exemptions_for_passenger(db, passenger_id, today)
        .await?
        .into_iter()
        .filter(|view| view.is_active)
        .collect())
}

/// Finds an exemption with its discount, `None` if the id is unknown.
pub async fn get_exemption<C>(
    db: &C,
    exemption_id: i64,
    today: Date,
) -> Result<Option<ExemptionView>>
where
    C: ConnectionTrait,
{
    let row: Option<ExemptionRow> = fetch_one(
        db,
        statement(
            db,
            &format!("{SELECT_EXEMPTIONS} WHERE e.id = ?"),
            [exemption_id.into()],
        ),
    )
    .await?;
    Ok(row.map(|row| row.into_view(today)))
}

/// The exemption `exemption_id` if it belongs to `passenger_id` and applies on `today`.
///
/// # Errors
/// `Error::Validation` when the exemption is unknown, held by someone else
/// or outside its validity window.
pub async fn require_usable_exemption<C>(
    db: &C,
    passenger_id: i64,
    exemption_id: i64,
    today: Date,
) -> Result<ExemptionView>
where
    C: ConnectionTrait,
{
    match get_exemption(db, exemption_id, today).await? {
        Some(view) if view.exemption.passenger_id == passenger_id && view.is_active => Ok(view),
        Some(view) if view.exemption.passenger_id == passenger_id => {
            let message = if today < view.exemption.valid_from {
                format!(
                    "Exemption {exemption_id} is not valid until {}",
                    view.exemption.valid_from
                )
            } else {
                format!("Exemption {exemption_id} expired on {}", view.exemption.valid_to)
            };
            Err(Error::validation(message))
        }
        _ => Err(Error::validation("Invalid exemption selected")),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use chrono::{Days, NaiveDate};

    #[tokio::test]
    async fn test_active_versus_expired() -> Result<()> {
        let db = setup_test_db().await?;
        let passenger = create_test_passenger(&db, "Ada Lovelace", "ada@example.com").await?;
        let student = create_test_fare_type(&db, "Student", 2.0, 50.0).await?;
        let senior = create_test_fare_type(&db, "Senior", 2.0, 30.0).await?;

        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let current = create_test_exemption(&db, passenger.id, student.fare_type.id, today).await?;
        let old = create_test_exemption(
            &db,
            passenger.id,
            senior.fare_type.id,
            today - Days::new(400),
        )
        .await?;

        let all = exemptions_for_passenger(&db, passenger.id, today).await?;
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].exemption.id, current.id);
        assert!(all[0].is_active);
        assert_eq!(all[0].fare_type_name, "Student");
        assert_eq!(all[0].discount_rate, 50.0);
        assert_eq!(all[1].exemption.id, old.id);
        assert!(!all[1].is_active);

        let active = active_exemptions(&db, passenger.id, today).await?;
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].exemption.id, current.id);

        // last valid day is inclusive
        let last_day = current.valid_to;
        assert_eq!(active_exemptions(&db, passenger.id, last_day).await?.len(), 1);
        assert!(active_exemptions(&db, passenger.id, last_day + Days::new(1)).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_require_usable_exemption() -> Result<()> {
        let db = setup_test_db().await?;
        let ada = create_test_passenger(&db, "Ada Lovelace", "ada@example.com").await?;
        let grace = create_test_passenger(&db, "Grace Hopper", "grace@example.com").await?;
        let fare = create_test_fare_type(&db, "Student", 2.0, 50.0).await?;
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let granted = create_test_exemption(&db, ada.id, fare.fare_type.id, today).await?;

        let view = require_usable_exemption(&db, ada.id, granted.id, today).await?;
        assert_eq!(view.exemption.id, granted.id);

        assert!(matches!(
            require_usable_exemption(&db, grace.id, granted.id, today).await,
            Err(Error::Validation { .. })
        ));
        assert!(matches!(
            require_usable_exemption(&db, ada.id, 999, today).await,
            Err(Error::Validation { .. })
        ));
        let later = today + Days::new(366);
        assert!(matches!(
            require_usable_exemption(&db, ada.id, granted.id, later).await,
            Err(Error::Validation { ref message }) if message.contains("expired")
        ));
        Ok(())
    }
}
