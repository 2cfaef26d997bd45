//! Ticket entity - an issued fare.
//!
//! Every ticket has exactly one fare calculation and one payment confirmation,
//! written in the same transaction as the ticket itself.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Ticket database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ticket")]
pub struct Model {
    /// Unique identifier for the ticket
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Day the ticket was issued
    pub purchase_date: Date,
    /// Price paid (the final fare)
    pub price: f64,
    /// Buyer
    pub passenger_id: i64,
    /// Fare type sold
    pub fare_type_id: i64,
}

/// Defines relationships between `Ticket` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Buyer
    #[sea_orm(
        belongs_to = "super::passenger::Entity",
        from = "Column::PassengerId",
        to = "super::passenger::Column::Id"
    )]
    Passenger,
    /// Fare type sold
    #[sea_orm(
        belongs_to = "super::fare_type::Entity",
        from = "Column::FareTypeId",
        to = "super::fare_type::Column::Id"
    )]
    FareType,
    /// Stored fare breakdown
    #[sea_orm(has_one = "super::fare_calculation::Entity")]
    FareCalculation,
    /// Payment confirmation
    #[sea_orm(has_one = "super::payment_confirmation::Entity")]
    PaymentConfirmation,
}

impl Related<super::passenger::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Passenger.def()
    }
}

impl Related<super::fare_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FareType.def()
    }
}

impl Related<super::fare_calculation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FareCalculation.def()
    }
}

impl Related<super::payment_confirmation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PaymentConfirmation.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
