//! Fare calculation entity - pricing snapshot taken when a ticket is issued.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Fare calculation database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "fare_calculation")]
pub struct Model {
    /// Unique identifier for the calculation
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Ticket the breakdown belongs to, one per ticket
    #[sea_orm(unique)]
    pub ticket_id: i64,
    /// Tariff price before discount
    pub base_fare: f64,
    /// Discount amount (not the rate)
    pub discount: f64,
    /// Price charged
    pub final_fare: f64,
}

/// Defines relationships between `FareCalculation` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each calculation belongs to one ticket
    #[sea_orm(
        belongs_to = "super::ticket::Entity",
        from = "Column::TicketId",
        to = "super::ticket::Column::Id",
        on_delete = "Cascade"
    )]
    Ticket,
}

impl Related<super::ticket::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ticket.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
