//! Payment confirmation entity - proof of payment for a ticket.
//!
//! `transaction_ref` has the shape `TXN<YYYYMMDD>-<ticket id>`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Payment confirmation database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payment_confirmation")]
pub struct Model {
    /// Unique identifier for the confirmation
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Ticket paid for, one confirmation per ticket
    #[sea_orm(unique)]
    pub ticket_id: i64,
    /// Always `"Confirmed"` for tickets issued by the desk
    pub status: String,
    /// Payment method chosen at the desk
    pub payment_method: String,
    /// `TXN<YYYYMMDD>-<ticket id>`
    #[sea_orm(unique)]
    pub transaction_ref: String,
}

/// Defines relationships between `PaymentConfirmation` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each confirmation belongs to one ticket
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
