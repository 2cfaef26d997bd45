//! Passenger entity - a registered traveller.
//!
//! Email is unique; the UNIQUE index is what finally rejects a duplicate
//! registration racing past the pre-insert check.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Passenger database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "passenger")]
pub struct Model {
    /// Unique identifier for the passenger
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Full name as entered at registration
    pub full_name: String,
    /// Contact email, unique across passengers
    #[sea_orm(unique)]
    pub email: String,
}

/// Defines relationships between `Passenger` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Exemption applications submitted
    #[sea_orm(has_many = "super::exemption_application::Entity")]
    Applications,
    /// Exemptions held
    #[sea_orm(has_many = "super::exemption::Entity")]
    Exemptions,
    /// Tickets bought
    #[sea_orm(has_many = "super::ticket::Entity")]
    Tickets,
}

impl Related<super::exemption_application::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Applications.def()
    }
}

impl Related<super::exemption::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Exemptions.def()
    }
}

impl Related<super::ticket::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tickets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
