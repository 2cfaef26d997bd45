//! Fare type entity - a named category of fare (e.g. "Adult", "Student").
//!
//! Each fare type owns exactly one [`super::tariff`] row holding its pricing.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Fare type database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "fare_type")]
pub struct Model {
    /// Unique identifier for the fare type
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name, unique across fare types
    #[sea_orm(unique)]
    pub name: String,
    /// Free-text description shown to staff
    pub description: String,
    /// Validity text (e.g. "Single journey", "30 days")
    pub validity: String,
}

/// Defines relationships between `FareType` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One fare type has one tariff
    #[sea_orm(has_one = "super::tariff::Entity")]
    Tariff,
    /// Tickets sold for this fare type
    #[sea_orm(has_many = "super::ticket::Entity")]
    Tickets,
    /// Exemptions granted on this fare type
    #[sea_orm(has_many = "super::exemption::Entity")]
    Exemptions,
}

impl Related<super::tariff::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tariff.def()
    }
}

impl Related<super::ticket::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tickets.def()
    }
}

impl Related<super::exemption::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Exemptions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
