//! Exemption entity - a time-bounded discount grant.
//!
//! Created only by approving an application and never updated. Whether it is
//! still valid is decided at query time by comparing `valid_to` with today.

use super::sea_orm_active_enums::ExemptionCategory;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Exemption database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "exemption")]
pub struct Model {
    /// Unique identifier for the exemption
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Category granted at approval
    pub category: ExemptionCategory,
    /// Holder of the exemption
    pub passenger_id: i64,
    /// Fare type whose tariff discount applies
    pub fare_type_id: i64,
    /// First valid day (approval date)
    pub valid_from: Date,
    /// Last valid day, 365 days after `valid_from`
    pub valid_to: Date,
    /// Application that produced this exemption
    pub application_id: Option<i64>,
}

impl Model {
    /// True when `day` falls inside the validity window (both ends inclusive).
    #[must_use]
    pub fn is_valid_on(&self, day: Date) -> bool {
        self.valid_from <= day && day <= self.valid_to
    }
}

/// Defines relationships between `Exemption` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Holder
    #[sea_orm(
        belongs_to = "super::passenger::Entity",
        from = "Column::PassengerId",
        to = "super::passenger::Column::Id"
    )]
    Passenger,
    /// Fare type whose tariff gives the discount
    #[sea_orm(
        belongs_to = "super::fare_type::Entity",
        from = "Column::FareTypeId",
        to = "super::fare_type::Column::Id"
    )]
    FareType,
    /// Application the exemption was granted from
    #[sea_orm(
        belongs_to = "super::exemption_application::Entity",
        from = "Column::ApplicationId",
        to = "super::exemption_application::Column::Id",
        on_delete = "SetNull"
    )]
    Application,
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

impl ActiveModelBehavior for ActiveModel {}
