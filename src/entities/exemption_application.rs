//! Exemption application entity - a passenger's request for a discount grant.
//!
//! `open_for_passenger` mirrors `passenger_id` while the application awaits a
//! decision and is cleared once it is approved or rejected. Its UNIQUE index
//! allows any number of NULLs, so it admits at most one open application per
//! passenger without a partial index.

use super::sea_orm_active_enums::{ApplicationStatus, ExemptionCategory};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Exemption application database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "exemption_application")]
pub struct Model {
    /// Unique identifier for the application
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Day the application was submitted
    pub submitted_date: Date,
    /// Applicant
    pub passenger_id: i64,
    /// Fare type the passenger asked the exemption for
    pub fare_type_id: i64,
    /// Requested exemption category
    pub category: ExemptionCategory,
    /// Current review status
    pub status: ApplicationStatus,
    /// Passenger id while open, NULL once decided
    #[sea_orm(unique)]
    pub open_for_passenger: Option<i64>,
}

/// Defines relationships between `ExemptionApplication` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Applicant
    #[sea_orm(
        belongs_to = "super::passenger::Entity",
        from = "Column::PassengerId",
        to = "super::passenger::Column::Id"
    )]
    Passenger,
    /// Requested fare type
    #[sea_orm(
        belongs_to = "super::fare_type::Entity",
        from = "Column::FareTypeId",
        to = "super::fare_type::Column::Id"
    )]
    FareType,
    /// Supporting documents
    #[sea_orm(has_many = "super::document_record::Entity")]
    Documents,
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

impl Related<super::document_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Documents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
