//! Tariff entity - base price and discount rate of a fare type.
//!
//! `fare_type_id` is unique and cascades on delete, so a fare type always has
//! at most one tariff and never leaves an orphan behind.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Tariff database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tariff")]
pub struct Model {
    /// Unique identifier for the tariff
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Undiscounted ticket price
    pub base_price: f64,
    /// Discount in percent (0-100) granted to exemption holders of this fare type
    pub discount_rate: f64,
    /// Owning fare type
    #[sea_orm(unique)]
    pub fare_type_id: i64,
}

/// Defines relationships between `Tariff` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each tariff belongs to one fare type
    #[sea_orm(
        belongs_to = "super::fare_type::Entity",
        from = "Column::FareTypeId",
        to = "super::fare_type::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    FareType,
}

impl Related<super::fare_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FareType.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
