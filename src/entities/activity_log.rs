//! Activity log entity - append-only audit trail of mutations.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Activity log database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "activity_log")]
pub struct Model {
    /// Unique identifier for the entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Machine-readable kind, e.g. `"fare_type_creation"`
    pub activity_type: String,
    /// Human-readable summary
    pub description: String,
    /// Id of the row the activity concerns, if any
    pub entity_id: Option<i64>,
    /// Table name of the row the activity concerns, if any
    pub entity_type: Option<String>,
    /// When the activity happened
    pub created_at: DateTimeUtc,
}

/// The activity log has no relationships; entity references are informational
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
