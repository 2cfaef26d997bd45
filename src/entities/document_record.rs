//! Document record entity - a supporting document uploaded with an application.
//!
//! Only the path is stored; the bytes live in the uploads directory.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Document record database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "document_record")]
pub struct Model {
    /// Unique identifier for the document
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Application the document supports
    pub application_id: i64,
    /// Description entered by the passenger (e.g. "Student card")
    pub document_type: String,
    /// Path of the stored file, `<uploads>/<generated name>`
    pub document_path: String,
    /// MIME type accepted at upload
    pub content_type: String,
}

/// Defines relationships between `DocumentRecord` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each document belongs to one application
    #[sea_orm(
        belongs_to = "super::exemption_application::Entity",
        from = "Column::ApplicationId",
        to = "super::exemption_application::Column::Id",
        on_delete = "Cascade"
    )]
    Application,
}

impl Related<super::exemption_application::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Application.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
