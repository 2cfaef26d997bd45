//! Activity log - append-only audit trail written alongside mutations.
//!
//! Writers take any `ConnectionTrait` so the entry lands in the caller's
//! transaction and is rolled back with it.

use crate::{
    entities::{ActivityLog, activity_log},
    errors::Result,
};
use sea_orm::{QueryOrder, QuerySelect, Set, prelude::*};

/// Kinds of activity recorded by the desk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    /// A passenger registered
    PassengerRegistration,
    /// An exemption application was submitted
    ApplicationCreation,
    /// An application's documents were checked
    ApplicationValidation,
    /// An application was approved
    ApplicationApproval,
    /// An application was rejected
    ApplicationRejection,
    /// A fare type was created
    FareTypeCreation,
    /// A fare type was edited
    FareTypeUpdate,
    /// A fare type was deleted
    FareTypeDeletion,
    /// A ticket was issued
    TicketIssued,
}

impl ActivityKind {
    /// Value stored in `activity_log.activity_type`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PassengerRegistration => "passenger_registration",
            Self::ApplicationCreation => "application_creation",
            Self::ApplicationValidation => "application_validation",
            Self::ApplicationApproval => "application_approval",
            Self::ApplicationRejection => "application_rejection",
            Self::FareTypeCreation => "fare_type_creation",
            Self::FareTypeUpdate => "fare_type_update",
            Self::FareTypeDeletion => "fare_type_deletion",
            Self::TicketIssued => "ticket_issued",
        }
    }

    /// Table of the entity this kind of activity refers to.
    #[must_use]
    pub const fn entity_type(self) -> &'static str {
        match self {
            Self::PassengerRegistration => "passenger",
            Self::ApplicationCreation
            | Self::ApplicationValidation
            | Self::ApplicationApproval
            | Self::ApplicationRejection => "exemption_application",
            Self::FareTypeCreation | Self::FareTypeUpdate | Self::FareTypeDeletion => "fare_type",
            Self::TicketIssued => "ticket",
        }
    }
}

/// Appends an entry to the activity log.
pub async fn record<C>(
    db: &C,
    kind: ActivityKind,
    entity_id: i64,
    description: String,
) -> Result<activity_log::Model>
where
    C: ConnectionTrait,
{
    let entry = activity_log::ActiveModel {
        activity_type: Set(kind.as_str().to_string()),
        description: Set(description),
        entity_id: Set(Some(entity_id)),
        entity_type: Set(Some(kind.entity_type().to_string())),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    entry.insert(db).await.map_err(Into::into)
}

/// Most recent entries first.
pub async fn recent_activity<C>(db: &C, limit: u64) -> Result<Vec<activity_log::Model>>
where
    C: ConnectionTrait,
{
    ActivityLog::find()
        .order_by_desc(activity_log::Column::CreatedAt)
        .order_by_desc(activity_log::Column::Id)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

/// All entries about one entity, oldest first.
pub async fn activity_for_entity<C>(
    db: &C,
    kind_entity_type: &str,
    entity_id: i64,
) -> Result<Vec<activity_log::Model>>
where
    C: ConnectionTrait,
{
    ActivityLog::find()
        .filter(activity_log::Column::EntityType.eq(kind_entity_type))
        .filter(activity_log::Column::EntityId.eq(entity_id))
        .order_by_asc(activity_log::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
