//! Database configuration module.
//!
//! This module handles the database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so UNIQUE columns and foreign keys
//! (including the tariff cascade) come straight from the entity attributes.

use crate::entities::{
    ActivityLog, DocumentRecord, Exemption, ExemptionApplication, FareCalculation, FareType,
    Passenger, PaymentConfirmation, Tariff, Ticket,
};
use crate::errors::Result;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema,
};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Establishes a connection pool for `database_url`.
///
/// For file-backed `SQLite` URLs the parent directory is created first.
#[instrument]
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    if let Some(parent) = sqlite_parent_dir(database_url) {
        tokio::fs::create_dir_all(&parent).await?;
    }

    let mut options = ConnectOptions::new(database_url.to_string());
    options.sqlx_logging(false);

    let db = Database::connect(options).await?;
    info!("Connected to {:?} database", db.get_database_backend());
    Ok(db)
}

/// Creates all tables that do not exist yet.
///
/// Referenced tables are created before the tables pointing at them.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    create_table(db, Passenger).await?;
    create_table(db, FareType).await?;
    create_table(db, Tariff).await?;
    create_table(db, ExemptionApplication).await?;
    create_table(db, DocumentRecord).await?;
    create_table(db, Exemption).await?;
    create_table(db, Ticket).await?;
    create_table(db, FareCalculation).await?;
    create_table(db, PaymentConfirmation).await?;
    create_table(db, ActivityLog).await?;
    info!("Database tables ensured");
    Ok(())
}

async fn create_table<E>(db: &DatabaseConnection, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    debug!("Ensuring table {}", entity.table_name());
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();

    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Directory holding the database file of a `sqlite://` URL, if it has one.
fn sqlite_parent_dir(database_url: &str) -> Option<&Path> {
    let rest = database_url.strip_prefix("sqlite://")?;
    let file = rest.split('?').next().unwrap_or(rest);
    if file.is_empty() || file.contains(":memory:") {
        return None;
    }
    Path::new(file).parent().filter(|p| !p.as_os_str().is_empty())
}
