//! Persistence gateway for hand-written statements.
//!
//! Entity CRUD goes through `SeaORM` directly; aggregate reads and
//! conditional updates that do not map onto an entity go through here.
//! Reads return a possibly empty `Vec`, so "no rows" and "query failed"
//! are different outcomes. Every statement is traced with its timing.

use crate::errors::Result;
use sea_orm::{ConnectionTrait, FromQueryResult, Statement, Value};
use std::time::Instant;
use tracing::{debug, warn};

/// Result of a write statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOutcome {
    /// Rows changed by the statement
    pub affected_rows: u64,
    /// Id generated by an INSERT, 0 when the statement generated none
    pub last_insert_id: u64,
}

/// Builds a statement for the connection's backend.
///
/// Placeholders are `?`, which both `SQLite` and `MySQL` accept.
pub fn statement<C, I>(conn: &C, sql: &str, values: I) -> Statement
where
    C: ConnectionTrait,
    I: IntoIterator<Item = Value>,
{
    Statement::from_sql_and_values(conn.get_database_backend(), sql, values)
}

/// Runs a read statement and maps every row onto `T`.
pub async fn fetch_all<T, C>(conn: &C, statement: Statement) -> Result<Vec<T>>
where
    T: FromQueryResult,
    C: ConnectionTrait,
{
    let started = Instant::now();
    let sql = statement.sql.clone();
    let params = param_count(&statement);

    match T::find_by_statement(statement).all(conn).await {
        Ok(rows) => {
            debug!(
                sql = %sql,
                params,
                rows = rows.len(),
                elapsed_us = elapsed_us(started),
                "read statement"
            );
            Ok(rows)
        }
        Err(e) => {
            warn!(sql = %sql, params, error = %e, "read statement failed");
            Err(e.into())
        }
    }
}

/// Runs a read statement expected to produce at most one row.
pub async fn fetch_one<T, C>(conn: &C, statement: Statement) -> Result<Option<T>>
where
    T: FromQueryResult,
    C: ConnectionTrait,
{
    Ok(fetch_all(conn, statement).await?.into_iter().next())
}

/// Runs a write statement.
pub async fn execute<C>(conn: &C, statement: Statement) -> Result<WriteOutcome>
where
    C: ConnectionTrait,
{
    let started = Instant::now();
    let sql = statement.sql.clone();
    let params = param_count(&statement);

    match conn.execute(statement).await {
        Ok(result) => {
            let outcome = WriteOutcome {
                affected_rows: result.rows_affected(),
                last_insert_id: result.last_insert_id(),
            };
            debug!(
                sql = %sql,
                params,
                affected_rows = outcome.affected_rows,
                elapsed_us = elapsed_us(started),
                "write statement"
            );
            Ok(outcome)
        }
        Err(e) => {
            warn!(sql = %sql, params, error = %e, "write statement failed");
            Err(e.into())
        }
    }
}

fn param_count(statement: &Statement) -> usize {
    statement.values.as_ref().map_or(0, |v| v.0.len())
}

fn elapsed_us(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_passenger, setup_test_db};

    #[derive(Debug, FromQueryResult)]
    struct NameRow {
        full_name: String,
    }

    #[tokio::test]
    async fn test_fetch_all_distinguishes_empty_from_failure() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_passenger(&db, "Ada Lovelace", "ada@example.com").await?;

        let rows: Vec<NameRow> = fetch_all(
            &db,
            statement(
                &db,
                "SELECT full_name FROM passenger WHERE email = ?",
                ["ada@example.com".into()],
            ),
        )
        .await?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].full_name, "Ada Lovelace");

        let none: Vec<NameRow> = fetch_all(
            &db,
            statement(
                &db,
                "SELECT full_name FROM passenger WHERE email = ?",
                ["nobody@example.com".into()],
            ),
        )
        .await?;
        assert!(none.is_empty());

        let failed: Result<Vec<NameRow>> =
            fetch_all(&db, statement(&db, "SELECT full_name FROM no_such_table", [])).await;
        assert!(failed.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_execute_reports_affected_rows() -> Result<()> {
        let db = setup_test_db().await?;
        let passenger = create_test_passenger(&db, "Grace Hopper", "grace@example.com").await?;

        let outcome = execute(
            &db,
            statement(
                &db,
                "UPDATE passenger SET full_name = ? WHERE id = ?",
                ["Rear Admiral Hopper".into(), passenger.id.into()],
            ),
        )
        .await?;
        assert_eq!(outcome.affected_rows, 1);

        let missed = execute(
            &db,
            statement(
                &db,
                "UPDATE passenger SET full_name = ? WHERE id = ?",
                ["Nobody".into(), 9_999_i64.into()],
            ),
        )
        .await?;
        assert_eq!(missed.affected_rows, 0);

        let row: Option<NameRow> = fetch_one(
            &db,
            statement(&db, "SELECT full_name FROM passenger WHERE id = ?", [passenger.id.into()]),
        )
        .await?;
        assert_eq!(row.map(|r| r.full_name).as_deref(), Some("Rear Admiral Hopper"));
        Ok(())
    }
}
