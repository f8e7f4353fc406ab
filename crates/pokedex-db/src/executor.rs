//! # Query Executor
//!
//! Runs one parameterized statement per call over a connection borrowed
//! from a [`Connector`].
//!
//! ## Scoped Acquisition
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    execute_read / execute_write                         │
//! │                                                                         │
//! │  acquire() ──✗──► return error (nothing to release)                    │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  ┌───────────────────────────────────────────┐                         │
//! │  │ run statement   (no early return in here) │                         │
//! │  │  read:  fetch_all → Vec<Record>           │                         │
//! │  │  write: BEGIN → execute → COMMIT          │                         │
//! │  │                      └─✗─► ROLLBACK       │                         │
//! │  └───────────────────────────────────────────┘                         │
//! │     │ outcome (Ok or Err) held, not returned                           │
//! │     ▼                                                                   │
//! │  release(conn)  ← every path, exactly once (conn moved in)             │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  return outcome                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Parameter Binding
//! Values are bound to `?` placeholders; statement text is never built from
//! caller input.

use std::sync::Arc;

use serde_json::{Map, Number, Value};
use sqlx::any::{Any, AnyArguments, AnyRow};
use sqlx::query::Query;
use sqlx::{AnyConnection, Column, Connection, Row};
use tracing::{debug, warn};

use crate::connection::Connector;
use crate::error::{DbError, DbResult};

/// One result row: column name → value, in projection order.
pub type Record = Map<String, Value>;

// =============================================================================
// Parameters
// =============================================================================

/// A positional statement parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Int(i64),
    Text(String),
}

impl From<i64> for Param {
    fn from(v: i64) -> Self {
        Param::Int(v)
    }
}

impl From<u32> for Param {
    fn from(v: u32) -> Self {
        Param::Int(i64::from(v))
    }
}

impl From<&str> for Param {
    fn from(v: &str) -> Self {
        Param::Text(v.to_string())
    }
}

impl From<String> for Param {
    fn from(v: String) -> Self {
        Param::Text(v)
    }
}

fn bind_params<'q>(
    mut query: Query<'q, Any, AnyArguments<'q>>,
    params: &[Param],
) -> Query<'q, Any, AnyArguments<'q>> {
    for param in params {
        query = match param {
            Param::Int(v) => query.bind(*v),
            Param::Text(v) => query.bind(v.clone()),
        };
    }
    query
}

// =============================================================================
// Executor
// =============================================================================

/// Executes single statements with guaranteed connection release.
///
/// Stateless apart from the shared connector handle; clones are cheap.
#[derive(Clone)]
pub struct QueryExecutor {
    connector: Arc<dyn Connector>,
}

impl QueryExecutor {
    /// Creates an executor over the given connector.
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        QueryExecutor { connector }
    }

    /// Runs a read statement and buffers every row.
    ///
    /// ## Returns
    /// * `Ok(vec![])` - No matching rows (not an error)
    /// * `Ok(records)` - Rows in store order, fields in projection order
    /// * `Err(DbError)` - Classified connect, execute or decode failure
    pub async fn execute_read(&self, stmt: &str, params: &[Param]) -> DbResult<Vec<Record>> {
        debug!(params = params.len(), "Executing read");

        let mut conn = self.connector.acquire().await?;
        let outcome = fetch_records(&mut conn, stmt, params).await;
        self.connector.release(conn).await;

        if let Ok(records) = &outcome {
            debug!(rows = records.len(), "Read complete");
        }
        outcome
    }

    /// Runs a write statement inside its own transaction.
    ///
    /// ## Guarantees
    /// The write is either committed or rolled back before this returns.
    ///
    /// ## Returns
    /// * `Ok(true)` - Committed and at least one row was affected
    /// * `Ok(false)` - Committed but no row was affected
    /// * `Err(DbError::WriteRejected)` - Constraint violation, rolled back
    /// * `Err(DbError)` - Other classified failure, rolled back
    pub async fn execute_write(&self, stmt: &str, params: &[Param]) -> DbResult<bool> {
        debug!(params = params.len(), "Executing write");

        let mut conn = self.connector.acquire().await?;
        let outcome = apply_in_transaction(&mut conn, stmt, params).await;
        self.connector.release(conn).await;

        match &outcome {
            Ok(applied) => debug!(applied = *applied, "Write committed"),
            Err(e) => debug!(error = %e, "Write rolled back"),
        }
        outcome
    }
}

async fn fetch_records(
    conn: &mut AnyConnection,
    stmt: &str,
    params: &[Param],
) -> DbResult<Vec<Record>> {
    let rows = bind_params(sqlx::query(stmt), params)
        .fetch_all(&mut *conn)
        .await
        .map_err(DbError::from_query)?;

    rows.iter().map(to_record).collect()
}

async fn apply_in_transaction(
    conn: &mut AnyConnection,
    stmt: &str,
    params: &[Param],
) -> DbResult<bool> {
    let mut tx = conn.begin().await.map_err(DbError::from_query)?;

    match bind_params(sqlx::query(stmt), params)
        .execute(&mut *tx)
        .await
    {
        Ok(result) => {
            tx.commit().await.map_err(DbError::from_query)?;
            Ok(result.rows_affected() > 0)
        }
        Err(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "Rollback failed");
            }
            Err(DbError::from_query(e))
        }
    }
}

// =============================================================================
// Row decoding
// =============================================================================

fn to_record(row: &AnyRow) -> DbResult<Record> {
    let mut record = Record::new();
    for (idx, column) in row.columns().iter().enumerate() {
        let value = decode_value(row, idx).ok_or_else(|| {
            DbError::decode(format!("column '{}'", column.name()), "unsupported type")
        })?;
        record.insert(column.name().to_string(), value);
    }
    Ok(record)
}

/// Integers first so INTEGER columns stay integral; REAL/DOUBLE next; text last.
fn decode_value(row: &AnyRow, idx: usize) -> Option<Value> {
    if let Ok(v) = row.try_get::<Option<i64>, _>(idx) {
        return Some(v.map_or(Value::Null, Value::from));
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(idx) {
        return Some(match v {
            Some(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
            None => Value::Null,
        });
    }
    if let Ok(v) = row.try_get::<Option<String>, _>(idx) {
        return Some(v.map_or(Value::Null, Value::String));
    }
    if let Ok(v) = row.try_get::<Option<bool>, _>(idx) {
        return Some(v.map_or(Value::Null, Value::Bool));
    }
    None
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{counting_store, sqlite_store};

    #[tokio::test]
    async fn test_read_preserves_projection_order() {
        let (_dir, db) = sqlite_store().await;
        let executor = db.executor();

        let records = executor
            .execute_read("SELECT 1 AS zeta, 'x' AS alpha, 2.5 AS mid", &[])
            .await
            .unwrap();

        let keys: Vec<&str> = records[0].keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
        assert_eq!(records[0]["zeta"], Value::from(1));
        assert_eq!(records[0]["alpha"], Value::from("x"));
        assert_eq!(records[0]["mid"], Value::from(2.5));
    }

    #[tokio::test]
    async fn test_empty_read_is_not_an_error() {
        let (_dir, db) = sqlite_store().await;

        let records = db
            .executor()
            .execute_read("SELECT id FROM pokemon WHERE id = ?", &[Param::Int(99)])
            .await
            .unwrap();

        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_parameters_are_bound_not_interpolated() {
        let (_dir, db) = sqlite_store().await;
        let executor = db.executor();

        let hostile = "x'); DROP TABLE pokemon; --";
        let records = executor
            .execute_read("SELECT ? AS echoed", &[Param::from(hostile)])
            .await
            .unwrap();
        assert_eq!(records[0]["echoed"], Value::from(hostile));

        let still_there = executor
            .execute_read("SELECT COUNT(*) AS n FROM pokemon", &[])
            .await
            .unwrap();
        assert_eq!(still_there[0]["n"], Value::from(0));
    }

    #[tokio::test]
    async fn test_release_once_after_successful_read() {
        let (_dir, store) = counting_store().await;

        store.executor().execute_read("SELECT 1 AS ok", &[]).await.unwrap();

        assert_eq!(store.acquired(), 1);
        assert_eq!(store.released(), 1);
    }

    #[tokio::test]
    async fn test_release_once_after_failing_read() {
        let (_dir, store) = counting_store().await;

        let err = store
            .executor()
            .execute_read("SELECT * FROM no_such_table", &[])
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Store { .. }), "{err:?}");
        assert_eq!(store.acquired(), 1);
        assert_eq!(store.released(), 1);
    }

    #[tokio::test]
    async fn test_release_once_after_failing_write() {
        let (_dir, store) = counting_store().await;
        let executor = store.executor();
        let insert = "INSERT INTO pokemon (id, name, types, hp, attack, defense, sp_attack, sp_defense, speed) \
                      VALUES (?, ?, ?, 1, 1, 1, 1, 1, 1)";

        assert!(executor
            .execute_write(insert, &[Param::Int(1), "Bulbasaur".into(), "Grass".into()])
            .await
            .unwrap());

        let err = executor
            .execute_write(insert, &[Param::Int(1), "Clone".into(), "Grass".into()])
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::WriteRejected { .. }), "{err:?}");
        assert_eq!(store.acquired(), 2);
        assert_eq!(store.released(), 2);

        let rows = executor
            .execute_read("SELECT name FROM pokemon", &[])
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], Value::from("Bulbasaur"));
    }

    #[tokio::test]
    async fn test_invalid_write_statement_releases() {
        let (_dir, store) = counting_store().await;

        let err = store
            .executor()
            .execute_write("UPDATE no_such_table SET x = 1", &[])
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Store { .. }), "{err:?}");
        assert_eq!(store.released(), store.acquired());
    }

    #[tokio::test]
    async fn test_failed_acquire_releases_nothing() {
        let (_dir, store) = counting_store().await;
        store.fail_next_acquire();

        let err = store
            .executor()
            .execute_read("SELECT 1 AS ok", &[])
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Unreachable { .. }));
        assert_eq!(store.acquired(), 0);
        assert_eq!(store.released(), 0);
    }

    #[tokio::test]
    async fn test_write_reports_no_rows_affected() {
        let (_dir, db) = sqlite_store().await;

        let applied = db
            .executor()
            .execute_write("UPDATE pokemon SET hp = 1 WHERE id = ?", &[Param::Int(42)])
            .await
            .unwrap();

        assert!(!applied);
    }
}
