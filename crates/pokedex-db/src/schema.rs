//! # Embedded Schema
//!
//! Table definitions shipped inside the binary.
//!
//! ## Where Each Script Runs
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Schema Ownership                                │
//! │                                                                         │
//! │  sql/mysql/schema.sql   ──► applied by deployment tooling              │
//! │                             the service never alters a MySQL store     │
//! │                                                                         │
//! │  sql/sqlite/schema.sql  ──► applied by the seed binary and tests       │
//! │                             to a fresh local file                      │
//! │                                                                         │
//! │  Both scripts only CREATE ... IF NOT EXISTS, so re-applying is a       │
//! │  no-op. There is no versioning and no upgrade path.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::info;

use crate::connection::Connector;
use crate::error::{DbError, DbResult};

/// Authoritative MySQL schema.
pub const MYSQL_SCHEMA: &str = include_str!("../../../sql/mysql/schema.sql");

/// SQLite schema for local development and tests.
pub const SQLITE_SCHEMA: &str = include_str!("../../../sql/sqlite/schema.sql");

/// Runs a schema script over one connection from `connector`.
///
/// The connection is released whether or not the script succeeds.
///
/// ## Example
/// ```rust,ignore
/// let db = Database::sqlite("pokedex.db")?;
/// db.apply_schema(SQLITE_SCHEMA).await?;
/// ```
pub async fn apply(connector: &dyn Connector, script: &str) -> DbResult<()> {
    let mut conn = connector.acquire().await?;
    let outcome = sqlx::raw_sql(script)
        .execute(&mut conn)
        .await
        .map(|_| ())
        .map_err(DbError::from_query);
    connector.release(conn).await;

    if outcome.is_ok() {
        info!("Schema applied");
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::SqliteConnector;

    #[tokio::test]
    async fn test_sqlite_schema_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let connector = SqliteConnector::new(dir.path().join("pokedex.db")).unwrap();

        apply(&connector, SQLITE_SCHEMA).await.unwrap();
        apply(&connector, SQLITE_SCHEMA).await.unwrap();
    }

    #[test]
    fn test_schemas_define_pokemon_table() {
        for script in [MYSQL_SCHEMA, SQLITE_SCHEMA] {
            assert!(script.contains("CREATE TABLE IF NOT EXISTS pokemon"));
        }
    }
}
