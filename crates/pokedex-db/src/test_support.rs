//! Fixtures shared by the unit tests in this crate.

use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::AnyConnection;
use tempfile::TempDir;

use crate::connection::{Connector, Database, SqliteConnector};
use crate::error::{DbError, DbResult};
use crate::executor::QueryExecutor;
use crate::schema::{self, SQLITE_SCHEMA};
use pokedex_core::NewPokemon;

/// Fresh file-backed store with the schema applied and no rows.
pub(crate) async fn sqlite_store() -> (TempDir, Database) {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::sqlite(dir.path().join("pokedex.db")).unwrap();
    db.apply_schema(SQLITE_SCHEMA).await.unwrap();
    (dir, db)
}

/// Store holding Bulbasaur (1, Grass) and Charmander (4, Fire).
pub(crate) async fn seeded_store() -> (TempDir, Database) {
    let (dir, db) = sqlite_store().await;
    let repo = db.pokemons();
    repo.create(&new_pokemon(1, "Bulbasaur", "Grass")).await.unwrap();
    repo.create(&new_pokemon(4, "Charmander", "Fire")).await.unwrap();
    (dir, db)
}

pub(crate) fn new_pokemon(id: i64, name: &str, types: &str) -> NewPokemon {
    NewPokemon {
        id,
        name: name.to_string(),
        types: types.to_string(),
        hp: 45,
        attack: 49,
        defense: 49,
        sp_attack: 65,
        sp_defense: 65,
        speed: 45,
    }
}

// =============================================================================
// Counting connector
// =============================================================================

/// Wraps a SQLite connector, counting acquisitions and releases.
pub(crate) struct CountingConnector {
    inner: SqliteConnector,
    acquired: AtomicUsize,
    released: AtomicUsize,
    fail_next: AtomicBool,
}

#[async_trait]
impl Connector for CountingConnector {
    async fn acquire(&self) -> DbResult<AnyConnection> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(DbError::from_connect(sqlx::Error::Io(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "injected connect failure",
            ))));
        }

        let conn = self.inner.acquire().await?;
        self.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(conn)
    }

    async fn release(&self, conn: AnyConnection) {
        self.released.fetch_add(1, Ordering::SeqCst);
        self.inner.release(conn).await;
    }
}

pub(crate) struct CountingStore {
    connector: Arc<CountingConnector>,
}

impl CountingStore {
    pub(crate) fn executor(&self) -> QueryExecutor {
        QueryExecutor::new(self.connector.clone())
    }

    pub(crate) fn acquired(&self) -> usize {
        self.connector.acquired.load(Ordering::SeqCst)
    }

    pub(crate) fn released(&self) -> usize {
        self.connector.released.load(Ordering::SeqCst)
    }

    pub(crate) fn fail_next_acquire(&self) {
        self.connector.fail_next.store(true, Ordering::SeqCst);
    }
}

/// Counting store with the schema applied. Counters start at zero.
pub(crate) async fn counting_store() -> (TempDir, CountingStore) {
    let dir = tempfile::tempdir().unwrap();
    let inner = SqliteConnector::new(dir.path().join("pokedex.db")).unwrap();
    schema::apply(&inner, SQLITE_SCHEMA).await.unwrap();

    let connector = Arc::new(CountingConnector {
        inner,
        acquired: AtomicUsize::new(0),
        released: AtomicUsize::new(0),
        fail_next: AtomicBool::new(false),
    });

    (dir, CountingStore { connector })
}
