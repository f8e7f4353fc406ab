//! # Connection Management
//!
//! One physical connection per operation, opened from static configuration.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Connection Lifecycle                               │
//! │                                                                         │
//! │  Process startup                                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbConfig { host, port, user, password, database } ← resolved once     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  MySqlConnector::new(&config) ← immutable for the process lifetime     │
//! │       │                                                                 │
//! │       │  per operation:                                                 │
//! │       ▼                                                                 │
//! │  acquire() ──► AnyConnection ──► one statement ──► release(conn)       │
//! │       │                                                                 │
//! │       └── failure classified: Unreachable / Unauthorized / Store       │
//! │                                                                         │
//! │  No pool, no reuse, no retry. Callers decide retry policy.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why `AnyConnection`?
//! The executor and repository are written once against sqlx's `Any` driver.
//! Production connects to MySQL; local development and tests connect to a
//! SQLite file through the same code path.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::any::AnyConnectOptions;
use sqlx::mysql::MySqlConnectOptions;
use sqlx::{AnyConnection, ConnectOptions, Connection};
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::executor::QueryExecutor;
use crate::repository::pokemon::PokemonRepository;

// =============================================================================
// Configuration
// =============================================================================

/// Database configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("localhost", "root", "secret", "pokemons_db")
///     .port(3306)
///     .connect_timeout(Duration::from_secs(5));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct DbConfig {
    /// Server hostname or address.
    pub host: String,

    /// Server port.
    /// Default: 3306
    pub port: u16,

    /// Login user.
    pub user: String,

    /// Login password. Never logged.
    pub password: String,

    /// Database (schema) name.
    pub database: String,

    /// How long a single connect attempt may take.
    /// Default: 10 seconds
    pub connect_timeout: Duration,
}

impl DbConfig {
    /// Creates a configuration with the default port and timeout.
    pub fn new(
        host: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        DbConfig {
            host: host.into(),
            port: 3306,
            user: user.into(),
            password: password.into(),
            database: database.into(),
            connect_timeout: Duration::from_secs(10),
        }
    }

    /// Sets the server port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        DbConfig::new("localhost", "root", "", "pokemons_db")
    }
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

// =============================================================================
// Connector
// =============================================================================

/// Source of per-operation connections.
///
/// ## Contract
/// - `acquire` opens a fresh connection; ownership passes to the caller.
/// - `release` takes the connection back by value, so it can run at most
///   once per acquired connection.
/// - Failures are already classified when they leave `acquire`.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Opens a new connection.
    async fn acquire(&self) -> DbResult<AnyConnection>;

    /// Closes a connection obtained from [`Connector::acquire`].
    async fn release(&self, conn: AnyConnection) {
        close_quietly(conn).await;
    }
}

/// Closes a connection, logging instead of failing if the close handshake
/// does not complete. The socket is dropped either way.
pub async fn close_quietly(conn: AnyConnection) {
    if let Err(e) = conn.close().await {
        warn!(error = %e, "Connection close handshake failed");
    }
}

async fn connect(options: &AnyConnectOptions, timeout: Duration) -> DbResult<AnyConnection> {
    match tokio::time::timeout(timeout, AnyConnection::connect_with(options)).await {
        Ok(result) => result.map_err(DbError::from_connect),
        Err(_) => Err(DbError::Unreachable {
            source: sqlx::Error::Io(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("connect timed out after {:?}", timeout),
            )),
        }),
    }
}

// =============================================================================
// MySQL
// =============================================================================

/// Production connector for a MySQL server.
pub struct MySqlConnector {
    options: AnyConnectOptions,
    connect_timeout: Duration,
}

impl MySqlConnector {
    /// Builds the connector from static configuration.
    ///
    /// No connection is opened here; the first one is opened by `acquire`.
    pub fn new(config: &DbConfig) -> DbResult<Self> {
        sqlx::any::install_default_drivers();

        let mysql = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.database);

        let options =
            AnyConnectOptions::from_url(&mysql.to_url_lossy()).map_err(DbError::from_connect)?;

        info!(
            host = %config.host,
            port = config.port,
            database = %config.database,
            "MySQL connector configured"
        );

        Ok(MySqlConnector {
            options,
            connect_timeout: config.connect_timeout,
        })
    }
}

#[async_trait]
impl Connector for MySqlConnector {
    async fn acquire(&self) -> DbResult<AnyConnection> {
        debug!("Opening MySQL connection");
        connect(&self.options, self.connect_timeout).await
    }
}

// =============================================================================
// SQLite
// =============================================================================

/// File-backed SQLite connector for local development and tests.
///
/// The file is created on first connect if it does not exist. An in-memory
/// database would not work here: every operation opens its own connection.
pub struct SqliteConnector {
    path: PathBuf,
    options: AnyConnectOptions,
}

impl SqliteConnector {
    /// Creates a connector for the database file at `path`.
    pub fn new(path: impl AsRef<Path>) -> DbResult<Self> {
        sqlx::any::install_default_drivers();

        let path = path.as_ref().to_path_buf();
        let url = format!("sqlite://{}?mode=rwc", path.display());
        let options = AnyConnectOptions::from_str(&url).map_err(DbError::from_connect)?;

        Ok(SqliteConnector { path, options })
    }

    /// Path of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Connector for SqliteConnector {
    async fn acquire(&self) -> DbResult<AnyConnection> {
        debug!(path = %self.path.display(), "Opening SQLite connection");
        AnyConnection::connect_with(&self.options)
            .await
            .map_err(DbError::from_connect)
    }
}

// =============================================================================
// Database
// =============================================================================

/// Main database handle providing repository access.
///
/// Holds only the immutable connector; cloning is cheap and every clone
/// shares the same configuration.
///
/// ## Usage
/// ```rust,ignore
/// let db = Database::mysql(&DbConfig::default())?;
/// let pokemons = db.pokemons().list_all().await?;
/// ```
#[derive(Clone)]
pub struct Database {
    connector: Arc<dyn Connector>,
}

impl Database {
    /// Wraps any connector.
    pub fn new(connector: impl Connector + 'static) -> Self {
        Database {
            connector: Arc::new(connector),
        }
    }

    /// Creates a handle backed by a MySQL server.
    pub fn mysql(config: &DbConfig) -> DbResult<Self> {
        Ok(Database::new(MySqlConnector::new(config)?))
    }

    /// Creates a handle backed by a SQLite file.
    pub fn sqlite(path: impl AsRef<Path>) -> DbResult<Self> {
        Ok(Database::new(SqliteConnector::new(path)?))
    }

    /// Returns a query executor over this handle's connector.
    pub fn executor(&self) -> QueryExecutor {
        QueryExecutor::new(self.connector.clone())
    }

    /// Returns the Pokemon repository.
    pub fn pokemons(&self) -> PokemonRepository {
        PokemonRepository::new(self.executor())
    }

    /// Runs a schema script (see [`crate::schema`]).
    pub async fn apply_schema(&self, script: &str) -> DbResult<()> {
        crate::schema::apply(self.connector.as_ref(), script).await
    }

    /// Checks if the store is reachable and answers queries.
    pub async fn health_check(&self) -> bool {
        self.executor().execute_read("SELECT 1 AS ok", &[]).await.is_ok()
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
