//! # Database Error Types
//!
//! Classified store failures.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  Driver error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← classified at connect or at execute           │
//! │       │                                                                 │
//! │       ├── Unreachable     network / server down / cannot open          │
//! │       ├── Unauthorized    credentials rejected                         │
//! │       ├── WriteRejected   constraint violation, rolled back            │
//! │       ├── Store           anything else the store reported             │
//! │       └── Decode          row value with an unexpected shape           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ApiError (apps/api) ← decides the caller-visible outcome              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Absence of a row is never an error at this layer: single lookups return
//! `Option::None` and listings return an empty `Vec`.

use sqlx::error::{DatabaseError, ErrorKind};
use thiserror::Error;

/// MySQL `ER_ACCESS_DENIED_ERROR`.
const MYSQL_ACCESS_DENIED: u16 = 1045;

/// SQLSTATE class for invalid authorization.
const SQLSTATE_INVALID_AUTHORIZATION: &str = "28000";

/// MySQL duplicate key, FK child/parent missing, column cannot be null.
const MYSQL_CONSTRAINT_ERRORS: [u16; 4] = [1062, 1451, 1452, 1048];

/// SQLite primary result code `SQLITE_CANTOPEN`.
const SQLITE_CANTOPEN: i32 = 14;

/// SQLite primary result code `SQLITE_CONSTRAINT`.
const SQLITE_CONSTRAINT: i32 = 19;

/// Database operation errors.
///
/// Every variant except `Decode` carries the driver error as its source so
/// it can be logged in full by the layer that decides the outcome.
#[derive(Debug, Error)]
pub enum DbError {
    /// The store could not be reached.
    ///
    /// ## When This Occurs
    /// - Server down or refusing connections
    /// - Network or TLS failure mid-statement
    /// - Database file cannot be opened
    #[error("Database unreachable: {source}")]
    Unreachable {
        #[source]
        source: sqlx::Error,
    },

    /// The store rejected the configured credentials.
    ///
    /// The message never includes the password; the driver's own message
    /// only names the user.
    #[error("Database rejected credentials: {source}")]
    Unauthorized {
        #[source]
        source: sqlx::Error,
    },

    /// A write did not apply and was rolled back.
    ///
    /// ## When This Occurs
    /// - Duplicate primary key on insert
    /// - NOT NULL / CHECK / FOREIGN KEY violation
    #[error("Write rejected: {message}")]
    WriteRejected {
        message: String,
        #[source]
        source: sqlx::Error,
    },

    /// Any other store-reported failure.
    #[error("Query failed: {source}")]
    Store {
        #[source]
        source: sqlx::Error,
    },

    /// A returned value could not be mapped onto the expected record.
    #[error("Cannot decode {what}: {reason}")]
    Decode { what: String, reason: String },
}

impl DbError {
    /// Classifies a failure raised while opening a connection.
    ///
    /// ## Error Mapping
    /// ```text
    /// Io / Tls / PoolTimedOut / PoolClosed  → Unreachable
    /// MySQL 1045 or SQLSTATE 28000          → Unauthorized
    /// SQLite CANTOPEN                       → Unreachable
    /// Other                                 → Store
    /// ```
    pub fn from_connect(err: sqlx::Error) -> Self {
        if is_transport_failure(&err) {
            return DbError::Unreachable { source: err };
        }

        let (credentials, unopenable) = match &err {
            sqlx::Error::Database(db) => (is_credential_rejection(&**db), is_unopenable(&**db)),
            _ => (false, false),
        };

        if credentials {
            DbError::Unauthorized { source: err }
        } else if unopenable {
            DbError::Unreachable { source: err }
        } else {
            DbError::Store { source: err }
        }
    }

    /// Classifies a failure raised while running a statement, or while
    /// beginning / committing / rolling back its transaction.
    ///
    /// ## Error Mapping
    /// ```text
    /// Io / Tls / PoolTimedOut / PoolClosed  → Unreachable
    /// Unique / FK / NOT NULL / CHECK        → WriteRejected
    /// Other                                 → Store
    /// ```
    pub fn from_query(err: sqlx::Error) -> Self {
        if is_transport_failure(&err) {
            return DbError::Unreachable { source: err };
        }

        let rejected = match &err {
            sqlx::Error::Database(db) => match db.kind() {
                ErrorKind::UniqueViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation => Some(db.message().to_string()),
                _ if is_constraint_code(&**db) => Some(db.message().to_string()),
                _ => None,
            },
            _ => None,
        };

        match rejected {
            Some(message) => DbError::WriteRejected {
                message,
                source: err,
            },
            None => DbError::Store { source: err },
        }
    }

    /// Creates a Decode error.
    pub fn decode(what: impl Into<String>, reason: impl ToString) -> Self {
        DbError::Decode {
            what: what.into(),
            reason: reason.to_string(),
        }
    }
}

fn is_transport_failure(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
    )
}

fn is_credential_rejection(db: &dyn DatabaseError) -> bool {
    if let Some(mysql) = db.try_downcast_ref::<sqlx::mysql::MySqlDatabaseError>() {
        return mysql.number() == MYSQL_ACCESS_DENIED;
    }

    db.code().as_deref() == Some(SQLSTATE_INVALID_AUTHORIZATION)
}

fn is_unopenable(db: &dyn DatabaseError) -> bool {
    sqlite_primary_code(db) == Some(SQLITE_CANTOPEN)
}

fn is_constraint_code(db: &dyn DatabaseError) -> bool {
    if let Some(mysql) = db.try_downcast_ref::<sqlx::mysql::MySqlDatabaseError>() {
        return MYSQL_CONSTRAINT_ERRORS.contains(&mysql.number());
    }

    sqlite_primary_code(db) == Some(SQLITE_CONSTRAINT)
}

fn sqlite_primary_code(db: &dyn DatabaseError) -> Option<i32> {
    db.try_downcast_ref::<sqlx::sqlite::SqliteError>()?;

    // extended result codes keep the primary code in the low byte
    db.code()
        .and_then(|code| code.parse::<i32>().ok())
        .map(|code| code & 0xff)
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Unit Tests
// =============================================================================
