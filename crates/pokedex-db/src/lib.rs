//! # pokedex-db: Database Layer for the Pokédex
//!
//! This crate provides store access for the catalog service. Production runs
//! against MySQL; local development and tests run against a SQLite file.
//! Both go through sqlx's `Any` driver.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Pokédex Data Flow                                │
//! │                                                                         │
//! │  HTTP handler (search_pokemons)                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   pokedex-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │  Repository   │    │   Executor    │    │  Connection  │  │   │
//! │  │   │ (pokemon.rs)  │───►│ (executor.rs) │───►│(connection.rs│  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SQL templates │    │ bind, run,    │    │ acquire /    │  │   │
//! │  │   │ typed records │    │ commit, rows  │    │ release      │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │            MySQL (production)  /  SQLite file (local)           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`connection`] - Configuration, connectors and the `Database` handle
//! - [`executor`] - Single-statement execution with guaranteed release
//! - [`repository`] - Pokemon repository
//! - [`schema`] - Embedded table definitions
//! - [`error`] - Database error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pokedex_db::{Database, DbConfig};
//!
//! let db = Database::mysql(&DbConfig::default())?;
//!
//! let results = db.pokemons().search("char").await?;
//! let stats = db.pokemons().get_stats().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod connection;
pub mod error;
pub mod executor;
pub mod repository;
pub mod schema;

#[cfg(test)]
pub(crate) mod test_support;

// =============================================================================
// Re-exports
// =============================================================================

pub use connection::{Connector, Database, DbConfig, MySqlConnector, SqliteConnector};
pub use error::{DbError, DbResult};
pub use executor::{Param, QueryExecutor, Record};

// Repository re-exports for convenience
pub use repository::pokemon::PokemonRepository;
