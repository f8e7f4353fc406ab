//! # Pokemon Repository
//!
//! Database operations for catalog entries.
//!
//! ## Key Operations
//! - Listing, lookup by id, case-insensitive lookup by name
//! - Case-insensitive substring search over name and types
//! - Single-row creation
//! - Catalog-wide aggregate statistics
//!
//! ## Query Templates
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    One operation = one round trip                       │
//! │                                                                         │
//! │  list_all     SELECT … ORDER BY id                                     │
//! │  get_by_id    SELECT … WHERE id = ?                                    │
//! │  get_by_name  SELECT … WHERE LOWER(name) = LOWER(?)                    │
//! │  search       SELECT … WHERE LOWER(name)  LIKE LOWER(?)                │
//! │                          OR LOWER(types) LIKE LOWER(?)  ORDER BY name  │
//! │  create       INSERT … VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)              │
//! │  get_stats    SELECT COUNT(*), ROUND(AVG(…), 2), MIN/MAX …             │
//! │  count        SELECT COUNT(*)                                          │
//! │                                                                         │
//! │  Statements are compile-time constants; only bound values vary.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Portability
//! Timestamps are projected as `CAST(… AS CHAR)` and averages as
//! `CAST(… AS DOUBLE)` so MySQL and SQLite both hand back types the `Any`
//! driver can decode.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::executor::{Param, QueryExecutor, Record};
use pokedex_core::{NewPokemon, Pokemon, PokemonStats};

/// Builds a SELECT over every record column followed by `$tail`.
macro_rules! select_pokemon {
    ($tail:literal) => {
        concat!(
            "SELECT id, name, types, hp, attack, defense, sp_attack, sp_defense, speed, ",
            "CAST(created_at AS CHAR) AS created_at, ",
            "CAST(updated_at AS CHAR) AS updated_at ",
            "FROM pokemon ",
            $tail
        )
    };
}

const LIST_ALL: &str = select_pokemon!("ORDER BY id");

const GET_BY_ID: &str = select_pokemon!("WHERE id = ?");

const GET_BY_NAME: &str = select_pokemon!("WHERE LOWER(name) = LOWER(?)");

const SEARCH: &str = select_pokemon!(
    "WHERE LOWER(name) LIKE LOWER(?) OR LOWER(types) LIKE LOWER(?) ORDER BY name"
);

const INSERT: &str = "INSERT INTO pokemon \
    (id, name, types, hp, attack, defense, sp_attack, sp_defense, speed) \
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)";

const STATS: &str = "SELECT \
    COUNT(*) AS count, \
    CAST(ROUND(AVG(hp), 2) AS DOUBLE) AS avg_hp, \
    CAST(ROUND(AVG(attack), 2) AS DOUBLE) AS avg_attack, \
    CAST(ROUND(AVG(defense), 2) AS DOUBLE) AS avg_defense, \
    CAST(ROUND(AVG(sp_attack), 2) AS DOUBLE) AS avg_sp_attack, \
    CAST(ROUND(AVG(sp_defense), 2) AS DOUBLE) AS avg_sp_defense, \
    CAST(ROUND(AVG(speed), 2) AS DOUBLE) AS avg_speed, \
    MAX(hp) AS max_hp, \
    MAX(attack) AS max_attack, \
    MIN(hp) AS min_hp, \
    MIN(attack) AS min_attack \
    FROM pokemon";

const COUNT: &str = "SELECT COUNT(*) AS count FROM pokemon";

/// Repository for catalog database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.pokemons();
///
/// // Case-insensitive substring search
/// let results = repo.search("char").await?;
///
/// // Lookup by id: absence is Ok(None), not an error
/// let pokemon = repo.get_by_id(4).await?;
/// ```
#[derive(Clone)]
pub struct PokemonRepository {
    executor: QueryExecutor,
}

impl PokemonRepository {
    /// Creates a new PokemonRepository.
    pub fn new(executor: QueryExecutor) -> Self {
        PokemonRepository { executor }
    }

    /// Lists every record ordered by id.
    pub async fn list_all(&self) -> DbResult<Vec<Pokemon>> {
        let records = self.executor.execute_read(LIST_ALL, &[]).await?;
        decode_all(records)
    }

    /// Gets a record by its id.
    ///
    /// ## Returns
    /// * `Ok(Some(Pokemon))` - Record found
    /// * `Ok(None)` - No record with that id
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Pokemon>> {
        let records = self.executor.execute_read(GET_BY_ID, &[Param::Int(id)]).await?;
        decode_first(records)
    }

    /// Gets a record by name, ignoring case.
    ///
    /// ## Returns
    /// * `Ok(Some(Pokemon))` - Record found
    /// * `Ok(None)` - No record with that name
    pub async fn get_by_name(&self, name: &str) -> DbResult<Option<Pokemon>> {
        let records = self
            .executor
            .execute_read(GET_BY_NAME, &[Param::from(name)])
            .await?;
        decode_first(records)
    }

    /// Searches name and types for a substring, ignoring case.
    ///
    /// The term is used as given; callers trim it and reject blank terms
    /// before calling. Results are ordered by name.
    ///
    /// ## Example
    /// ```rust,ignore
    /// // Matches "Charmander" by name and every "Fire" type by tag
    /// let results = repo.search("fir").await?;
    /// ```
    pub async fn search(&self, term: &str) -> DbResult<Vec<Pokemon>> {
        debug!(term = %term, "Searching pokemon");

        let pattern = format!("%{}%", term);
        let records = self
            .executor
            .execute_read(SEARCH, &[Param::from(pattern.as_str()), Param::from(pattern)])
            .await?;

        let results = decode_all(records)?;
        debug!(count = results.len(), "Search returned pokemon");
        Ok(results)
    }

    /// Inserts a new record. Timestamps are left to the store.
    ///
    /// ## Returns
    /// * `Ok(true)` - Row inserted and committed
    /// * `Ok(false)` - Statement committed without inserting
    /// * `Err(DbError::WriteRejected)` - Duplicate id or constraint violation
    pub async fn create(&self, pokemon: &NewPokemon) -> DbResult<bool> {
        debug!(id = pokemon.id, name = %pokemon.name, "Inserting pokemon");

        let params = [
            Param::Int(pokemon.id),
            Param::from(pokemon.name.as_str()),
            Param::from(pokemon.types.as_str()),
            Param::from(pokemon.hp),
            Param::from(pokemon.attack),
            Param::from(pokemon.defense),
            Param::from(pokemon.sp_attack),
            Param::from(pokemon.sp_defense),
            Param::from(pokemon.speed),
        ];

        self.executor.execute_write(INSERT, &params).await
    }

    /// Computes catalog-wide statistics in one aggregate query.
    ///
    /// ## Empty Catalog
    /// An aggregate over an empty table returns a single row of NULL
    /// averages and a zero count. That case, and a store that returns no row
    /// at all, both yield [`PokemonStats::empty`].
    pub async fn get_stats(&self) -> DbResult<PokemonStats> {
        let records = self.executor.execute_read(STATS, &[]).await?;

        let Some(record) = records.into_iter().next() else {
            return Ok(PokemonStats::empty());
        };

        let raw: RawStats = serde_json::from_value(Value::Object(record))
            .map_err(|e| DbError::decode("statistics row", e))?;

        Ok(raw.into_stats())
    }

    /// Counts all records.
    pub async fn count(&self) -> DbResult<i64> {
        let records = self.executor.execute_read(COUNT, &[]).await?;

        match records.first().and_then(|r| r.get("count")) {
            None | Some(Value::Null) => Ok(0),
            Some(value) => value
                .as_i64()
                .ok_or_else(|| DbError::decode("count", format!("expected integer, got {}", value))),
        }
    }
}

// =============================================================================
// Decoding
// =============================================================================

fn decode(record: Record) -> DbResult<Pokemon> {
    serde_json::from_value(Value::Object(record)).map_err(|e| DbError::decode("pokemon record", e))
}

fn decode_all(records: Vec<Record>) -> DbResult<Vec<Pokemon>> {
    records.into_iter().map(decode).collect()
}

fn decode_first(records: Vec<Record>) -> DbResult<Option<Pokemon>> {
    records.into_iter().next().map(decode).transpose()
}

/// Statistics row exactly as the store returns it.
#[derive(Debug, Deserialize)]
struct RawStats {
    count: Option<i64>,
    avg_hp: Option<f64>,
    avg_attack: Option<f64>,
    avg_defense: Option<f64>,
    avg_sp_attack: Option<f64>,
    avg_sp_defense: Option<f64>,
    avg_speed: Option<f64>,
    max_hp: Option<i64>,
    max_attack: Option<i64>,
    min_hp: Option<i64>,
    min_attack: Option<i64>,
}

impl RawStats {
    fn into_stats(self) -> PokemonStats {
        let count = self.count.unwrap_or(0);
        if count == 0 {
            return PokemonStats::empty();
        }

        PokemonStats {
            count,
            avg_hp: self.avg_hp.unwrap_or(0.0),
            avg_attack: self.avg_attack.unwrap_or(0.0),
            avg_defense: self.avg_defense.unwrap_or(0.0),
            avg_sp_attack: self.avg_sp_attack.unwrap_or(0.0),
            avg_sp_defense: self.avg_sp_defense.unwrap_or(0.0),
            avg_speed: self.avg_speed.unwrap_or(0.0),
            max_hp: self.max_hp.unwrap_or(0),
            max_attack: self.max_attack.unwrap_or(0),
            min_hp: self.min_hp.unwrap_or(0),
            min_attack: self.min_attack.unwrap_or(0),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
