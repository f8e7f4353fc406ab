//! # Domain Types
//!
//! Core domain types used throughout the Pokédex.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Pokemon      │   │   NewPokemon    │   │  PokemonStats   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (caller)    │   │  id             │   │  count          │       │
//! │  │  name, types    │   │  name, types    │   │  avg_* (2 dp)   │       │
//! │  │  6 stats        │   │  6 stats        │   │  min/max hp     │       │
//! │  │  created_at     │   │  (no stamps)    │   │  min/max attack │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │        read model          create input         aggregate result       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! `id` is supplied by the caller at creation and is immutable afterwards.
//! Uniqueness is enforced by the store, not here.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// =============================================================================
// Pokemon
// =============================================================================

/// A catalog entry as stored: identity, tags and the six-stat block.
///
/// Field order matches the repository's SELECT projection so serialized
/// records read the same way the store returns them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pokemon {
    pub id: i64,
    pub name: String,
    /// Free-text type tags, e.g. `"Grass, Poison"`.
    pub types: String,
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub sp_attack: u32,
    pub sp_defense: u32,
    pub speed: u32,

    /// Assigned by the store on insert.
    #[serde(default, with = "store_timestamp")]
    pub created_at: Option<NaiveDateTime>,

    /// Assigned by the store on insert and update.
    #[serde(default, with = "store_timestamp")]
    pub updated_at: Option<NaiveDateTime>,
}

// =============================================================================
// NewPokemon
// =============================================================================

/// Input for creating a catalog entry.
///
/// Timestamps are absent on purpose: the store assigns them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPokemon {
    pub id: i64,
    pub name: String,
    pub types: String,
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub sp_attack: u32,
    pub sp_defense: u32,
    pub speed: u32,
}

impl From<&Pokemon> for NewPokemon {
    fn from(p: &Pokemon) -> Self {
        NewPokemon {
            id: p.id,
            name: p.name.clone(),
            types: p.types.clone(),
            hp: p.hp,
            attack: p.attack,
            defense: p.defense,
            sp_attack: p.sp_attack,
            sp_defense: p.sp_defense,
            speed: p.speed,
        }
    }
}

// =============================================================================
// PokemonStats
// =============================================================================

/// Catalog-wide aggregate statistics.
///
/// ## Empty Catalog
/// An aggregate over an empty table is still a well-formed value:
/// [`PokemonStats::empty`] with every field at zero, never an absent result.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PokemonStats {
    pub count: i64,
    pub avg_hp: f64,
    pub avg_attack: f64,
    pub avg_defense: f64,
    pub avg_sp_attack: f64,
    pub avg_sp_defense: f64,
    pub avg_speed: f64,
    pub max_hp: i64,
    pub max_attack: i64,
    pub min_hp: i64,
    pub min_attack: i64,
}

impl PokemonStats {
    /// Zeroed statistics for an empty catalog.
    pub fn empty() -> Self {
        PokemonStats::default()
    }

    /// True when the statistics describe no records.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

// =============================================================================
// Timestamp (de)serialization
// =============================================================================

/// Store timestamps arrive as text (`2024-05-01 12:30:00`, optionally with
/// fractional seconds); API payloads use the ISO `T` separator. Both parse.
pub mod store_timestamp {
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

    /// Parses a store or ISO-8601 timestamp without timezone.
    pub fn parse(raw: &str) -> Result<NaiveDateTime, chrono::ParseError> {
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
    }

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|s| parse(&s).map_err(de::Error::custom)).transpose()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
