//! # Validation Module
//!
//! Input validation performed at the handler seam, before any repository
//! operation runs.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Deserialization (serde)                                      │
//! │  └── Types: ids are integers, stats are non-negative u32               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Handler seam (apps/api)                                      │
//! │  └── THIS MODULE: blank search terms, blank names/types                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database                                                     │
//! │  ├── NOT NULL constraints                                              │
//! │  └── PRIMARY KEY (duplicate id)                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::NewPokemon;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted name.
pub const MAX_NAME_LENGTH: usize = 100;

/// Longest accepted search term.
pub const MAX_SEARCH_LENGTH: usize = 100;

/// Longest accepted type list.
pub const MAX_TYPES_LENGTH: usize = 100;

/// Largest id the store's signed INT key holds.
pub const MAX_STORED_ID: i64 = i32::MAX as i64;

/// Largest stat value the store's signed INT columns hold.
pub const MAX_STORED_STAT: u32 = i32::MAX as u32;

// =============================================================================
// Search
// =============================================================================

/// Validates a search term.
///
/// ## Rules
/// - Trimmed before any check
/// - Must not be empty or whitespace-only
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed term, which is what gets searched and echoed back.
///
/// ## Example
/// ```rust
/// use pokedex_core::validation::validate_search_term;
///
/// assert_eq!(validate_search_term("  pika ").unwrap(), "pika");
/// assert!(validate_search_term("   ").is_err());
/// ```
pub fn validate_search_term(term: &str) -> ValidationResult<String> {
    let term = term.trim();

    if term.is_empty() {
        return Err(ValidationError::required("search query"));
    }

    if term.chars().count() > MAX_SEARCH_LENGTH {
        return Err(ValidationError::TooLong {
            field: "search query".to_string(),
            max: MAX_SEARCH_LENGTH,
        });
    }

    Ok(term.to_string())
}

// =============================================================================
// Creation
// =============================================================================

/// Validates a creation payload.
///
/// ## Rules
/// - `id` must be positive and fit the store's signed INT key
/// - `name` must be non-blank and at most 100 characters
/// - `types` must be non-blank and at most 100 characters
/// - each stat must fit the store's signed INT column
///
/// Stats are `u32`, so non-negativity is already guaranteed by the type.
pub fn validate_new_pokemon(pokemon: &NewPokemon) -> ValidationResult<()> {
    if !(1..=MAX_STORED_ID).contains(&pokemon.id) {
        return Err(ValidationError::OutOfRange {
            field: "id".to_string(),
            min: 1,
            max: MAX_STORED_ID,
        });
    }

    let name = pokemon.name.trim();
    if name.is_empty() {
        return Err(ValidationError::required("name"));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    let types = pokemon.types.trim();
    if types.is_empty() {
        return Err(ValidationError::required("types"));
    }
    if types.chars().count() > MAX_TYPES_LENGTH {
        return Err(ValidationError::TooLong {
            field: "types".to_string(),
            max: MAX_TYPES_LENGTH,
        });
    }

    let stats = [
        ("hp", pokemon.hp),
        ("attack", pokemon.attack),
        ("defense", pokemon.defense),
        ("sp_attack", pokemon.sp_attack),
        ("sp_defense", pokemon.sp_defense),
        ("speed", pokemon.speed),
    ];
    if let Some((field, _)) = stats.iter().find(|(_, value)| *value > MAX_STORED_STAT) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::from(MAX_STORED_STAT),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
