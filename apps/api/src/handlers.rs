//! # Pokemon Handlers
//!
//! The seam between transport and store: validates input, runs repository
//! calls off the request task, and shapes results into response envelopes.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    search_pokemons("  char ")                           │
//! │                                                                         │
//! │  validate_search_term ──✗──► ApiError::Validation (store untouched)    │
//! │       │ "char"                                                          │
//! │       ▼                                                                 │
//! │  tokio::spawn(repo.search("char"))  ← runs on the worker pool          │
//! │       │                                                                 │
//! │       ├── Err(DbError)  ──► ApiError (see error.rs)                    │
//! │       ├── JoinError     ──► ApiError::Internal                         │
//! │       ▼                                                                 │
//! │  SearchEnvelope { query: "char", count: 1, data: [...] }               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A dropped request does not cancel the spawned task; the store operation
//! still runs to completion and releases its connection.

use std::future::Future;

use pokedex_core::validation::{validate_new_pokemon, validate_search_term};
use pokedex_core::{NewPokemon, Pokemon, PokemonStats};
use pokedex_db::{Database, DbResult, PokemonRepository};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{ApiError, ApiResult};

/// Reported by the health endpoint.
pub const SERVICE_NAME: &str = "pokedex";

/// Public API version reported by the health endpoint.
pub const API_VERSION: &str = "1.0.0";

const RESOURCE: &str = "Pokémon";

// =============================================================================
// Envelopes
// =============================================================================

/// Full listing.
#[derive(Debug, Serialize)]
pub struct ListEnvelope {
    pub count: usize,
    pub data: Vec<Pokemon>,
}

/// Search results with the normalized term echoed back.
#[derive(Debug, Serialize)]
pub struct SearchEnvelope {
    pub query: String,
    pub count: usize,
    pub data: Vec<Pokemon>,
}

/// Creation acknowledgement.
#[derive(Debug, Serialize)]
pub struct CreatedEnvelope {
    pub status: &'static str,
    pub message: String,
    pub pokemon: NewPokemon,
}

#[derive(Debug, Serialize)]
pub struct CountEnvelope {
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

// =============================================================================
// Handlers
// =============================================================================

/// Catalog operations as the transport layer sees them.
///
/// Cheap to clone; holds only the database handle.
#[derive(Debug, Clone)]
pub struct PokemonHandlers {
    db: Database,
}

impl PokemonHandlers {
    pub fn new(db: Database) -> Self {
        PokemonHandlers { db }
    }

    /// Lists every record ordered by id.
    pub async fn list_pokemons(&self) -> ApiResult<ListEnvelope> {
        let data = self.offload(|repo| async move { repo.list_all().await }).await?;

        Ok(ListEnvelope {
            count: data.len(),
            data,
        })
    }

    /// Searches by name or type.
    ///
    /// The term is trimmed; a blank term is rejected before any store
    /// access.
    pub async fn search_pokemons(&self, raw: &str) -> ApiResult<SearchEnvelope> {
        let term = validate_search_term(raw)?;
        debug!(term = %term, "Search requested");

        let query = term.clone();
        let data = self
            .offload(move |repo| async move { repo.search(&query).await })
            .await?;

        Ok(SearchEnvelope {
            query: term,
            count: data.len(),
            data,
        })
    }

    /// Validates and inserts a new record.
    ///
    /// ## Returns
    /// * `Ok(CreatedEnvelope)` - Row committed
    /// * `Err(ApiError::Validation)` - Input rejected, store untouched
    /// * `Err(ApiError::Conflict)` - Duplicate id, constraint violation, or
    ///   nothing inserted
    pub async fn create_pokemon(&self, input: NewPokemon) -> ApiResult<CreatedEnvelope> {
        validate_new_pokemon(&input)?;

        let candidate = input.clone();
        let outcome = self
            .offload(move |repo| async move { repo.create(&candidate).await })
            .await;

        match outcome {
            Ok(true) => {}
            Ok(false) | Err(ApiError::Conflict { .. }) => {
                return Err(ApiError::Conflict {
                    message: format!(
                        "{} #{} '{}' could not be created: the id is taken or a value was rejected",
                        RESOURCE, input.id, input.name
                    ),
                });
            }
            Err(e) => return Err(e),
        }

        info!(id = input.id, name = %input.name, "Pokemon created");

        Ok(CreatedEnvelope {
            status: "success",
            message: format!("{} '{}' created successfully", RESOURCE, input.name),
            pokemon: input,
        })
    }

    /// Catalog-wide statistics; zeroed for an empty catalog.
    pub async fn pokemon_stats(&self) -> ApiResult<PokemonStats> {
        self.offload(|repo| async move { repo.get_stats().await }).await
    }

    /// Detail lookup by id.
    pub async fn get_pokemon(&self, id: i64) -> ApiResult<Pokemon> {
        self.offload(move |repo| async move { repo.get_by_id(id).await })
            .await?
            .ok_or_else(|| ApiError::NotFound {
                resource: RESOURCE,
                key: id.to_string(),
            })
    }

    /// Detail lookup by name, ignoring case.
    pub async fn get_pokemon_by_name(&self, name: &str) -> ApiResult<Pokemon> {
        let wanted = name.to_string();
        self.offload(move |repo| async move { repo.get_by_name(&wanted).await })
            .await?
            .ok_or_else(|| ApiError::NotFound {
                resource: RESOURCE,
                key: name.to_string(),
            })
    }

    pub async fn pokemon_count(&self) -> ApiResult<CountEnvelope> {
        let count = self.offload(|repo| async move { repo.count().await }).await?;
        Ok(CountEnvelope { count })
    }

    pub fn health(&self) -> HealthStatus {
        HealthStatus {
            status: "ok",
            service: SERVICE_NAME,
            version: API_VERSION,
        }
    }

    /// Runs one repository call on its own task.
    async fn offload<T, F, Fut>(&self, op: F) -> ApiResult<T>
    where
        F: FnOnce(PokemonRepository) -> Fut,
        Fut: Future<Output = DbResult<T>> + Send + 'static,
        T: Send + 'static,
    {
        let task = tokio::spawn(op(self.db.pokemons()));

        match task.await {
            Ok(result) => result.map_err(ApiError::from),
            Err(e) => Err(ApiError::Internal {
                cause: format!("store task failed: {}", e),
            }),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pokedex_core::ValidationError;
    use pokedex_db::schema::SQLITE_SCHEMA;
    use tempfile::TempDir;

    fn new_pokemon(id: i64, name: &str, types: &str) -> NewPokemon {
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

    async fn empty_handlers() -> (TempDir, PokemonHandlers) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::sqlite(dir.path().join("pokedex.db")).unwrap();
        db.apply_schema(SQLITE_SCHEMA).await.unwrap();
        (dir, PokemonHandlers::new(db))
    }

    async fn seeded_handlers() -> (TempDir, PokemonHandlers) {
        let (dir, handlers) = empty_handlers().await;
        handlers
            .create_pokemon(new_pokemon(1, "Bulbasaur", "Grass"))
            .await
            .unwrap();
        handlers
            .create_pokemon(new_pokemon(4, "Charmander", "Fire"))
            .await
            .unwrap();
        (dir, handlers)
    }

    /// Handlers whose store directory does not exist, so any store access fails.
    fn unreachable_handlers() -> (TempDir, PokemonHandlers) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::sqlite(dir.path().join("missing").join("pokedex.db")).unwrap();
        (dir, PokemonHandlers::new(db))
    }

    #[tokio::test]
    async fn test_list_envelope() {
        let (_dir, handlers) = seeded_handlers().await;

        let listing = handlers.list_pokemons().await.unwrap();

        assert_eq!(listing.count, 2);
        let ids: Vec<i64> = listing.data.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 4]);
    }

    #[tokio::test]
    async fn test_search_echoes_trimmed_term() {
        let (_dir, handlers) = seeded_handlers().await;

        let results = handlers.search_pokemons("  ar ").await.unwrap();

        assert_eq!(results.query, "ar");
        assert_eq!(results.count, 1);
        assert_eq!(results.data[0].name, "Charmander");
    }

    #[tokio::test]
    async fn test_blank_search_rejected_before_store() {
        let (_dir, handlers) = unreachable_handlers();

        for blank in ["", "   ", "\t\n"] {
            let err = handlers.search_pokemons(blank).await.unwrap_err();
            assert!(
                matches!(err, ApiError::Validation(ValidationError::Required { .. })),
                "{err:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_create_envelope() {
        let (_dir, handlers) = empty_handlers().await;

        let created = handlers
            .create_pokemon(new_pokemon(25, "Pikachu", "Electric"))
            .await
            .unwrap();

        assert_eq!(created.status, "success");
        assert_eq!(created.message, "Pokémon 'Pikachu' created successfully");
        assert_eq!(created.pokemon.id, 25);
        assert_eq!(handlers.get_pokemon(25).await.unwrap().name, "Pikachu");
    }

    #[tokio::test]
    async fn test_duplicate_create_is_conflict() {
        let (_dir, handlers) = seeded_handlers().await;

        let err = handlers
            .create_pokemon(new_pokemon(1, "Impostor", "Normal"))
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Conflict { .. }), "{err:?}");
        assert_eq!(handlers.pokemon_count().await.unwrap().count, 2);
    }

    #[tokio::test]
    async fn test_invalid_create_is_rejected_before_store() {
        let (_dir, handlers) = unreachable_handlers();

        let err = handlers
            .create_pokemon(new_pokemon(7, "   ", "Water"))
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Validation(_)), "{err:?}");
    }

    #[tokio::test]
    async fn test_oversized_id_is_rejected_before_store() {
        let (_dir, handlers) = unreachable_handlers();

        let err = handlers
            .create_pokemon(new_pokemon(3_000_000_000, "Missingno", "Bird, Normal"))
            .await
            .unwrap_err();

        assert!(
            matches!(err, ApiError::Validation(ValidationError::OutOfRange { ref field, .. }) if field == "id"),
            "{err:?}"
        );
    }

    #[tokio::test]
    async fn test_missing_id_is_not_found() {
        let (_dir, handlers) = seeded_handlers().await;

        let err = handlers.get_pokemon(99).await.unwrap_err();

        assert!(matches!(err, ApiError::NotFound { ref key, .. } if key == "99"));
    }

    #[tokio::test]
    async fn test_lookup_by_name_ignores_case() {
        let (_dir, handlers) = seeded_handlers().await;

        assert_eq!(handlers.get_pokemon_by_name("bulbasaur").await.unwrap().id, 1);
        assert!(matches!(
            handlers.get_pokemon_by_name("Mew").await.unwrap_err(),
            ApiError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_stats_on_empty_catalog() {
        let (_dir, handlers) = empty_handlers().await;

        assert_eq!(handlers.pokemon_stats().await.unwrap(), PokemonStats::empty());
    }

    #[tokio::test]
    async fn test_unreachable_store_is_unavailable() {
        let (_dir, handlers) = unreachable_handlers();

        let err = handlers.list_pokemons().await.unwrap_err();

        assert!(matches!(err, ApiError::Unavailable(_)), "{err:?}");
    }

    #[test]
    fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let handlers = PokemonHandlers::new(Database::sqlite(dir.path().join("p.db")).unwrap());

        let health = handlers.health();
        assert_eq!(health.status, "ok");
        assert_eq!(health.service, "pokedex");
        assert_eq!(health.version, "1.0.0");
    }
}
