//! HTTP routes.
//!
//! | Method | Path                        | Handler                 |
//! |--------|-----------------------------|-------------------------|
//! | GET    | `/api/pokemons`             | `list_pokemons`         |
//! | POST   | `/api/pokemons`             | `create_pokemon` (201)  |
//! | GET    | `/api/pokemons/search?q=`   | `search_pokemons`       |
//! | GET    | `/api/pokemons/stats`       | `pokemon_stats`         |
//! | GET    | `/api/pokemons/count`       | `pokemon_count`         |
//! | GET    | `/api/pokemons/{id}`        | `get_pokemon`           |
//! | GET    | `/api/pokemons/name/{name}` | `get_pokemon_by_name`   |
//! | GET    | `/health`                   | `health`                |

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use pokedex_core::{NewPokemon, Pokemon, PokemonStats};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::handlers::{CountEnvelope, CreatedEnvelope, HealthStatus, ListEnvelope, SearchEnvelope};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

/// GET /api/pokemons
async fn list_pokemons(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ListEnvelope>, ApiError> {
    Ok(Json(state.handlers.list_pokemons().await?))
}

/// GET /api/pokemons/search?q=
async fn search_pokemons(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchEnvelope>, ApiError> {
    Ok(Json(state.handlers.search_pokemons(&params.q).await?))
}

/// POST /api/pokemons
async fn create_pokemon(
    State(state): State<Arc<AppState>>,
    Json(input): Json<NewPokemon>,
) -> Result<(StatusCode, Json<CreatedEnvelope>), ApiError> {
    let created = state.handlers.create_pokemon(input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/pokemons/stats
async fn pokemon_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PokemonStats>, ApiError> {
    Ok(Json(state.handlers.pokemon_stats().await?))
}

/// GET /api/pokemons/count
async fn pokemon_count(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CountEnvelope>, ApiError> {
    Ok(Json(state.handlers.pokemon_count().await?))
}

/// GET /api/pokemons/{id}
async fn get_pokemon(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Pokemon>, ApiError> {
    Ok(Json(state.handlers.get_pokemon(id).await?))
}

/// GET /api/pokemons/name/{name}
async fn get_pokemon_by_name(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<Pokemon>, ApiError> {
    Ok(Json(state.handlers.get_pokemon_by_name(&name).await?))
}

/// GET /health
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthStatus> {
    Json(state.handlers.health())
}

/// Builds the application router with request tracing.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/pokemons", get(list_pokemons).post(create_pokemon))
        .route("/api/pokemons/search", get(search_pokemons))
        .route("/api/pokemons/stats", get(pokemon_stats))
        .route("/api/pokemons/count", get(pokemon_count))
        .route("/api/pokemons/{id}", get(get_pokemon))
        .route("/api/pokemons/name/{name}", get(get_pokemon_by_name))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::PokemonHandlers;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use pokedex_db::schema::SQLITE_SCHEMA;
    use pokedex_db::Database;
    use serde_json::Value;
    use tempfile::TempDir;
    use tower::ServiceExt;

    async fn test_app() -> (TempDir, Router) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::sqlite(dir.path().join("pokedex.db")).unwrap();
        db.apply_schema(SQLITE_SCHEMA).await.unwrap();

        let state = Arc::new(AppState {
            handlers: PokemonHandlers::new(db),
        });
        (dir, router(state))
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    const CHARMANDER: &str = r#"{"id": 4, "name": "Charmander", "types": "Fire",
        "hp": 39, "attack": 52, "defense": 43, "sp_attack": 60, "sp_defense": 50, "speed": 65}"#;

    #[tokio::test]
    async fn test_health_endpoint() {
        let (_dir, app) = test_app().await;

        let (status, body) = send(&app, get("/health")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "pokedex");
    }

    #[tokio::test]
    async fn test_create_then_fetch() {
        let (_dir, app) = test_app().await;

        let (status, body) = send(&app, post_json("/api/pokemons", CHARMANDER)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["status"], "success");
        assert_eq!(body["pokemon"]["name"], "Charmander");

        let (status, body) = send(&app, get("/api/pokemons/4")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["types"], "Fire");

        let (status, body) = send(&app, get("/api/pokemons/name/charmander")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], 4);

        let (_, body) = send(&app, get("/api/pokemons")).await;
        assert_eq!(body["count"], 1);

        let (_, body) = send(&app, get("/api/pokemons/count")).await;
        assert_eq!(body["count"], 1);
    }

    #[tokio::test]
    async fn test_duplicate_post_is_409() {
        let (_dir, app) = test_app().await;
        send(&app, post_json("/api/pokemons", CHARMANDER)).await;

        let (status, body) = send(&app, post_json("/api/pokemons", CHARMANDER)).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "conflict");
    }

    #[tokio::test]
    async fn test_search_endpoint() {
        let (_dir, app) = test_app().await;
        send(&app, post_json("/api/pokemons", CHARMANDER)).await;

        let (status, body) = send(&app, get("/api/pokemons/search?q=CHAR")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["query"], "CHAR");
        assert_eq!(body["count"], 1);

        let (status, body) = send(&app, get("/api/pokemons/search?q=%20%20")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");

        let (status, _) = send(&app, get("/api/pokemons/search")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_stats_endpoint_on_empty_catalog() {
        let (_dir, app) = test_app().await;

        let (status, body) = send(&app, get("/api/pokemons/stats")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 0);
        assert_eq!(body["avg_hp"], 0.0);
    }

    #[tokio::test]
    async fn test_unknown_id_is_404() {
        let (_dir, app) = test_app().await;

        let (status, body) = send(&app, get("/api/pokemons/99")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
    }
}
