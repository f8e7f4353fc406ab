//! # Pokédex API
//!
//! JSON HTTP API over the catalog store.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          API Layers                                     │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────────┐  ┌────────────────────────┐│
//! │  │  routes        │  │  handlers          │  │  pokedex-db            ││
//! │  │                │  │                    │  │                        ││
//! │  │ • axum Router  │─►│ • validation       │─►│ • PokemonRepository    ││
//! │  │ • extractors   │  │ • tokio::spawn     │  │ • QueryExecutor        ││
//! │  │ • TraceLayer   │  │ • envelopes        │  │ • MySqlConnector       ││
//! │  └────────────────┘  └────────────────────┘  └────────────────────────┘│
//! │          │                      │                                       │
//! │          ▼                      ▼                                       │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  error: ApiError → status code + {"error", "detail"} body        │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables (a local `.env` is read first):
//! - `DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASSWORD`, `DB_NAME`
//! - `DB_CONNECT_TIMEOUT_SECS` - Connect timeout (default: 10)
//! - `HOST`, `PORT` - Listener address (default: 0.0.0.0:8000)
//! - `RUST_LOG` - Log filter (default: info)

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;

// Re-exports
pub use config::AppConfig;
pub use error::ApiError;
pub use handlers::PokemonHandlers;

/// Shared application state.
pub struct AppState {
    pub handlers: PokemonHandlers,
}
