//! # Repository Module
//!
//! Entity-shaped operations over the store.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Layering                                  │
//! │                                                                         │
//! │  Handler                                                               │
//! │       │  db.pokemons().search("char")                                  │
//! │       ▼                                                                 │
//! │  PokemonRepository                                                     │
//! │  ├── fixed SQL templates, `?` placeholders                             │
//! │  └── records → Pokemon / PokemonStats                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  QueryExecutor  (acquire → run → release)                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  MySQL / SQLite                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Repositories never validate input and never build user-facing text.
//!
//! ## Available Repositories
//!
//! - [`pokemon::PokemonRepository`] - Catalog listing, lookup, search, stats

pub mod pokemon;
