//! # Seed Data Loader
//!
//! Populates a local SQLite store with a starter set of Pokémon.
//!
//! ## Usage
//! ```bash
//! # Seed ./pokedex_dev.db (default)
//! cargo run -p pokedex-db --bin seed
//!
//! # Specify database path
//! cargo run -p pokedex-db --bin seed -- --db ./data/pokedex.db
//! ```
//!
//! The schema is applied first. Entries whose id already exists are skipped,
//! so the loader can be re-run against a partially seeded file.

use std::env;

use anyhow::Context;
use pokedex_core::NewPokemon;
use pokedex_db::schema::SQLITE_SCHEMA;
use pokedex_db::{Database, DbError};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// (id, name, types, hp, attack, defense, sp_attack, sp_defense, speed)
type Entry = (i64, &'static str, &'static str, u32, u32, u32, u32, u32, u32);

/// Starter catalog with base stats.
const STARTERS: &[Entry] = &[
    (1, "Bulbasaur", "Grass, Poison", 45, 49, 49, 65, 65, 45),
    (2, "Ivysaur", "Grass, Poison", 60, 62, 63, 80, 80, 60),
    (3, "Venusaur", "Grass, Poison", 80, 82, 83, 100, 100, 80),
    (4, "Charmander", "Fire", 39, 52, 43, 60, 50, 65),
    (5, "Charmeleon", "Fire", 58, 64, 58, 80, 65, 80),
    (6, "Charizard", "Fire, Flying", 78, 84, 78, 109, 85, 100),
    (7, "Squirtle", "Water", 44, 48, 65, 50, 64, 43),
    (8, "Wartortle", "Water", 59, 63, 80, 65, 80, 58),
    (9, "Blastoise", "Water", 79, 83, 100, 85, 105, 78),
    (25, "Pikachu", "Electric", 35, 55, 40, 50, 50, 90),
    (26, "Raichu", "Electric", 60, 90, 55, 90, 80, 110),
    (39, "Jigglypuff", "Normal, Fairy", 115, 45, 20, 45, 25, 20),
    (52, "Meowth", "Normal", 40, 45, 35, 40, 40, 90),
    (54, "Psyduck", "Water", 50, 52, 48, 65, 50, 55),
    (94, "Gengar", "Ghost, Poison", 60, 65, 60, 130, 75, 110),
    (129, "Magikarp", "Water", 20, 10, 55, 15, 20, 80),
    (130, "Gyarados", "Water, Flying", 95, 125, 79, 60, 100, 81),
    (131, "Lapras", "Water, Ice", 130, 85, 80, 85, 95, 60),
    (133, "Eevee", "Normal", 55, 55, 50, 45, 65, 55),
    (143, "Snorlax", "Normal", 160, 110, 65, 65, 110, 30),
    (150, "Mewtwo", "Psychic", 106, 110, 90, 154, 90, 130),
    (151, "Mew", "Psychic", 100, 100, 100, 100, 100, 100),
];

fn to_new_pokemon(entry: &Entry) -> NewPokemon {
    let &(id, name, types, hp, attack, defense, sp_attack, sp_defense, speed) = entry;
    NewPokemon {
        id,
        name: name.to_string(),
        types: types.to_string(),
        hp,
        attack,
        defense,
        sp_attack,
        sp_defense,
        speed,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./pokedex_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Pokédex Seed Data Loader");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./pokedex_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    info!(path = %db_path, "Seeding database");

    let db = Database::sqlite(&db_path).context("invalid database path")?;
    db.apply_schema(SQLITE_SCHEMA)
        .await
        .context("failed to apply schema")?;

    let repo = db.pokemons();
    let mut inserted = 0;
    let mut skipped = 0;

    for entry in STARTERS {
        let pokemon = to_new_pokemon(entry);
        match repo.create(&pokemon).await {
            Ok(true) => inserted += 1,
            Ok(false) | Err(DbError::WriteRejected { .. }) => {
                skipped += 1;
                info!(id = pokemon.id, name = %pokemon.name, "Already present, skipping");
            }
            Err(e) => {
                warn!(id = pokemon.id, error = %e, "Insert failed");
                return Err(e).context("seeding aborted");
            }
        }
    }

    let total = repo.count().await?;
    info!(inserted, skipped, total, "Seed complete");

    let sample = repo.search("char").await?;
    info!(matches = sample.len(), "Search 'char' check");

    Ok(())
}
