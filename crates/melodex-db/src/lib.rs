//! Melodex-DB: Catalog schema, migrations, and query operations
//!
//! This crate provides the catalog store for melodex using SQLite
//! with rusqlite and r2d2 connection pooling.
//!
//! # Modules
//!
//! - `migrations` - Database schema migrations
//! - `pool` - Connection pool management
//! - `models` - Rust models matching database schema
//! - `queries` - Catalog, favorites, user and session operations
//!
//! # Example
//!
//! ```no_run
//! use melodex_db::pool::{init_pool, get_conn};
//! use melodex_db::queries::catalog;
//!
//! let pool = init_pool("/var/lib/melodex/melodex.db").unwrap();
//! let conn = get_conn(&pool).unwrap();
//!
//! let entry = catalog::insert_entry(&conn, "Song", "/Song.mp3").unwrap();
//! println!("Cataloged: {} ({})", entry.name, entry.id);
//! ```

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
