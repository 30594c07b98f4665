//! Database models for melodex.
//!
//! These structs mirror the rows of the catalog schema and are used for
//! reading and writing records.

use chrono::{DateTime, Utc};
use melodex_common::{EntryId, UserId};
use serde::{Deserialize, Serialize};

/// A single audio file known to the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: EntryId,
    /// File name without extension; unique across the catalog.
    pub name: String,
    /// Location under the watched root, e.g. `/Song.mp3`.
    pub relative_path: String,
    /// When the entry was inserted (not the file's mtime).
    pub created_at: DateTime<Utc>,
}

/// A user's favorite, pointing at a catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favorite {
    pub id: i64,
    pub user_id: String,
    pub entry_id: EntryId,
    pub created_at: DateTime<Utc>,
}

/// A registered user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: Option<String>,
    /// bcrypt hash; never leaves the server.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// A bearer session issued at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken {
    pub token: String,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
