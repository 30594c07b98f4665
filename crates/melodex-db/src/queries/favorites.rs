//! Favorites database queries.
//!
//! Favorites join an opaque user identity to catalog entry ids. They only
//! read the catalog; when the reconciler deletes an entry the cascade
//! removes every favorite that pointed at it.

use chrono::Utc;
use melodex_common::{EntryId, Error, Result};
use rusqlite::{named_params, Connection, OptionalExtension};

use super::{is_unique_violation, parse_timestamp};
use crate::models::{CatalogEntry, Favorite};

/// Mark an entry as a favorite of `user_id`.
///
/// # Errors
///
/// * `Error::NotFound` - the catalog entry does not exist
/// * `Error::Conflict` - the user already favorited this entry
pub fn add_favorite(conn: &Connection, user_id: &str, entry_id: EntryId) -> Result<Favorite> {
    let exists = conn
        .query_row(
            "SELECT 1 FROM catalog_entries WHERE id = ?",
            [entry_id.get()],
            |_| Ok(()),
        )
        .optional()
        .map_err(|e| Error::database(e.to_string()))?
        .is_some();
    if !exists {
        return Err(Error::not_found(format!("catalog entry {}", entry_id)));
    }

    let now = Utc::now();
    conn.execute(
        "INSERT INTO user_favorites (user_id, entry_id, created_at)
         VALUES (:user_id, :entry_id, :created_at)",
        named_params! {
            ":user_id": user_id,
            ":entry_id": entry_id.get(),
            ":created_at": now.to_rfc3339(),
        },
    )
    .map_err(|e| {
        if is_unique_violation(&e) {
            Error::conflict(format!("entry {} is already a favorite", entry_id))
        } else {
            Error::database(e.to_string())
        }
    })?;

    Ok(Favorite {
        id: conn.last_insert_rowid(),
        user_id: user_id.to_string(),
        entry_id,
        created_at: now,
    })
}

/// Remove a favorite.
///
/// Returns `Error::NotFound` when the user had not favorited the entry.
pub fn remove_favorite(conn: &Connection, user_id: &str, entry_id: EntryId) -> Result<()> {
    let affected = conn
        .execute(
            "DELETE FROM user_favorites WHERE user_id = :user_id AND entry_id = :entry_id",
            named_params! {
                ":user_id": user_id,
                ":entry_id": entry_id.get(),
            },
        )
        .map_err(|e| Error::database(e.to_string()))?;

    if affected == 0 {
        return Err(Error::not_found(format!("favorite {} for user {}", entry_id, user_id)));
    }
    Ok(())
}

/// Catalog entries favorited by a user, most recently favorited first.
pub fn list_favorites(conn: &Connection, user_id: &str) -> Result<Vec<CatalogEntry>> {
    let mut stmt = conn
        .prepare(
            "SELECT c.id, c.name, c.relative_path, c.created_at
             FROM catalog_entries c
             JOIN user_favorites f ON f.entry_id = c.id
             WHERE f.user_id = :user_id
             ORDER BY f.created_at DESC, f.id DESC",
        )
        .map_err(|e| Error::database(e.to_string()))?;

    let entries = stmt
        .query_map(named_params! { ":user_id": user_id }, |row| {
            Ok(CatalogEntry {
                id: EntryId::from(row.get::<_, i64>(0)?),
                name: row.get(1)?,
                relative_path: row.get(2)?,
                created_at: parse_timestamp(&row.get::<_, String>(3)?),
            })
        })
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(entries)
}

/// Ids of the entries a user has favorited.
pub fn favorite_entry_ids(conn: &Connection, user_id: &str) -> Result<Vec<EntryId>> {
    let mut stmt = conn
        .prepare("SELECT entry_id FROM user_favorites WHERE user_id = ? ORDER BY entry_id")
        .map_err(|e| Error::database(e.to_string()))?;

    let ids = stmt
        .query_map([user_id], |row| row.get::<_, i64>(0).map(EntryId::from))
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(ids)
}

/// Whether a user has favorited an entry.
pub fn is_favorite(conn: &Connection, user_id: &str, entry_id: EntryId) -> Result<bool> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM user_favorites WHERE user_id = :user_id AND entry_id = :entry_id",
            named_params! {
                ":user_id": user_id,
                ":entry_id": entry_id.get(),
            },
            |row| row.get(0),
        )
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(count > 0)
}
