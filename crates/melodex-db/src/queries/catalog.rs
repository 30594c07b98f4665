//! Catalog entry query operations.
//!
//! This is the narrow accessor the reconciler writes through. HTTP read
//! paths use `list_all` and `get_entry`. The `UNIQUE` constraint on `name`
//! is what ultimately keeps the catalog free of duplicates; `insert_entry`
//! reports a violation as [`Error::Conflict`].

use chrono::Utc;
use melodex_common::{EntryId, Error, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{is_unique_violation, parse_timestamp};
use crate::models::CatalogEntry;

const ENTRY_COLUMNS: &str = "id, name, relative_path, created_at";

fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<CatalogEntry> {
    Ok(CatalogEntry {
        id: EntryId::from(row.get::<_, i64>(0)?),
        name: row.get(1)?,
        relative_path: row.get(2)?,
        created_at: parse_timestamp(&row.get::<_, String>(3)?),
    })
}

/// Look up the entry with the given normalized name.
pub fn find_by_name(conn: &Connection, name: &str) -> Result<Option<CatalogEntry>> {
    conn.query_row(
        &format!("SELECT {ENTRY_COLUMNS} FROM catalog_entries WHERE name = ?"),
        [name],
        row_to_entry,
    )
    .optional()
    .map_err(|e| Error::database(e.to_string()))
}

/// Insert a new entry stamped with the current time.
///
/// # Errors
///
/// * `Error::Conflict` - an entry with this name already exists
/// * `Error::Database` - any other store failure
pub fn insert_entry(conn: &Connection, name: &str, relative_path: &str) -> Result<CatalogEntry> {
    let now = Utc::now();

    conn.execute(
        "INSERT INTO catalog_entries (name, relative_path, created_at) VALUES (?, ?, ?)",
        params![name, relative_path, now.to_rfc3339()],
    )
    .map_err(|e| {
        if is_unique_violation(&e) {
            Error::conflict(format!("catalog entry '{}' already exists", name))
        } else {
            Error::database(e.to_string())
        }
    })?;

    Ok(CatalogEntry {
        id: EntryId::from(conn.last_insert_rowid()),
        name: name.to_string(),
        relative_path: relative_path.to_string(),
        created_at: now,
    })
}

/// Delete the entry with the given name, returning the number of rows removed.
///
/// Deleting a name that is not cataloged affects zero rows and is not an error.
pub fn delete_by_name(conn: &Connection, name: &str) -> Result<usize> {
    conn.execute("DELETE FROM catalog_entries WHERE name = ?", [name])
        .map_err(|e| Error::database(e.to_string()))
}

/// Get an entry by ID.
pub fn get_entry(conn: &Connection, id: EntryId) -> Result<CatalogEntry> {
    conn.query_row(
        &format!("SELECT {ENTRY_COLUMNS} FROM catalog_entries WHERE id = ?"),
        [id.get()],
        row_to_entry,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => Error::not_found(format!("catalog entry {}", id)),
        _ => Error::database(e.to_string()),
    })
}

/// List every entry, ordered by id ascending.
pub fn list_all(conn: &Connection) -> Result<Vec<CatalogEntry>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {ENTRY_COLUMNS} FROM catalog_entries ORDER BY id ASC"
        ))
        .map_err(|e| Error::database(e.to_string()))?;

    let entries = stmt
        .query_map([], row_to_entry)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(entries)
}

/// Count cataloged entries.
pub fn count_entries(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM catalog_entries", [], |row| row.get(0))
        .map_err(|e| Error::database(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{get_conn, init_memory_pool};

    #[test]
    fn test_insert_and_find() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();

        let entry = insert_entry(&conn, "Song", "/Song.mp3").unwrap();
        assert_eq!(entry.name, "Song");
        assert_eq!(entry.relative_path, "/Song.mp3");

        let found = find_by_name(&conn, "Song").unwrap().unwrap();
        assert_eq!(found.id, entry.id);
        assert_eq!(found.relative_path, "/Song.mp3");
    }

    #[test]
    fn test_find_missing() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();
        assert!(find_by_name(&conn, "nope").unwrap().is_none());
    }

    #[test]
    fn test_insert_duplicate_name_conflicts() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();

        insert_entry(&conn, "Track", "/Track.mp3").unwrap();
        let err = insert_entry(&conn, "Track", "/Track.wav").unwrap_err();
        assert!(err.is_conflict());

        let entry = find_by_name(&conn, "Track").unwrap().unwrap();
        assert_eq!(entry.relative_path, "/Track.mp3");
        assert_eq!(count_entries(&conn).unwrap(), 1);
    }

    #[test]
    fn test_delete_by_name() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();

        insert_entry(&conn, "Song", "/Song.mp3").unwrap();
        assert_eq!(delete_by_name(&conn, "Song").unwrap(), 1);
        assert_eq!(delete_by_name(&conn, "Song").unwrap(), 0);
        assert!(find_by_name(&conn, "Song").unwrap().is_none());
    }

    #[test]
    fn test_get_entry() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();

        let entry = insert_entry(&conn, "Song", "/Song.mp3").unwrap();
        assert_eq!(get_entry(&conn, entry.id).unwrap().name, "Song");

        let err = get_entry(&conn, EntryId::from(999)).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_list_all_ordered_by_id() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();

        insert_entry(&conn, "b", "/b.mp3").unwrap();
        insert_entry(&conn, "a", "/a.mp3").unwrap();
        insert_entry(&conn, "c", "/c.mp3").unwrap();

        let names: Vec<_> = list_all(&conn)
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_reinsert_after_delete_gets_new_id() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();

        let first = insert_entry(&conn, "Song", "/Song.mp3").unwrap();
        delete_by_name(&conn, "Song").unwrap();
        let second = insert_entry(&conn, "Song", "/Song.mp3").unwrap();
        assert_ne!(first.id, second.id);
    }
}
