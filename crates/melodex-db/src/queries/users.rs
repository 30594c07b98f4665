//! User account queries.
//!
//! Passwords arrive here already hashed; hashing and verification live in
//! the HTTP layer.

use chrono::Utc;
use melodex_common::{Error, Result, UserId};
use rusqlite::{named_params, Connection, OptionalExtension, Row};

use super::{is_unique_violation, parse_timestamp};
use crate::models::User;

const USER_COLUMNS: &str = "id, username, email, password_hash, created_at";

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
    let id: String = row.get(0)?;
    let id = id.parse::<UserId>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(User {
        id,
        username: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        created_at: parse_timestamp(&row.get::<_, String>(4)?),
    })
}

/// Create a new user.
///
/// # Errors
///
/// * `Error::Conflict` - the username is taken
/// * `Error::Database` - any other store failure
pub fn create_user(
    conn: &Connection,
    username: &str,
    email: Option<&str>,
    password_hash: &str,
) -> Result<User> {
    let id = UserId::new();
    let created_at = Utc::now();

    conn.execute(
        "INSERT INTO users (id, username, email, password_hash, created_at)
         VALUES (:id, :username, :email, :password_hash, :created_at)",
        named_params! {
            ":id": id.to_string(),
            ":username": username,
            ":email": email,
            ":password_hash": password_hash,
            ":created_at": created_at.to_rfc3339(),
        },
    )
    .map_err(|e| {
        if is_unique_violation(&e) {
            Error::conflict(format!("username '{}' already exists", username))
        } else {
            Error::database(e.to_string())
        }
    })?;

    Ok(User {
        id,
        username: username.to_string(),
        email: email.map(String::from),
        password_hash: password_hash.to_string(),
        created_at,
    })
}

/// Get a user by ID.
pub fn get_user(conn: &Connection, id: UserId) -> Result<Option<User>> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"),
        [id.to_string()],
        row_to_user,
    )
    .optional()
    .map_err(|e| Error::database(e.to_string()))
}

/// Get a user by username.
pub fn get_user_by_username(conn: &Connection, username: &str) -> Result<Option<User>> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?"),
        [username],
        row_to_user,
    )
    .optional()
    .map_err(|e| Error::database(e.to_string()))
}
