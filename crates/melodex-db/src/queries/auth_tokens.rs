//! Bearer session token queries.
//!
//! Tokens are random UUID strings. A token is valid until its `expires_at`;
//! expired rows are ignored on lookup and pruned on the next login.

use chrono::{DateTime, SecondsFormat, Utc};
use melodex_common::{Error, Result, UserId};
use rusqlite::{named_params, Connection, OptionalExtension};
use uuid::Uuid;

use super::parse_timestamp;
use crate::models::{AuthToken, User};

/// Fixed-width UTC timestamps so `expires_at` compares correctly as text.
fn expiry_stamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Issue a new token for `user_id` that expires at `expires_at`.
pub fn create_token(
    conn: &Connection,
    user_id: UserId,
    expires_at: DateTime<Utc>,
) -> Result<AuthToken> {
    let token = Uuid::new_v4().to_string();
    let now = Utc::now();

    conn.execute(
        "INSERT INTO auth_tokens (token, user_id, created_at, expires_at)
         VALUES (:token, :user_id, :created_at, :expires_at)",
        named_params! {
            ":token": token,
            ":user_id": user_id.to_string(),
            ":created_at": now.to_rfc3339(),
            ":expires_at": expiry_stamp(expires_at),
        },
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(AuthToken {
        token,
        user_id,
        created_at: now,
        expires_at,
    })
}

/// Resolve an unexpired token to the user it was issued for.
pub fn get_token_user(conn: &Connection, token: &str) -> Result<Option<User>> {
    let row = conn
        .query_row(
            "SELECT u.id, u.username, u.email, u.password_hash, u.created_at, t.expires_at
             FROM auth_tokens t
             INNER JOIN users u ON t.user_id = u.id
             WHERE t.token = :token",
            named_params! { ":token": token },
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                ))
            },
        )
        .optional()
        .map_err(|e| Error::database(e.to_string()))?;

    let Some((id, username, email, password_hash, created_at, expires_at)) = row else {
        return Ok(None);
    };

    // Unparseable expiry counts as expired.
    let expired = DateTime::parse_from_rfc3339(&expires_at)
        .map(|at| at.with_timezone(&Utc) <= Utc::now())
        .unwrap_or(true);
    if expired {
        return Ok(None);
    }

    let id = id
        .parse::<UserId>()
        .map_err(|e| Error::database(format!("corrupt user id '{}': {}", id, e)))?;

    Ok(Some(User {
        id,
        username,
        email,
        password_hash,
        created_at: parse_timestamp(&created_at),
    }))
}

/// Revoke a token. Returns whether it existed.
pub fn delete_token(conn: &Connection, token: &str) -> Result<bool> {
    let affected = conn
        .execute("DELETE FROM auth_tokens WHERE token = ?", [token])
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(affected > 0)
}

/// Remove every token that has expired, returning how many were removed.
pub fn delete_expired_tokens(conn: &Connection) -> Result<usize> {
    conn.execute(
        "DELETE FROM auth_tokens WHERE expires_at <= ?",
        [expiry_stamp(Utc::now())],
    )
    .map_err(|e| Error::database(e.to_string()))
}
