//! Database query modules.
//!
//! - catalog: the catalog accessor used by the reconciler and read paths
//! - favorites: per-user favorites that reference catalog entries
//! - users: registered accounts
//! - auth_tokens: bearer sessions issued at login

pub mod auth_tokens;
pub mod catalog;
pub mod favorites;
pub mod users;

use chrono::{DateTime, Utc};

/// Parse a stored RFC 3339 timestamp, falling back to now for bad rows.
pub(crate) fn parse_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Whether a rusqlite error is a UNIQUE/PRIMARY KEY constraint violation.
pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    )
}
