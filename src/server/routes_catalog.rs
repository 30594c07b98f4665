//! Read-only catalog routes.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use melodex_common::EntryId;
use melodex_db::{models::CatalogEntry, pool::get_conn, queries::catalog};
use serde::Serialize;

use super::{ApiError, AppContext};

pub fn catalog_routes() -> Router<AppContext> {
    Router::new()
        .route("/music", get(list_music))
        .route("/music/play/:id", get(play_music))
}

/// Catalog entry as exposed over HTTP
#[derive(Debug, Serialize)]
pub struct MusicResponse {
    pub id: EntryId,
    pub name: String,
    /// Path under the music directory, e.g. `/Song.mp3`
    pub file_path: String,
    pub created_at: DateTime<Utc>,
}

impl From<CatalogEntry> for MusicResponse {
    fn from(entry: CatalogEntry) -> Self {
        Self {
            id: entry.id,
            name: entry.name,
            file_path: entry.relative_path,
            created_at: entry.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PlayResponse {
    pub url: String,
}

/// `{code, message, data}` envelope used by the catalog routes.
pub(crate) fn envelope<T: Serialize>(message: impl Into<String>, data: T) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "code": 200,
        "message": message.into(),
        "data": data,
    }))
}

pub(crate) fn parse_entry_id(raw: &str) -> Result<EntryId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::bad_request(format!("Invalid music ID: {}", raw)))
}

/// List every catalog entry in id order.
pub async fn list_music(State(ctx): State<AppContext>) -> Result<impl IntoResponse, ApiError> {
    let conn = get_conn(&ctx.db)?;
    let entries: Vec<MusicResponse> = catalog::list_all(&conn)?
        .into_iter()
        .map(MusicResponse::from)
        .collect();

    Ok(envelope("ok", entries))
}

/// Resolve the playback location of one entry.
pub async fn play_music(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_entry_id(&id)?;
    let conn = get_conn(&ctx.db)?;
    let entry = catalog::get_entry(&conn, id)?;

    Ok(envelope(
        format!("Playing: {}", entry.name),
        PlayResponse {
            url: entry.relative_path,
        },
    ))
}
