//! Favorites of the logged-in user.
//!
//! Every route here sits behind [`require_user`](super::auth::require_user),
//! so the user always comes from the session token. Favorites point at
//! catalog ids, so an entry that is removed (or renamed) on disk silently
//! drops out of every favorites list.

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use melodex_common::EntryId;
use melodex_db::{pool::get_conn, queries::favorites};
use serde::Deserialize;

use super::auth::CurrentUser;
use super::routes_catalog::{envelope, parse_entry_id, MusicResponse};
use super::{ApiError, AppContext};

pub fn favorite_routes() -> Router<AppContext> {
    Router::new()
        .route("/favorites", get(list_favorites).post(add_favorite))
        .route("/favorites/ids", get(favorite_ids))
        .route(
            "/favorites/:id",
            get(check_favorite).delete(remove_favorite),
        )
}

#[derive(Debug, Deserialize)]
pub struct AddFavoriteRequest {
    pub music_id: EntryId,
}

pub async fn list_favorites(
    State(ctx): State<AppContext>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = user.id().to_string();
    let conn = get_conn(&ctx.db)?;
    let entries: Vec<MusicResponse> = favorites::list_favorites(&conn, &user_id)?
        .into_iter()
        .map(MusicResponse::from)
        .collect();

    Ok(envelope("ok", entries))
}

pub async fn favorite_ids(
    State(ctx): State<AppContext>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = user.id().to_string();
    let conn = get_conn(&ctx.db)?;
    let ids = favorites::favorite_entry_ids(&conn, &user_id)?;

    Ok(envelope("ok", ids))
}

pub async fn add_favorite(
    State(ctx): State<AppContext>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<AddFavoriteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = user.id().to_string();
    let conn = get_conn(&ctx.db)?;
    let favorite = favorites::add_favorite(&conn, &user_id, req.music_id)?;
    tracing::debug!(user = %user_id, entry = %favorite.entry_id, "Added favorite");

    Ok((StatusCode::CREATED, envelope("Added to favorites", favorite)))
}

pub async fn check_favorite(
    State(ctx): State<AppContext>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_entry_id(&id)?;
    let user_id = user.id().to_string();
    let conn = get_conn(&ctx.db)?;
    let is_favorite = favorites::is_favorite(&conn, &user_id, id)?;

    Ok(envelope("ok", serde_json::json!({ "is_favorite": is_favorite })))
}

pub async fn remove_favorite(
    State(ctx): State<AppContext>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_entry_id(&id)?;
    let user_id = user.id().to_string();
    let conn = get_conn(&ctx.db)?;
    favorites::remove_favorite(&conn, &user_id, id)?;

    Ok(StatusCode::NO_CONTENT)
}
