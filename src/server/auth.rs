//! Accounts, sessions and bearer authentication.
//!
//! Two bearer credentials exist: session tokens issued by
//! `POST /api/auth/login`, and the optional static `api_key` from config.
//! When auth is enabled the catalog routes accept either one. Routes that
//! act for a particular user (favorites, `me`, logout) always require a
//! session token and take the user from it.

use crate::config::AuthConfig;
use crate::server::routes_catalog::envelope;
use crate::server::{ApiError, AppContext};
use axum::{
    body::Body,
    extract::{Extension, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    typed_header::TypedHeader,
};
use chrono::{DateTime, Duration, Utc};
use melodex_common::{Error, UserId};
use melodex_db::{
    models::User,
    pool::get_conn,
    queries::{auth_tokens, users},
};
use serde::{Deserialize, Serialize};

const USERNAME_LEN: std::ops::RangeInclusive<usize> = 3..=20;
const MIN_PASSWORD_LEN: usize = 8;
const MAX_SESSION_HOURS: u64 = 24 * 365;

/// The user a session token was issued for, stored in request extensions.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn id(&self) -> UserId {
        self.0.id
    }
}

/// Registration request payload
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    pub password: String,
}

/// Login request payload
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Public view of an account
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: UserId,
    pub username: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserResponse,
}

/// `POST /auth/register` and `POST /auth/login`; no credential needed.
pub fn public_routes() -> Router<AppContext> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

/// Routes that need a session; wrap with [`require_user`].
pub fn session_routes() -> Router<AppContext> {
    Router::new()
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
}

/// Whether `token` is the configured API key. An unset or empty key never
/// matches.
fn api_key_matches(auth_config: &AuthConfig, token: &str) -> bool {
    auth_config
        .api_key
        .as_deref()
        .is_some_and(|key| !key.is_empty() && key == token)
}

fn validate_registration(username: &str, password: &str) -> Result<(), Error> {
    if !USERNAME_LEN.contains(&username.chars().count()) {
        return Err(Error::invalid_input(format!(
            "Username must be {} to {} characters",
            USERNAME_LEN.start(),
            USERNAME_LEN.end()
        )));
    }
    if username.chars().any(char::is_whitespace) {
        return Err(Error::invalid_input("Username cannot contain whitespace"));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::invalid_input(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

fn session_user(ctx: &AppContext, token: &str) -> Result<Option<User>, ApiError> {
    let conn = get_conn(&ctx.db)?;
    Ok(auth_tokens::get_token_user(&conn, token)?)
}

/// Middleware for the catalog routes when auth is enabled: accepts the API
/// key or any valid session token.
pub async fn api_auth_middleware(
    State(ctx): State<AppContext>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(TypedHeader(Authorization(bearer))) = bearer else {
        return Err(Error::unauthorized("Authentication required").into());
    };

    if !api_key_matches(&ctx.config.server.auth, bearer.token())
        && session_user(&ctx, bearer.token())?.is_none()
    {
        return Err(Error::unauthorized("Invalid or expired credentials").into());
    }

    Ok(next.run(request).await)
}

/// Middleware for per-user routes: resolves the session token and stores
/// the [`CurrentUser`] in the request extensions.
pub async fn require_user(
    State(ctx): State<AppContext>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(TypedHeader(Authorization(bearer))) = bearer else {
        return Err(Error::unauthorized("Login required").into());
    };

    let user = session_user(&ctx, bearer.token())?
        .ok_or_else(|| Error::unauthorized("Invalid or expired session"))?;

    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}

/// Create an account.
pub async fn register(
    State(ctx): State<AppContext>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_registration(&req.username, &req.password)?;

    let hash = bcrypt::hash(&req.password, bcrypt::DEFAULT_COST)
        .map_err(|e| Error::internal(format!("bcrypt error: {e}")))?;

    let conn = get_conn(&ctx.db)?;
    let email = req.email.as_deref().filter(|e| !e.is_empty());
    let user = users::create_user(&conn, &req.username, email, &hash)?;
    tracing::info!(user = %user.id, username = %user.username, "Registered user");

    Ok((
        StatusCode::CREATED,
        envelope("Registered", UserResponse::from(user)),
    ))
}

/// Check credentials and issue a session token.
pub async fn login(
    State(ctx): State<AppContext>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let conn = get_conn(&ctx.db)?;

    // Unknown user and wrong password look the same to the caller.
    let user = users::get_user_by_username(&conn, &req.username)?
        .filter(|user| bcrypt::verify(&req.password, &user.password_hash).unwrap_or(false))
        .ok_or_else(|| Error::unauthorized("Invalid credentials"))?;

    match auth_tokens::delete_expired_tokens(&conn) {
        Ok(0) => {}
        Ok(pruned) => tracing::debug!(pruned, "Pruned expired sessions"),
        Err(e) => tracing::warn!(error = %e, "Failed to prune expired sessions"),
    }

    let hours = ctx.config.server.auth.session_timeout_hours.min(MAX_SESSION_HOURS);
    let expires_at = Utc::now() + Duration::hours(hours as i64);
    let token = auth_tokens::create_token(&conn, user.id, expires_at)?;
    tracing::info!(user = %user.id, username = %user.username, "User logged in");

    Ok(envelope(
        "Login successful",
        LoginResponse {
            token: token.token,
            expires_at: token.expires_at,
            user: UserResponse::from(user),
        },
    ))
}

/// Revoke the session token the request was made with.
pub async fn logout(
    State(ctx): State<AppContext>,
    TypedHeader(Authorization(bearer)): TypedHeader<Authorization<Bearer>>,
) -> Result<impl IntoResponse, ApiError> {
    let conn = get_conn(&ctx.db)?;
    auth_tokens::delete_token(&conn, bearer.token())?;
    Ok(StatusCode::NO_CONTENT)
}

/// The account behind the current session.
pub async fn me(Extension(user): Extension<CurrentUser>) -> impl IntoResponse {
    envelope("ok", UserResponse::from(user.0))
}
