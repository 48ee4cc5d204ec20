//! Account route handlers.
//!
//! Register, login, logout and the current-user lookup. Login state lives in
//! the session; see [`crate::middleware::auth`].

use axum::{extract::State, http::StatusCode};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::extract::Json;
use crate::middleware::{RequireAuth, clear_current_user, set_current_user};
use crate::models::{CurrentUser, PublicUser};
use crate::services::{AuthError, AuthService};
use crate::state::AppState;

/// Registration body.
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub name: String,
}

/// Login body.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Create an account. The caller stays logged out.
#[instrument(skip_all, fields(username = %body.username))]
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<PublicUser>)> {
    let user = AuthService::new(state.storage())
        .register(&body.username, &body.password, &body.name)
        .await?;

    tracing::info!(user_id = %user.id, "User registered");
    Ok((StatusCode::CREATED, Json(PublicUser::from(&user))))
}

/// Log in with username and password.
///
/// The session id is rotated on success; the cart survives.
#[instrument(skip_all, fields(username = %body.username))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<LoginRequest>,
) -> Result<Json<PublicUser>> {
    let user = match AuthService::new(state.storage())
        .login(&body.username, &body.password)
        .await
    {
        Ok(user) => user,
        Err(e @ AuthError::InvalidCredentials) => {
            tracing::info!("Login failed");
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };

    let current = CurrentUser {
        id: user.id,
        username: user.username.clone(),
    };
    set_current_user(&session, &current).await?;
    set_sentry_user(&user.id, Some(user.username.as_str()));

    tracing::info!(user_id = %user.id, "User logged in");
    Ok(Json(PublicUser::from(&user)))
}

/// Log out. Idempotent; the anonymous cart is kept.
#[instrument(skip_all)]
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}

/// The logged-in user.
#[instrument(skip_all, fields(user_id = %current.id))]
pub async fn me(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<PublicUser>> {
    let user = AuthService::new(state.storage())
        .get_user(current.id)
        .await
        .map_err(|e| match e {
            AuthError::UserNotFound => AppError::Unauthorized("Not logged in".to_owned()),
            other => AppError::Auth(other),
        })?;

    Ok(Json(PublicUser::from(&user)))
}
