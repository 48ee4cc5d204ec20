//! Pre-launch waitlist route handlers.

use axum::{extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use lucid_core::Email;

use crate::db::RepositoryError;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::extract::Json;
use crate::models::WaitlistEntry;
use crate::state::AppState;
use crate::validation;

/// Waitlist signup body.
#[derive(Debug, Deserialize)]
pub struct JoinRequest {
    pub email: String,
    pub name: String,
}

/// Response body for `GET /api/waitlist/count`.
#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: u64,
}

/// Join the waitlist.
///
/// Emails are compared case-insensitively; a second signup with the same
/// address is a 409.
#[instrument(skip(state, body))]
pub async fn join(
    State(state): State<AppState>,
    Json(body): Json<JoinRequest>,
) -> Result<(StatusCode, Json<WaitlistEntry>)> {
    let email = Email::parse(&body.email)
        .map_err(|_| AppError::BadRequest("Please enter a valid email address".to_owned()))?;
    let name = validation::display_name(&body.name).map_err(AppError::BadRequest)?;

    let entry = state
        .storage()
        .add_waitlist_entry(&email, &name)
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => {
                AppError::Conflict("This email is already on the waitlist".to_owned())
            }
            other => AppError::Database(other),
        })?;

    add_breadcrumb("waitlist", "Joined waitlist", Some(&[("domain", email.domain())]));
    tracing::info!(entry_id = %entry.id, "Waitlist signup");

    Ok((StatusCode::CREATED, Json(entry)))
}

/// Number of waitlist signups so far.
#[instrument(skip(state))]
pub async fn count(State(state): State<AppState>) -> Result<Json<CountResponse>> {
    let count = state.storage().count_waitlist_entries().await?;
    Ok(Json(CountResponse { count }))
}
