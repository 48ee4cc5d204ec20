//! Session middleware configuration.
//!
//! Sessions are stored server-side through tower-sessions: in memory for the
//! memory backend, in `PostgreSQL` (tower-sessions-sqlx-store) otherwise. The
//! cookie only carries the session id.
//!
//! Every session also carries a [`SessionKey`] that owns cart items. The key
//! lives in the session record, so it survives the id rotation on login.
//!
//! Sessions are saved on every request that has one, so the 24 hour expiry
//! counts from the last request rather than from the first.

use axum::{
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_sessions::{Expiry, Session, SessionManagerLayer, SessionStore};

use lucid_core::SessionKey;

use crate::config::StorefrontConfig;
use crate::error::AppError;
use crate::models::session_keys;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "lucid_session";

/// Session expiry time in seconds (24 hours of inactivity).
const SESSION_EXPIRY_SECONDS: i64 = 24 * 60 * 60;

/// Create the session layer over any tower-sessions store.
#[must_use]
pub fn create_session_layer<S>(store: S, config: &StorefrontConfig) -> SessionManagerLayer<S>
where
    S: SessionStore + Clone,
{
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_always_save(true)
        .with_secure(config.secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// Stamp a cart-owner key into sessions that lack one.
///
/// When the session already has a key it is copied into the request
/// extensions for [`CartSession`]. A session that arrives without one gets a
/// fresh key stored for next time, but the current request is still treated
/// as having no cart session.
///
/// Must run inside the session layer.
pub async fn session_key_middleware(session: Session, mut request: Request, next: Next) -> Response {
    match session.get::<SessionKey>(session_keys::CART_OWNER).await {
        Ok(Some(key)) => {
            request.extensions_mut().insert(key);
        }
        Ok(None) => {
            let key = SessionKey::generate();
            if let Err(e) = session.insert(session_keys::CART_OWNER, key).await {
                return AppError::Session(e).into_response();
            }
            tracing::debug!(session_key = %key, "Issued cart session key");
        }
        Err(e) => return AppError::Session(e).into_response(),
    }

    next.run(request).await
}

/// Extractor for the cart owner of the current request.
///
/// Rejects with 401 when the request arrived without an established session.
///
/// ```rust,ignore
/// async fn handler(CartSession(key): CartSession) -> impl IntoResponse { ... }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CartSession(pub SessionKey);

impl<S> FromRequestParts<S> for CartSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionKey>()
            .copied()
            .map(Self)
            .ok_or_else(|| AppError::Unauthorized("No session found".to_owned()))
    }
}
