//! Router assembly.
//!
//! Shared by the binary and the integration tests, so both exercise the same
//! middleware stack.

use axum::{
    Router,
    body::Body,
    http::{HeaderValue, Method, Request, header::CONTENT_TYPE},
    middleware::from_fn,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tower_sessions::SessionStore;

use crate::config::{ConfigError, StorefrontConfig};
use crate::middleware::{
    create_session_layer, request_id_middleware, security_headers_middleware,
};
use crate::routes;
use crate::state::AppState;

/// Build the full application router.
///
/// `session_store` backs the session layer: `MemorySessionStore` for memory
/// storage, `PostgresStore` for postgres.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` if a configured CORS origin is not a
/// valid header value.
pub fn build<S>(state: AppState, session_store: S) -> Result<Router, ConfigError>
where
    S: SessionStore + Clone,
{
    let cors = cors_layer(state.config())?;
    let session_layer = create_session_layer(session_store, state.config());

    let api = routes::api_routes().layer(session_layer);

    Ok(Router::new()
        .nest("/api", api)
        .merge(routes::health_routes())
        .with_state(state)
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
            )
        }))
        .layer(cors)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction()))
}

/// Credentialed CORS for the configured web client origins.
fn cors_layer(config: &StorefrontConfig) -> Result<CorsLayer, ConfigError> {
    let origins = config
        .cors_origins
        .iter()
        .map(|origin| {
            origin.parse::<HeaderValue>().map_err(|_| {
                ConfigError::InvalidEnvVar(
                    "LUCID_CORS_ORIGINS".to_string(),
                    format!("invalid origin `{origin}`"),
                )
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([CONTENT_TYPE]))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::http::{StatusCode, header};
    use tower::ServiceExt;

    use super::*;
    use crate::db::memory::MemoryStorage;
    use crate::db::sessions::MemorySessionStore;

    fn app_with_sessions(sessions: MemorySessionStore) -> Router {
        let state = AppState::new(
            StorefrontConfig::default(),
            Arc::new(MemoryStorage::seeded()),
        );
        build(state, sessions).unwrap()
    }

    fn app() -> Router {
        app_with_sessions(MemorySessionStore::default())
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_cors_preflight_allows_local_client() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/api/cart")
                    .header(header::ORIGIN, "http://localhost:5173")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PATCH")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let headers = response.headers();
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:5173"
        );
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    }

    #[test]
    fn test_invalid_cors_origin() {
        let config = StorefrontConfig {
            cors_origins: vec!["bad\norigin".to_owned()],
            ..StorefrontConfig::default()
        };
        assert!(cors_layer(&config).is_err());
    }

    #[tokio::test]
    async fn test_cookieless_reads_create_no_sessions() {
        let sessions = MemorySessionStore::default();
        let app = app_with_sessions(sessions.clone());

        for path in ["/api/products", "/api/products/1", "/api/waitlist/count"] {
            for _ in 0..50 {
                let response = app
                    .clone()
                    .oneshot(Request::get(path).body(Body::empty()).unwrap())
                    .await
                    .unwrap();
                assert_eq!(response.status(), StatusCode::OK);
                assert!(response.headers().get(header::SET_COOKIE).is_none());
            }
        }

        assert!(sessions.is_empty().await);
    }

    #[tokio::test]
    async fn test_cart_request_issues_one_session() {
        let sessions = MemorySessionStore::default();
        let app = app_with_sessions(sessions.clone());

        let response = app
            .oneshot(Request::get("/api/cart").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().contains_key(header::SET_COOKIE));
        assert_eq!(sessions.len().await, 1);
    }
}
