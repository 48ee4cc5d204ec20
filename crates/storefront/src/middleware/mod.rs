//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. CORS (credentialed allow-list)
//! 3. `TraceLayer` (request span)
//! 4. Request ID (recorded in the span, echoed in the response)
//! 5. Security headers
//! 6. Session layer (tower-sessions, `/api` only)
//! 7. Session key (cart owner issue, `/api/cart` only)

pub mod auth;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{OptionalAuth, RequireAuth, clear_current_user, set_current_user};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::{CartSession, create_session_layer, session_key_middleware};
