//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                - Liveness check
//! GET    /health/ready          - Readiness check (storage ping)
//!
//! # Catalog
//! GET    /api/products          - Product listing
//! GET    /api/products/{id}     - Product detail
//!
//! # Cart (session-scoped)
//! GET    /api/cart              - Items with embedded products
//! GET    /api/cart/summary      - Item count and subtotal
//! POST   /api/cart              - Add item
//! PATCH  /api/cart/{id}         - Replace quantity (0 removes)
//! DELETE /api/cart/{id}         - Remove item
//!
//! # Waitlist
//! POST   /api/waitlist          - Join
//! GET    /api/waitlist/count    - Signup count
//!
//! # Auth
//! POST   /api/register          - Create account
//! POST   /api/login             - Log in
//! POST   /api/logout            - Log out
//! GET    /api/user              - Current user
//! ```

pub mod auth;
pub mod cart;
pub mod health;
pub mod products;
pub mod waitlist;

use axum::{
    Router,
    middleware::from_fn,
    routing::{get, patch, post},
};

use crate::middleware::session_key_middleware;
use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
///
/// Only cart routes issue cart keys, so catalog and waitlist reads never
/// create a session.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).post(cart::add))
        .route("/summary", get(cart::summary))
        .route("/{id}", patch(cart::update).delete(cart::remove))
        .layer(from_fn(session_key_middleware))
}

/// Create the waitlist routes router.
pub fn waitlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(waitlist::join))
        .route("/count", get(waitlist::count))
}

/// Create all `/api` routes. Requires the session layers.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .nest("/waitlist", waitlist_routes())
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/user", get(auth::me))
}

/// Create the health check routes.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
}
