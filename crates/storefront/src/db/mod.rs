//! Storage for the storefront.
//!
//! Every entity is owned by exactly one store, reached through the traits
//! below. Two implementations exist:
//!
//! - [`memory::MemoryStorage`] - process-local maps, lost on restart. Used by
//!   tests and local development.
//! - [`postgres::PgStorage`] - `PostgreSQL` tables. Selected with
//!   `LUCID_STORAGE=postgres`.
//!
//! Sessions for the memory backend live in [`sessions::MemorySessionStore`].
//!
//! # Tables
//!
//! - `products` - Seeded catalog (read-only at runtime)
//! - `cart_items` - Line items owned by a session key
//! - `users` - Registered accounts
//! - `waitlist` - Pre-launch signups
//! - `tower_sessions.session` - Session records (tower-sessions-sqlx-store)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p lucid-cli -- migrate
//! ```

pub mod catalog;
pub mod memory;
pub mod postgres;
pub mod sessions;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use lucid_core::{CartItemId, Email, ProductId, SessionKey, UserId, Username};

use crate::models::{CartItem, NewUser, Product, User, WaitlistEntry};

/// Errors returned by every store.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// A referenced entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Constraint violation (e.g., unique username).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// A value the store cannot represent.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Read-only product catalog.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// All products, ordered by id.
    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError>;

    /// A single product, or `None` if the id is unknown.
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;
}

/// Session-scoped cart line items.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Items owned by `session`, in the order they were added.
    async fn list_cart_items(&self, session: SessionKey)
    -> Result<Vec<CartItem>, RepositoryError>;

    /// Add a new line. Repeated adds of the same product create separate lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if `product_id` is not in the
    /// catalog; nothing is stored in that case.
    async fn add_cart_item(
        &self,
        session: SessionKey,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<CartItem, RepositoryError>;

    /// Replace the quantity of a line owned by `session`.
    ///
    /// Returns `None`, and changes nothing, if the item does not exist or
    /// belongs to another session. No lower bound is enforced here.
    async fn update_cart_item(
        &self,
        session: SessionKey,
        id: CartItemId,
        quantity: u32,
    ) -> Result<Option<CartItem>, RepositoryError>;

    /// Delete a line owned by `session`. Missing ids are a no-op.
    async fn remove_cart_item(
        &self,
        session: SessionKey,
        id: CartItemId,
    ) -> Result<(), RepositoryError>;
}

/// Registered accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username is taken.
    async fn create_user(&self, user: NewUser) -> Result<User, RepositoryError>;

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    async fn get_user_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, RepositoryError>;
}

/// Append-only waitlist.
#[async_trait]
pub trait WaitlistStore: Send + Sync {
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already signed up.
    async fn add_waitlist_entry(
        &self,
        email: &Email,
        name: &str,
    ) -> Result<WaitlistEntry, RepositoryError>;

    async fn count_waitlist_entries(&self) -> Result<u64, RepositoryError>;
}

/// The full storage capability set injected into the application state.
#[async_trait]
pub trait Storage: CatalogStore + CartStore + UserStore + WaitlistStore {
    /// Cheap liveness check used by the readiness probe.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Apply the storefront schema migrations.
///
/// # Errors
///
/// Returns `sqlx::migrate::MigrateError` if a migration fails or the applied
/// history diverges from the files on disk.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
