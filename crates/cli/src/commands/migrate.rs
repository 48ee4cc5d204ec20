//! Database migration command.
//!
//! # Environment Variables
//!
//! - `LUCID_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! # Migration Files
//!
//! Storefront migrations live in `crates/storefront/migrations/`. The session
//! table is created by tower-sessions-sqlx-store.

use tower_sessions_sqlx_store::PostgresStore;

use lucid_storefront::db;

use super::{CommandError, connect};

/// Run storefront migrations, then the session store migration.
///
/// # Errors
///
/// Returns `CommandError` if the connection or any migration fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running storefront migrations...");
    db::run_migrations(&pool).await?;

    tracing::info!("Running session store migration...");
    PostgresStore::new(pool).migrate().await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
