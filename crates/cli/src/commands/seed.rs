//! Seed the product catalog.
//!
//! Inserts the launch products with fixed ids. Existing rows are left
//! untouched, so the command can be re-run after every deploy.

use lucid_storefront::db::{catalog, postgres};

use super::{CommandError, connect};

/// Insert the launch catalog.
///
/// # Errors
///
/// Returns `CommandError` if the connection or the insert fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;
    let products = catalog::seed_products();

    let inserted = postgres::seed_catalog(&pool, &products).await?;

    tracing::info!(
        inserted,
        skipped = (products.len() as u64).saturating_sub(inserted),
        "Catalog seeded"
    );
    Ok(())
}
