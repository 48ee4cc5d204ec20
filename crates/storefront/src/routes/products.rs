//! Catalog route handlers.

use axum::extract::State;
use tracing::instrument;

use lucid_core::ProductId;

use crate::error::{AppError, Result};
use crate::extract::{Json, Path};
use crate::models::Product;
use crate::state::AppState;

/// List every product, in id order.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = state.storage().list_products().await?;
    Ok(Json(products))
}

/// Show a single product.
///
/// Ids that are not integers cannot name a product, so they are 404s like
/// any other unknown id.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>> {
    let product = match id.parse::<ProductId>() {
        Ok(id) => state.storage().get_product(id).await?,
        Err(_) => None,
    };

    product
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))
}
