//! Cart route handlers.
//!
//! Every handler is scoped to the cart owner carried in the session. Requests
//! that arrive before a session exists are rejected with 401; the response
//! still carries the new session cookie.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use lucid_core::{CartItemId, ProductId, lenient_id};

use crate::db::RepositoryError;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::extract::{Json, Path};
use crate::middleware::CartSession;
use crate::models::{CartItem, CartLine, CartSummary};
use crate::services::CartService;
use crate::state::AppState;
use crate::validation;

/// Add-to-cart body. `productId` may be a number or a numeric string.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    #[serde(deserialize_with = "lenient_id")]
    pub product_id: ProductId,
    pub quantity: Option<u32>,
}

/// Quantity update body.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: u32,
}

/// List the session's cart items with their products.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    CartSession(session): CartSession,
) -> Result<Json<Vec<CartLine>>> {
    let lines = CartService::new(state.storage()).lines(session).await?;
    Ok(Json(lines))
}

/// Item count and subtotal for the badge and drawer footer.
#[instrument(skip(state))]
pub async fn summary(
    State(state): State<AppState>,
    CartSession(session): CartSession,
) -> Result<Json<CartSummary>> {
    let summary = CartService::new(state.storage()).summary(session).await?;
    Ok(Json(summary))
}

/// Add a product to the cart. Each call creates a new line.
#[instrument(skip(state))]
pub async fn add(
    State(state): State<AppState>,
    CartSession(session): CartSession,
    Json(body): Json<AddToCartRequest>,
) -> Result<(StatusCode, Json<CartItem>)> {
    let quantity = validation::add_quantity(body.quantity.unwrap_or(1))
        .map_err(AppError::BadRequest)?;

    let item = state
        .storage()
        .add_cart_item(session, body.product_id, quantity)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound(_) => AppError::NotFound("Product not found".to_owned()),
            other => AppError::Database(other),
        })?;

    let product_id = body.product_id.to_string();
    add_breadcrumb("cart", "Added to cart", Some(&[("product_id", &product_id)]));

    Ok((StatusCode::CREATED, Json(item)))
}

/// Replace a line's quantity. Zero removes the line and returns 204.
#[instrument(skip(state))]
pub async fn update(
    State(state): State<AppState>,
    CartSession(session): CartSession,
    Path(id): Path<String>,
    Json(body): Json<UpdateQuantityRequest>,
) -> Result<Response> {
    let quantity = validation::update_quantity(body.quantity).map_err(AppError::BadRequest)?;

    if quantity == 0 {
        if let Ok(id) = id.parse::<CartItemId>() {
            state.storage().remove_cart_item(session, id).await?;
        }
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let not_found = || AppError::NotFound("Cart item not found".to_owned());
    let id = id.parse::<CartItemId>().map_err(|_| not_found())?;

    let item = state
        .storage()
        .update_cart_item(session, id, quantity)
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(item).into_response())
}

/// Remove a line. Unknown ids are not an error.
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    CartSession(session): CartSession,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    if let Ok(id) = id.parse::<CartItemId>() {
        state.storage().remove_cart_item(session, id).await?;
    }
    Ok(StatusCode::NO_CONTENT)
}
