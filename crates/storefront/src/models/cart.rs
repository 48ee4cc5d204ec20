//! Cart line items.

use serde::Serialize;

use lucid_core::{CartItemId, Price, ProductId, SessionKey};

use super::Product;

/// A (session, product, quantity) association.
///
/// The owning session is never serialized; clients only ever see their own
/// items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: CartItemId,
    pub product_id: ProductId,
    pub quantity: u32,
    #[serde(skip)]
    pub session: SessionKey,
}

/// A cart item joined with its product, as returned by `GET /api/cart`.
#[derive(Debug, Clone, Serialize)]
pub struct CartLine {
    #[serde(flatten)]
    pub item: CartItem,
    pub product: Product,
}

impl CartLine {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price.times(self.item.quantity)
    }
}

/// Totals shown on the cart badge and drawer footer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    /// Sum of quantities across all lines.
    pub item_count: u32,
    pub subtotal: Price,
}

impl CartSummary {
    /// Summarize a set of cart lines.
    #[must_use]
    pub fn from_lines(lines: &[CartLine]) -> Self {
        Self {
            item_count: lines.iter().map(|line| line.item.quantity).sum(),
            subtotal: lines.iter().map(CartLine::line_total).sum(),
        }
    }
}
