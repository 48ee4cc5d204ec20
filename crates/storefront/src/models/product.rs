//! Catalog product.

use serde::Serialize;

use lucid_core::{Price, ProductId};

/// A purchasable product. Never mutated after the catalog is seeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    /// Nicotine content per lozenge, in milligrams.
    pub strength_mg: Option<u16>,
    /// Lozenges per pack.
    pub pack_size: Option<u32>,
    /// Sold as a recurring subscription rather than a one-time purchase.
    pub is_subscription: bool,
    pub image_url: Option<String>,
}
