//! Cart views built from the cart and catalog stores.

use std::collections::HashMap;

use lucid_core::SessionKey;

use crate::db::{RepositoryError, Storage};
use crate::models::{CartLine, CartSummary};

/// Read-side cart operations.
pub struct CartService<'a> {
    storage: &'a dyn Storage,
}

impl<'a> CartService<'a> {
    #[must_use]
    pub const fn new(storage: &'a dyn Storage) -> Self {
        Self { storage }
    }

    /// The session's items, each joined with its product.
    ///
    /// Items whose product no longer resolves are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if either store fails.
    pub async fn lines(&self, session: SessionKey) -> Result<Vec<CartLine>, RepositoryError> {
        let items = self.storage.list_cart_items(session).await?;
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let products: HashMap<_, _> = self
            .storage
            .list_products()
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        Ok(items
            .into_iter()
            .filter_map(|item| {
                let Some(product) = products.get(&item.product_id) else {
                    tracing::warn!(
                        item_id = %item.id,
                        product_id = %item.product_id,
                        "Cart item references unknown product"
                    );
                    return None;
                };
                Some(CartLine {
                    product: product.clone(),
                    item,
                })
            })
            .collect())
    }

    /// Item count and subtotal for the session's cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if either store fails.
    pub async fn summary(&self, session: SessionKey) -> Result<CartSummary, RepositoryError> {
        let lines = self.lines(session).await?;
        Ok(CartSummary::from_lines(&lines))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use lucid_core::{Price, ProductId};

    use super::*;
    use crate::db::CartStore;
    use crate::db::memory::MemoryStorage;

    #[tokio::test]
    async fn test_empty_cart() {
        let storage = MemoryStorage::seeded();
        let cart = CartService::new(&storage);
        let summary = cart.summary(SessionKey::generate()).await.unwrap();
        assert_eq!(summary.item_count, 0);
        assert_eq!(summary.subtotal, Price::ZERO);
    }

    #[tokio::test]
    async fn test_lines_embed_products_and_sum() {
        let storage = MemoryStorage::seeded();
        let session = SessionKey::generate();
        storage
            .add_cart_item(session, ProductId::new(1), 2)
            .await
            .unwrap();
        storage
            .add_cart_item(session, ProductId::new(3), 1)
            .await
            .unwrap();

        let cart = CartService::new(&storage);
        let lines = cart.lines(session).await.unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].product.name, "2mg Nicotine Lozenge");
        assert_eq!(lines[0].line_total(), Price::from_cents(4998));

        let summary = cart.summary(session).await.unwrap();
        assert_eq!(summary.item_count, 3);
        assert_eq!(summary.subtotal, Price::from_cents(8997));
    }
}
