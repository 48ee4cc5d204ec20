//! Process-local storage.
//!
//! Each table sits behind its own `RwLock` and every operation takes its lock
//! exactly once, so id allocation and insert are atomic with respect to other
//! requests. Contents are lost when the process exits.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use lucid_core::{CartItemId, Email, ProductId, SessionKey, UserId, Username, WaitlistEntryId};

use super::{
    CartStore, CatalogStore, RepositoryError, Storage, UserStore, WaitlistStore, catalog,
};
use crate::models::{CartItem, NewUser, Product, User, WaitlistEntry};

/// Rows keyed by a sequential id. Ids start at 1 and are never reused.
#[derive(Debug)]
struct Table<T> {
    next_id: i32,
    rows: BTreeMap<i32, T>,
}

impl<T> Table<T> {
    const fn new() -> Self {
        Self {
            next_id: 1,
            rows: BTreeMap::new(),
        }
    }

    /// Allocate the next id, build the row from it and store a copy.
    fn insert_with(&mut self, build: impl FnOnce(i32) -> T) -> T
    where
        T: Clone,
    {
        let id = self.next_id;
        self.next_id += 1;
        let row = build(id);
        self.rows.insert(id, row.clone());
        row
    }
}

/// In-memory implementation of every store.
#[derive(Debug)]
pub struct MemoryStorage {
    products: Vec<Product>,
    cart_items: RwLock<Table<CartItem>>,
    users: RwLock<Table<User>>,
    waitlist: RwLock<Table<WaitlistEntry>>,
}

impl MemoryStorage {
    /// Create storage serving the given catalog. Products are never mutated.
    #[must_use]
    pub fn new(mut products: Vec<Product>) -> Self {
        products.sort_by_key(|p| p.id);
        Self {
            products,
            cart_items: RwLock::new(Table::new()),
            users: RwLock::new(Table::new()),
            waitlist: RwLock::new(Table::new()),
        }
    }

    /// Create storage serving the launch catalog.
    #[must_use]
    pub fn seeded() -> Self {
        Self::new(catalog::seed_products())
    }

    fn find_product(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::seeded()
    }
}

#[async_trait]
impl CatalogStore for MemoryStorage {
    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        Ok(self.products.clone())
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.find_product(id).cloned())
    }
}

#[async_trait]
impl CartStore for MemoryStorage {
    async fn list_cart_items(
        &self,
        session: SessionKey,
    ) -> Result<Vec<CartItem>, RepositoryError> {
        let items = self.cart_items.read().await;
        Ok(items
            .rows
            .values()
            .filter(|item| item.session == session)
            .cloned()
            .collect())
    }

    async fn add_cart_item(
        &self,
        session: SessionKey,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<CartItem, RepositoryError> {
        if self.find_product(product_id).is_none() {
            return Err(RepositoryError::NotFound(format!("product {product_id}")));
        }

        let mut items = self.cart_items.write().await;
        Ok(items.insert_with(|id| CartItem {
            id: CartItemId::new(id),
            product_id,
            quantity,
            session,
        }))
    }

    async fn update_cart_item(
        &self,
        session: SessionKey,
        id: CartItemId,
        quantity: u32,
    ) -> Result<Option<CartItem>, RepositoryError> {
        let mut items = self.cart_items.write().await;
        let Some(item) = items
            .rows
            .get_mut(&id.as_i32())
            .filter(|item| item.session == session)
        else {
            return Ok(None);
        };
        item.quantity = quantity;
        Ok(Some(item.clone()))
    }

    async fn remove_cart_item(
        &self,
        session: SessionKey,
        id: CartItemId,
    ) -> Result<(), RepositoryError> {
        let mut items = self.cart_items.write().await;
        if items
            .rows
            .get(&id.as_i32())
            .is_some_and(|item| item.session == session)
        {
            items.rows.remove(&id.as_i32());
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStorage {
    async fn create_user(&self, user: NewUser) -> Result<User, RepositoryError> {
        let mut users = self.users.write().await;
        if users.rows.values().any(|u| u.username == user.username) {
            return Err(RepositoryError::Conflict(format!(
                "username {} already exists",
                user.username
            )));
        }

        Ok(users.insert_with(|id| User {
            id: UserId::new(id),
            username: user.username,
            password_hash: user.password_hash,
            name: user.name,
            reward_balance: Decimal::ZERO,
            created_at: Utc::now(),
        }))
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.users.read().await.rows.get(&id.as_i32()).cloned())
    }

    async fn get_user_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, RepositoryError> {
        let users = self.users.read().await;
        Ok(users.rows.values().find(|u| &u.username == username).cloned())
    }
}

#[async_trait]
impl WaitlistStore for MemoryStorage {
    async fn add_waitlist_entry(
        &self,
        email: &Email,
        name: &str,
    ) -> Result<WaitlistEntry, RepositoryError> {
        let mut waitlist = self.waitlist.write().await;
        if waitlist.rows.values().any(|e| &e.email == email) {
            return Err(RepositoryError::Conflict(format!(
                "{email} is already on the waitlist"
            )));
        }

        Ok(waitlist.insert_with(|id| WaitlistEntry {
            id: WaitlistEntryId::new(id),
            email: email.clone(),
            name: name.to_owned(),
            joined_at: Utc::now(),
        }))
    }

    async fn count_waitlist_entries(&self) -> Result<u64, RepositoryError> {
        Ok(self.waitlist.read().await.rows.len() as u64)
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const P1: ProductId = ProductId::new(1);
    const P2: ProductId = ProductId::new(2);

    #[tokio::test]
    async fn test_list_cart_items_is_session_scoped() {
        let storage = MemoryStorage::seeded();
        let alice = SessionKey::generate();
        let bob = SessionKey::generate();

        storage.add_cart_item(alice, P1, 1).await.unwrap();
        storage.add_cart_item(bob, P2, 3).await.unwrap();
        storage.add_cart_item(alice, P2, 2).await.unwrap();

        let items = storage.list_cart_items(alice).await.unwrap();
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|item| item.session == alice));
        assert_eq!(items[0].product_id, P1);
        assert_eq!(items[1].product_id, P2);

        assert!(
            storage
                .list_cart_items(SessionKey::generate())
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_add_unknown_product_stores_nothing() {
        let storage = MemoryStorage::seeded();
        let session = SessionKey::generate();

        let result = storage.add_cart_item(session, ProductId::new(999), 1).await;
        assert!(matches!(result, Err(RepositoryError::NotFound(_))));
        assert!(storage.list_cart_items(session).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_repeated_adds_create_separate_items() {
        let storage = MemoryStorage::seeded();
        let session = SessionKey::generate();

        let first = storage.add_cart_item(session, P1, 1).await.unwrap();
        let second = storage.add_cart_item(session, P1, 1).await.unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(storage.list_cart_items(session).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_update_missing_item_mutates_nothing() {
        let storage = MemoryStorage::seeded();
        let session = SessionKey::generate();
        let item = storage.add_cart_item(session, P1, 2).await.unwrap();

        let missing = storage
            .update_cart_item(session, CartItemId::new(42), 5)
            .await
            .unwrap();
        assert!(missing.is_none());
        assert_eq!(storage.list_cart_items(session).await.unwrap(), vec![item]);
    }

    #[tokio::test]
    async fn test_update_foreign_item_is_not_found() {
        let storage = MemoryStorage::seeded();
        let owner = SessionKey::generate();
        let item = storage.add_cart_item(owner, P1, 2).await.unwrap();

        let other = storage
            .update_cart_item(SessionKey::generate(), item.id, 7)
            .await
            .unwrap();
        assert!(other.is_none());
        assert_eq!(storage.list_cart_items(owner).await.unwrap()[0].quantity, 2);

        let updated = storage.update_cart_item(owner, item.id, 7).await.unwrap();
        assert_eq!(updated.unwrap().quantity, 7);
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let storage = MemoryStorage::seeded();
        let session = SessionKey::generate();
        let item = storage.add_cart_item(session, P1, 1).await.unwrap();

        storage.remove_cart_item(session, item.id).await.unwrap();
        storage.remove_cart_item(session, item.id).await.unwrap();
        storage
            .remove_cart_item(session, CartItemId::new(999))
            .await
            .unwrap();
        assert!(storage.list_cart_items(session).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_ignores_foreign_item() {
        let storage = MemoryStorage::seeded();
        let owner = SessionKey::generate();
        let item = storage.add_cart_item(owner, P1, 1).await.unwrap();

        storage
            .remove_cart_item(SessionKey::generate(), item.id)
            .await
            .unwrap();
        assert_eq!(storage.list_cart_items(owner).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let storage = MemoryStorage::seeded();
        let new_user = || NewUser {
            username: Username::parse("alice").unwrap(),
            password_hash: "hash".to_owned(),
            name: "Alice".to_owned(),
        };

        let created = storage.create_user(new_user()).await.unwrap();
        assert_eq!(created.reward_balance, Decimal::ZERO);
        assert!(matches!(
            storage.create_user(new_user()).await,
            Err(RepositoryError::Conflict(_))
        ));

        let found = storage
            .get_user_by_username(&created.username)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, created.id);
        assert!(storage.get_user(UserId::new(99)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_waitlist_rejects_duplicate_email() {
        let storage = MemoryStorage::seeded();
        let email = Email::parse("ada@example.com").unwrap();

        storage.add_waitlist_entry(&email, "Ada").await.unwrap();
        let again = Email::parse("ADA@example.com").unwrap();
        assert!(matches!(
            storage.add_waitlist_entry(&again, "Ada").await,
            Err(RepositoryError::Conflict(_))
        ));
        assert_eq!(storage.count_waitlist_entries().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_catalog_lookup() {
        let storage = MemoryStorage::seeded();
        assert_eq!(storage.list_products().await.unwrap().len(), 5);
        assert_eq!(
            storage.get_product(P2).await.unwrap().unwrap().name,
            "4mg Nicotine Lozenge"
        );
        assert!(
            storage
                .get_product(ProductId::new(0))
                .await
                .unwrap()
                .is_none()
        );
    }
}
