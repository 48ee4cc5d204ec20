//! `PostgreSQL` storage.
//!
//! Queries are checked at runtime and decoded through `FromRow` row types,
//! then converted into domain models. Values that fail domain validation on
//! the way out are reported as `RepositoryError::DataCorruption`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use lucid_core::{
    CartItemId, Email, Price, ProductId, SessionKey, UserId, Username, WaitlistEntryId,
};

use super::{CartStore, CatalogStore, RepositoryError, Storage, UserStore, WaitlistStore};
use crate::models::{CartItem, NewUser, Product, User, WaitlistEntry};

// =============================================================================
// Rows
// =============================================================================

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    description: String,
    price: Decimal,
    strength_mg: Option<i16>,
    pack_size: Option<i32>,
    is_subscription: bool,
    image_url: Option<String>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let strength_mg = row
            .strength_mg
            .map(u16::try_from)
            .transpose()
            .map_err(|_| corrupt("products.strength_mg", row.id))?;
        let pack_size = row
            .pack_size
            .map(u32::try_from)
            .transpose()
            .map_err(|_| corrupt("products.pack_size", row.id))?;

        Ok(Self {
            id: ProductId::new(row.id),
            name: row.name,
            description: row.description,
            price: Price::new(row.price),
            strength_mg,
            pack_size,
            is_subscription: row.is_subscription,
            image_url: row.image_url,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CartItemRow {
    id: i32,
    session_key: Uuid,
    product_id: i32,
    quantity: i32,
}

impl TryFrom<CartItemRow> for CartItem {
    type Error = RepositoryError;

    fn try_from(row: CartItemRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: CartItemId::new(row.id),
            product_id: ProductId::new(row.product_id),
            quantity: u32::try_from(row.quantity)
                .map_err(|_| corrupt("cart_items.quantity", row.id))?,
            session: SessionKey::from_uuid(row.session_key),
        })
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i32,
    username: String,
    password_hash: String,
    name: String,
    reward_balance: Decimal,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let username = Username::parse(&row.username).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid username in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            username,
            password_hash: row.password_hash,
            name: row.name,
            reward_balance: row.reward_balance,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct WaitlistRow {
    id: i32,
    email: String,
    name: String,
    joined_at: DateTime<Utc>,
}

impl TryFrom<WaitlistRow> for WaitlistEntry {
    type Error = RepositoryError;

    fn try_from(row: WaitlistRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: WaitlistEntryId::new(row.id),
            email,
            name: row.name,
            joined_at: row.joined_at,
        })
    }
}

fn corrupt(column: &str, id: i32) -> RepositoryError {
    RepositoryError::DataCorruption(format!("{column} out of range for row {id}"))
}

fn quantity_param(quantity: u32) -> Result<i32, RepositoryError> {
    i32::try_from(quantity)
        .map_err(|_| RepositoryError::InvalidInput(format!("quantity {quantity} out of range")))
}

// =============================================================================
// Storage
// =============================================================================

const PRODUCT_COLUMNS: &str =
    "id, name, description, price, strength_mg, pack_size, is_subscription, image_url";

/// Storage backed by the `storefront` schema.
#[derive(Debug, Clone)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    /// Wrap an existing pool. Migrations must already have run.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool, shared with the session store.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl CatalogStore for PgStorage {
    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM storefront.products ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM storefront.products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }
}

#[async_trait]
impl CartStore for PgStorage {
    async fn list_cart_items(
        &self,
        session: SessionKey,
    ) -> Result<Vec<CartItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartItemRow>(
            r"
            SELECT id, session_key, product_id, quantity
            FROM storefront.cart_items
            WHERE session_key = $1
            ORDER BY id
            ",
        )
        .bind(session.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(CartItem::try_from).collect()
    }

    async fn add_cart_item(
        &self,
        session: SessionKey,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<CartItem, RepositoryError> {
        let row = sqlx::query_as::<_, CartItemRow>(
            r"
            INSERT INTO storefront.cart_items (session_key, product_id, quantity)
            VALUES ($1, $2, $3)
            RETURNING id, session_key, product_id, quantity
            ",
        )
        .bind(session.as_uuid())
        .bind(product_id)
        .bind(quantity_param(quantity)?)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::NotFound(format!("product {product_id}"));
            }
            RepositoryError::Database(e)
        })?;

        CartItem::try_from(row)
    }

    async fn update_cart_item(
        &self,
        session: SessionKey,
        id: CartItemId,
        quantity: u32,
    ) -> Result<Option<CartItem>, RepositoryError> {
        let row = sqlx::query_as::<_, CartItemRow>(
            r"
            UPDATE storefront.cart_items
            SET quantity = $3
            WHERE id = $1 AND session_key = $2
            RETURNING id, session_key, product_id, quantity
            ",
        )
        .bind(id)
        .bind(session.as_uuid())
        .bind(quantity_param(quantity)?)
        .fetch_optional(&self.pool)
        .await?;

        row.map(CartItem::try_from).transpose()
    }

    async fn remove_cart_item(
        &self,
        session: SessionKey,
        id: CartItemId,
    ) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM storefront.cart_items WHERE id = $1 AND session_key = $2")
            .bind(id)
            .bind(session.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for PgStorage {
    async fn create_user(&self, user: NewUser) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO storefront.users (username, password_hash, name)
            VALUES ($1, $2, $3)
            RETURNING id, username, password_hash, name, reward_balance, created_at
            ",
        )
        .bind(user.username.as_str())
        .bind(&user.password_hash)
        .bind(&user.name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("username already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        User::try_from(row)
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, username, password_hash, name, reward_balance, created_at
            FROM storefront.users
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn get_user_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, username, password_hash, name, reward_balance, created_at
            FROM storefront.users
            WHERE username = $1
            ",
        )
        .bind(username.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }
}

#[async_trait]
impl WaitlistStore for PgStorage {
    async fn add_waitlist_entry(
        &self,
        email: &Email,
        name: &str,
    ) -> Result<WaitlistEntry, RepositoryError> {
        let row = sqlx::query_as::<_, WaitlistRow>(
            r"
            INSERT INTO storefront.waitlist (email, name)
            VALUES ($1, $2)
            RETURNING id, email, name, joined_at
            ",
        )
        .bind(email)
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email already on waitlist".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        WaitlistEntry::try_from(row)
    }

    async fn count_waitlist_entries(&self) -> Result<u64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM storefront.waitlist")
            .fetch_one(&self.pool)
            .await?;

        u64::try_from(count)
            .map_err(|_| RepositoryError::DataCorruption(format!("negative count {count}")))
    }
}

#[async_trait]
impl Storage for PgStorage {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Insert catalog products, keeping any that already exist.
///
/// Returns the number of rows inserted. Safe to run repeatedly. The id
/// sequence is moved past the highest seeded id afterwards.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if any statement fails; the whole seed
/// is rolled back in that case.
pub async fn seed_catalog(pool: &PgPool, products: &[Product]) -> Result<u64, RepositoryError> {
    let mut tx = pool.begin().await?;
    let mut inserted = 0;

    for product in products {
        let strength_mg = product
            .strength_mg
            .map(i16::try_from)
            .transpose()
            .map_err(|_| corrupt("products.strength_mg", product.id.as_i32()))?;
        let pack_size = product
            .pack_size
            .map(i32::try_from)
            .transpose()
            .map_err(|_| corrupt("products.pack_size", product.id.as_i32()))?;

        let result = sqlx::query(
            r"
            INSERT INTO storefront.products
                (id, name, description, price, strength_mg, pack_size, is_subscription, image_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO NOTHING
            ",
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price.amount())
        .bind(strength_mg)
        .bind(pack_size)
        .bind(product.is_subscription)
        .bind(product.image_url.as_deref())
        .execute(&mut *tx)
        .await?;

        inserted += result.rows_affected();
    }

    sqlx::query(
        r"
        SELECT setval(
            pg_get_serial_sequence('storefront.products', 'id'),
            GREATEST((SELECT MAX(id) FROM storefront.products), 1)
        )
        ",
    )
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(inserted)
}
