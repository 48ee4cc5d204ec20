//! Storage tests against a real `PostgreSQL` database.
//!
//! Ignored by default. Set `LUCID_TEST_DATABASE_URL` and run with
//! `--include-ignored`. The database is migrated and seeded in place.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use secrecy::SecretString;
use sqlx::PgPool;

use lucid_core::{CartItemId, Email, ProductId, SessionKey, Username};
use lucid_storefront::db::catalog::seed_products;
use lucid_storefront::db::postgres::{PgStorage, seed_catalog};
use lucid_storefront::db::{
    self, CartStore, CatalogStore, RepositoryError, UserStore, WaitlistStore,
};
use lucid_storefront::models::NewUser;

async fn storage() -> PgStorage {
    let url = std::env::var("LUCID_TEST_DATABASE_URL")
        .expect("LUCID_TEST_DATABASE_URL must be set for postgres tests");
    let pool: PgPool = db::create_pool(&SecretString::from(url))
        .await
        .expect("Failed to connect");
    db::run_migrations(&pool).await.expect("Failed to migrate");
    seed_catalog(&pool, &seed_products())
        .await
        .expect("Failed to seed");
    PgStorage::new(pool)
}

/// Unique suffix so repeated runs don't collide on unique columns.
fn unique() -> String {
    SessionKey::generate().to_string()[..8].to_owned()
}

#[tokio::test]
#[ignore = "requires LUCID_TEST_DATABASE_URL"]
async fn test_seeded_catalog() {
    let store = storage().await;

    let products = store.list_products().await.unwrap();
    assert!(products.len() >= 5);
    assert!(store.get_product(ProductId::new(1)).await.unwrap().is_some());
    assert!(store.get_product(ProductId::new(999)).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires LUCID_TEST_DATABASE_URL"]
async fn test_reseeding_skips_existing_rows() {
    let store = storage().await;

    let inserted = seed_catalog(store.pool(), &seed_products()).await.unwrap();
    assert_eq!(inserted, 0);
}

#[tokio::test]
#[ignore = "requires LUCID_TEST_DATABASE_URL"]
async fn test_cart_is_session_scoped() {
    let store = storage().await;
    let mine = SessionKey::generate();
    let theirs = SessionKey::generate();

    let item = store
        .add_cart_item(mine, ProductId::new(1), 2)
        .await
        .unwrap();
    assert_eq!(item.quantity, 2);

    assert!(store.list_cart_items(theirs).await.unwrap().is_empty());
    assert!(
        store
            .update_cart_item(theirs, item.id, 5)
            .await
            .unwrap()
            .is_none()
    );

    let updated = store
        .update_cart_item(mine, item.id, 4)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.quantity, 4);

    store.remove_cart_item(mine, item.id).await.unwrap();
    store.remove_cart_item(mine, item.id).await.unwrap();
    store
        .remove_cart_item(mine, CartItemId::new(i32::MAX))
        .await
        .unwrap();
    assert!(store.list_cart_items(mine).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires LUCID_TEST_DATABASE_URL"]
async fn test_cart_rejects_unknown_product() {
    let store = storage().await;

    let err = store
        .add_cart_item(SessionKey::generate(), ProductId::new(99_999), 1)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound(_)));
}

#[tokio::test]
#[ignore = "requires LUCID_TEST_DATABASE_URL"]
async fn test_duplicate_username_conflicts() {
    let store = storage().await;
    let username = Username::parse(&format!("pg_{}", unique())).unwrap();
    let new_user = || NewUser {
        username: username.clone(),
        password_hash: "not-a-real-hash".to_owned(),
        name: "Postgres User".to_owned(),
    };

    let user = store.create_user(new_user()).await.unwrap();
    let found = store
        .get_user_by_username(&username)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, user.id);

    let err = store.create_user(new_user()).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));
}

#[tokio::test]
#[ignore = "requires LUCID_TEST_DATABASE_URL"]
async fn test_waitlist_duplicate_conflicts() {
    let store = storage().await;
    let email = Email::parse(&format!("pg-{}@example.com", unique())).unwrap();
    let before = store.count_waitlist_entries().await.unwrap();

    store.add_waitlist_entry(&email, "Someone").await.unwrap();
    let err = store
        .add_waitlist_entry(&email, "Someone")
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));

    assert_eq!(store.count_waitlist_entries().await.unwrap(), before + 1);
}
