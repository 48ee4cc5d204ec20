//! Integration tests for the Lucid storefront.
//!
//! # Running Tests
//!
//! ```bash
//! # In-memory tests (no external services)
//! cargo test -p lucid-integration-tests
//!
//! # Include the PostgreSQL tests
//! LUCID_TEST_DATABASE_URL=postgres://localhost/lucid_test \
//!     cargo test -p lucid-integration-tests -- --include-ignored
//! ```
//!
//! # Test Categories
//!
//! - `catalog` - Product listing and lookup
//! - `cart` - Session-scoped cart flows
//! - `auth` - Registration, login, logout
//! - `waitlist` - Signups and count
//! - `postgres_storage` - Store behavior against a real database

use std::net::SocketAddr;
use std::sync::Arc;

use reqwest::{Client, Response};
use serde_json::Value;
use tokio::net::TcpListener;

use lucid_storefront::app;
use lucid_storefront::config::StorefrontConfig;
use lucid_storefront::db::memory::MemoryStorage;
use lucid_storefront::db::sessions::MemorySessionStore;
use lucid_storefront::state::AppState;

/// A storefront served on an ephemeral port with fresh in-memory storage.
///
/// The client keeps cookies, so it behaves like a single browser.
pub struct TestContext {
    pub client: Client,
    pub addr: SocketAddr,
}

impl TestContext {
    /// Start a new isolated server.
    ///
    /// # Panics
    ///
    /// Panics if the server cannot be started.
    pub async fn new() -> Self {
        let state = AppState::new(
            StorefrontConfig::default(),
            Arc::new(MemoryStorage::seeded()),
        );
        let router =
            app::build(state, MemorySessionStore::default()).expect("Failed to build router");

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local address");

        tokio::spawn(async move {
            axum::serve(listener, router)
                .await
                .expect("Test server failed");
        });

        Self {
            client: new_client(),
            addr,
        }
    }

    /// Absolute URL for `path` on the test server.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// A second browser talking to the same server.
    #[must_use]
    pub fn other_browser(&self) -> Self {
        Self {
            client: new_client(),
            addr: self.addr,
        }
    }

    /// Make any request so the server issues a session cookie.
    ///
    /// # Panics
    ///
    /// Panics if the request fails.
    pub async fn establish_session(&self) {
        self.client
            .get(self.url("/api/cart"))
            .send()
            .await
            .expect("Failed to establish session");
    }

    /// Register and log in as `username` with password `secret1`.
    ///
    /// # Panics
    ///
    /// Panics if either request does not succeed.
    pub async fn login_as(&self, username: &str) -> Value {
        let register = self
            .post_json(
                "/api/register",
                &serde_json::json!({ "username": username, "password": "secret1", "name": "Test User" }),
            )
            .await;
        assert_eq!(register.status(), 201);

        let login = self
            .post_json(
                "/api/login",
                &serde_json::json!({ "username": username, "password": "secret1" }),
            )
            .await;
        assert_eq!(login.status(), 200);
        login.json().await.expect("Login body was not JSON")
    }

    /// POST a JSON body.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn post_json(&self, path: &str, body: &Value) -> Response {
        self.client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Request failed")
    }

    /// GET a path and decode the JSON body.
    ///
    /// # Panics
    ///
    /// Panics if the request fails or the body is not JSON.
    pub async fn get_json(&self, path: &str) -> (u16, Value) {
        let resp = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Request failed");
        let status = resp.status().as_u16();
        let body = resp.json().await.expect("Response body was not JSON");
        (status, body)
    }
}

fn new_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}
