//! Registration, login and logout tests.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use serde_json::json;

use lucid_integration_tests::TestContext;

#[tokio::test]
async fn test_register_login_logout_flow() {
    let ctx = TestContext::new().await;

    let register = ctx
        .post_json(
            "/api/register",
            &json!({ "username": "alice", "password": "secret1", "name": "Alice" }),
        )
        .await;
    assert_eq!(register.status(), 201);
    let user: serde_json::Value = register.json().await.unwrap();
    assert_eq!(user["username"], "alice");
    assert!(user.get("passwordHash").is_none());
    assert!(user.get("password_hash").is_none());

    // Registration does not log in
    let (status, _) = ctx.get_json("/api/user").await;
    assert_eq!(status, 401);

    let wrong = ctx
        .post_json(
            "/api/login",
            &json!({ "username": "alice", "password": "wrong-password" }),
        )
        .await;
    assert_eq!(wrong.status(), 401);

    let (status, body) = ctx.get_json("/api/user").await;
    assert_eq!(status, 401);
    assert_eq!(body["error"], "Not logged in");

    let login = ctx
        .post_json(
            "/api/login",
            &json!({ "username": "alice", "password": "secret1" }),
        )
        .await;
    assert_eq!(login.status(), 200);

    let (status, me) = ctx.get_json("/api/user").await;
    assert_eq!(status, 200);
    assert_eq!(me["username"], "alice");
    assert_eq!(me["name"], "Alice");

    let logout = ctx
        .client
        .post(ctx.url("/api/logout"))
        .send()
        .await
        .unwrap();
    assert_eq!(logout.status(), 204);

    let (status, _) = ctx.get_json("/api/user").await;
    assert_eq!(status, 401);
}

#[tokio::test]
async fn test_duplicate_username_is_409() {
    let ctx = TestContext::new().await;
    let body = json!({ "username": "bob", "password": "secret1", "name": "Bob" });

    assert_eq!(ctx.post_json("/api/register", &body).await.status(), 201);
    assert_eq!(ctx.post_json("/api/register", &body).await.status(), 409);
}

#[tokio::test]
async fn test_short_password_is_400() {
    let ctx = TestContext::new().await;

    let resp = ctx
        .post_json(
            "/api/register",
            &json!({ "username": "carol", "password": "123", "name": "Carol" }),
        )
        .await;
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_unknown_user_login_is_401() {
    let ctx = TestContext::new().await;

    let resp = ctx
        .post_json(
            "/api/login",
            &json!({ "username": "nobody", "password": "secret1" }),
        )
        .await;
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_cart_survives_login() {
    let ctx = TestContext::new().await;
    ctx.establish_session().await;

    ctx.post_json("/api/cart", &json!({ "productId": 2 })).await;
    ctx.login_as("dana").await;

    let (status, cart) = ctx.get_json("/api/cart").await;
    assert_eq!(status, 200);
    assert_eq!(cart.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_cart_survives_logout() {
    let ctx = TestContext::new().await;
    ctx.establish_session().await;

    let added = ctx.post_json("/api/cart", &json!({ "productId": 3 })).await;
    assert_eq!(added.status(), 201);
    ctx.login_as("erin").await;

    let logout = ctx
        .client
        .post(ctx.url("/api/logout"))
        .send()
        .await
        .unwrap();
    assert_eq!(logout.status(), 204);

    let (status, _) = ctx.get_json("/api/user").await;
    assert_eq!(status, 401);

    let (status, cart) = ctx.get_json("/api/cart").await;
    assert_eq!(status, 200);
    let lines = cart.as_array().unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["productId"], 3);
}
