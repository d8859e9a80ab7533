mod common;

use common::{spawn_app, TEST_PASSWORD};
use serde_json::{json, Value};

#[tokio::test]
async fn login_sets_session_cookie_and_me_resolves_account() {
    let app = spawn_app().await;
    app.register_customer("alice@example.com").await;

    let client = app.client();
    let response = client
        .post(app.url("/auth/login"))
        .json(&json!({ "email": "alice@example.com", "password": TEST_PASSWORD }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 200);
    let cookie_value = {
        let cookie = response
            .cookies()
            .find(|c| c.name() == "token")
            .expect("No session cookie set");
        assert!(cookie.http_only());
        cookie.value().to_string()
    };

    let body: Value = response.json().await.expect("Failed to parse response");
    let token = body["token"].as_str().expect("No token in login body");
    assert_eq!(token, cookie_value);

    let body: Value = client
        .get(app.url("/auth/me"))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(body["account"]["email"], "alice@example.com");
    assert_eq!(body["account"]["role"], "customer");

    app.cleanup().await;
}

#[tokio::test]
async fn login_with_wrong_password_is_rejected() {
    let app = spawn_app().await;
    app.register_customer("bob@example.com").await;

    let response = app
        .client()
        .post(app.url("/auth/login"))
        .json(&json!({ "email": "bob@example.com", "password": "not the password" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 401);

    app.cleanup().await;
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let app = spawn_app().await;
    app.register_customer("carol@example.com").await;

    let response = app
        .client()
        .post(app.url("/auth/register/customer"))
        .json(&json!({
            "first_name": "Carol",
            "last_name": "Again",
            "email": "carol@example.com",
            "password": TEST_PASSWORD,
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 409);

    app.cleanup().await;
}

#[tokio::test]
async fn seller_login_routes_to_seller_collection() {
    let app = spawn_app().await;
    app.register_seller("Test Store", "store@example.com").await;

    let client = app.login("store@example.com").await;
    let body: Value = client
        .get(app.url("/auth/me"))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse response");

    assert_eq!(body["account"]["store_name"], "Test Store");
    assert_eq!(body["account"]["role"], "seller");

    app.cleanup().await;
}

#[tokio::test]
async fn protected_route_requires_session() {
    let app = spawn_app().await;

    let response = app
        .client()
        .get(app.url("/users/profile"))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 401);

    app.cleanup().await;
}

#[tokio::test]
async fn role_guard_rejects_wrong_role() {
    let app = spawn_app().await;
    app.register_customer("dave@example.com").await;
    let client = app.login("dave@example.com").await;

    // A customer session cannot reach the admin user list.
    let response = client
        .get(app.url("/users"))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 403);

    app.cleanup().await;
}
