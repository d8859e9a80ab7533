mod common;

use common::spawn_app;
use serde_json::{json, Value};

async fn create_category(app: &common::TestApp, admin: &reqwest::Client, name: &str) -> String {
    let response = admin
        .post(app.url("/categories"))
        .json(&json!({ "name": name, "description": "test category" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    body["category"]["_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn category_crud_round_trip() {
    let app = spawn_app().await;
    app.register_admin("admin@example.com").await;
    let admin = app.login("admin@example.com").await;

    let id = create_category(&app, &admin, "Electronics").await;

    // Duplicate names conflict, case-insensitively.
    let response = admin
        .post(app.url("/categories"))
        .json(&json!({ "name": "electronics" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 409);

    let response = admin
        .put(app.url(&format!("/categories/{}", id)))
        .json(&json!({ "name": "Home Electronics" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 200);

    // Public reads need no session.
    let body: Value = app
        .client()
        .get(app.url(&format!("/categories/{}", id)))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(body["category"]["name"], "Home Electronics");

    let body: Value = app
        .client()
        .get(app.url("/categories/search?query=home"))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(body["categories"].as_array().map(Vec::len), Some(1));

    app.cleanup().await;
}

#[tokio::test]
async fn deleting_a_category_leaves_product_references_dangling() {
    let app = spawn_app().await;
    app.register_admin("admin2@example.com").await;
    app.register_seller("Store", "seller2@example.com").await;
    let admin = app.login("admin2@example.com").await;
    let seller = app.login("seller2@example.com").await;

    let category_id = create_category(&app, &admin, "Doomed").await;

    let form = reqwest::multipart::Form::new()
        .text("name", "Orphan Product")
        .text("description", "loses its category")
        .text("quantity", "3")
        .text("price", "25.0")
        .text("category_id", category_id.clone());
    let response = seller
        .post(app.url("/products"))
        .multipart(form)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let product_id = body["product"]["_id"].as_str().unwrap().to_string();

    // The delete succeeds with no referential check.
    let response = admin
        .delete(app.url(&format!("/categories/{}", category_id)))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 200);

    let response = app
        .client()
        .get(app.url(&format!("/categories/{}", category_id)))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 404);

    // The product survives, still pointing at the deleted category.
    let body: Value = app
        .client()
        .get(app.url(&format!("/products/view/{}", product_id)))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(body["product"]["category_id"], category_id.as_str());

    app.cleanup().await;
}

#[tokio::test]
async fn category_writes_require_admin() {
    let app = spawn_app().await;
    app.register_customer("user@example.com").await;
    let customer = app.login("user@example.com").await;

    let response = customer
        .post(app.url("/categories"))
        .json(&json!({ "name": "Not Allowed" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 403);

    app.cleanup().await;
}
