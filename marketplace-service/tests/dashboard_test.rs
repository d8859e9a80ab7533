mod common;

use common::spawn_app;
use serde_json::{json, Value};

#[tokio::test]
async fn dashboards_reflect_orders_and_catalog() {
    let app = spawn_app().await;
    app.register_admin("metrics-admin@example.com").await;
    app.register_customer("metrics-buyer@example.com").await;
    app.register_seller("Metrics Store", "metrics-seller@example.com").await;

    let admin = app.login("metrics-admin@example.com").await;
    let customer = app.login("metrics-buyer@example.com").await;
    let seller = app.login("metrics-seller@example.com").await;
    let seller_id = app.account_id(&seller).await;
    let shipping_id = app.create_shipping_address(&customer).await;

    let response = admin
        .post(app.url("/categories"))
        .json(&json!({ "name": "Metrics" }))
        .send()
        .await
        .expect("Failed to execute request");
    let body: Value = response.json().await.expect("Failed to parse response");
    let category_id = body["category"]["_id"].as_str().unwrap().to_string();

    let form = reqwest::multipart::Form::new()
        .text("name", "Counted Product")
        .text("quantity", "1")
        .text("price", "42.0")
        .text("category_id", category_id);
    let response = seller
        .post(app.url("/products"))
        .multipart(form)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 201);

    let response = customer
        .post(app.url("/orders"))
        .json(&json!({
            "shipping_id": shipping_id,
            "total": 42.0,
            "payment_method": "cod",
            "items": [{
                "product_id": uuid::Uuid::new_v4(),
                "product_name": "Counted Product",
                "quantity": 1,
                "price": 42.0,
                "seller_id": seller_id,
            }],
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 201);

    let body: Value = admin
        .get(app.url("/dashboard/admin"))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(body["product_count"], 1);
    assert_eq!(body["customer_count"], 1);
    assert_eq!(body["pending_orders"], 1);

    let body: Value = seller
        .get(app.url("/dashboard/seller"))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(body["product_count"], 1);
    assert_eq!(body["pending_orders"], 1);

    let response = customer
        .get(app.url("/dashboard/admin"))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 403);

    app.cleanup().await;
}
