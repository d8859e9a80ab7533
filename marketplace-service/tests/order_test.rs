mod common;

use common::spawn_app;
use serde_json::{json, Value};

#[tokio::test]
async fn cod_order_is_created_pending_and_clears_the_cart() {
    let app = spawn_app().await;
    app.register_customer("buyer@example.com").await;
    app.register_seller("Store", "seller@example.com").await;

    let customer = app.login("buyer@example.com").await;
    let seller = app.login("seller@example.com").await;
    let seller_id = app.account_id(&seller).await;
    let shipping_id = app.create_shipping_address(&customer).await;

    // Put something in the cart first so we can observe it being cleared.
    let response = customer
        .put(app.url("/cart"))
        .json(&json!({ "items": [{
            "product_id": uuid::Uuid::new_v4(),
            "product_name": "Widget",
            "quantity": 2,
            "price_at_addition": 19.5,
            "seller_id": seller_id,
        }]}))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 200);

    let response = customer
        .post(app.url("/orders"))
        .json(&json!({
            "shipping_id": shipping_id,
            "total": 39.0,
            "payment_method": "cod",
            "items": [{
                "product_id": uuid::Uuid::new_v4(),
                "product_name": "Widget",
                "quantity": 2,
                "price": 19.5,
                "seller_id": seller_id,
            }],
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    let order = &body["order"];
    assert_eq!(order["status"], "Pending");
    assert_eq!(order["payment"]["status"], "pending");
    assert_eq!(order["payment"]["method"], "cod");
    // The total is stored exactly as the client sent it.
    assert_eq!(order["total"], 39.0);

    let cart: Value = customer
        .get(app.url("/cart"))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(cart["items"].as_array().map(Vec::len), Some(0));

    app.cleanup().await;
}

#[tokio::test]
async fn seller_item_status_update_touches_only_that_item() {
    let app = spawn_app().await;
    app.register_customer("buyer2@example.com").await;
    app.register_seller("Store A", "seller-a@example.com").await;
    app.register_seller("Store B", "seller-b@example.com").await;

    let customer = app.login("buyer2@example.com").await;
    let seller_a = app.login("seller-a@example.com").await;
    let seller_b = app.login("seller-b@example.com").await;
    let seller_a_id = app.account_id(&seller_a).await;
    let seller_b_id = app.account_id(&seller_b).await;
    let shipping_id = app.create_shipping_address(&customer).await;

    let body: Value = customer
        .post(app.url("/orders"))
        .json(&json!({
            "shipping_id": shipping_id,
            "total": 30.0,
            "payment_method": "cod",
            "items": [
                {
                    "product_id": uuid::Uuid::new_v4(),
                    "product_name": "From A",
                    "quantity": 1,
                    "price": 10.0,
                    "seller_id": seller_a_id,
                },
                {
                    "product_id": uuid::Uuid::new_v4(),
                    "product_name": "From B",
                    "quantity": 1,
                    "price": 20.0,
                    "seller_id": seller_b_id,
                },
            ],
        }))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse response");
    let order_id = body["order"]["_id"].as_str().unwrap().to_string();
    let item_a_id = body["order"]["items"][0]["_id"].as_str().unwrap().to_string();

    let response = seller_a
        .put(app.url("/orders/seller/item-status"))
        .json(&json!({ "order_id": order_id, "item_id": item_a_id, "status": "Shipped" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 200);

    let body: Value = customer
        .get(&app.url(&format!("/orders/user/{}", order_id)))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse response");
    let order = &body["order"];
    assert_eq!(order["items"][0]["seller_status"], "Shipped");
    assert_eq!(order["items"][1]["seller_status"], "Pending");
    // The order-level status is not touched by item updates.
    assert_eq!(order["status"], "Pending");

    // Seller B cannot move A's item.
    let response = seller_b
        .put(app.url("/orders/seller/item-status"))
        .json(&json!({ "order_id": order_id, "item_id": item_a_id, "status": "Delivered" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 404);

    app.cleanup().await;
}

#[tokio::test]
async fn item_status_transitions_are_unguarded() {
    let app = spawn_app().await;
    app.register_customer("buyer3@example.com").await;
    app.register_seller("Store", "seller3@example.com").await;

    let customer = app.login("buyer3@example.com").await;
    let seller = app.login("seller3@example.com").await;
    let seller_id = app.account_id(&seller).await;
    let shipping_id = app.create_shipping_address(&customer).await;

    let body: Value = customer
        .post(app.url("/orders"))
        .json(&json!({
            "shipping_id": shipping_id,
            "total": 10.0,
            "payment_method": "cod",
            "items": [{
                "product_id": uuid::Uuid::new_v4(),
                "product_name": "Thing",
                "quantity": 1,
                "price": 10.0,
                "seller_id": seller_id,
            }],
        }))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse response");
    let order_id = body["order"]["_id"].as_str().unwrap().to_string();
    let item_id = body["order"]["items"][0]["_id"].as_str().unwrap().to_string();

    // Delivered first, then back to Pending; both are accepted.
    for status in ["Delivered", "Pending"] {
        let response = seller
            .put(app.url("/orders/seller/item-status"))
            .json(&json!({ "order_id": order_id, "item_id": item_id, "status": status }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status().as_u16(), 200, "transition to {status}");
    }

    app.cleanup().await;
}

#[tokio::test]
async fn soft_deleted_orders_disappear_from_reads() {
    let app = spawn_app().await;
    app.register_customer("buyer4@example.com").await;
    app.register_seller("Store", "seller4@example.com").await;
    app.register_admin("admin4@example.com").await;

    let customer = app.login("buyer4@example.com").await;
    let seller = app.login("seller4@example.com").await;
    let admin = app.login("admin4@example.com").await;
    let seller_id = app.account_id(&seller).await;
    let shipping_id = app.create_shipping_address(&customer).await;

    let body: Value = customer
        .post(app.url("/orders"))
        .json(&json!({
            "shipping_id": shipping_id,
            "total": 10.0,
            "payment_method": "cod",
            "items": [{
                "product_id": uuid::Uuid::new_v4(),
                "product_name": "Thing",
                "quantity": 1,
                "price": 10.0,
                "seller_id": seller_id,
            }],
        }))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse response");
    let order_id = body["order"]["_id"].as_str().unwrap().to_string();

    let response = admin
        .delete(app.url(&format!("/orders/{}", order_id)))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 200);

    let body: Value = customer
        .get(app.url("/orders/user"))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(body["orders"].as_array().map(Vec::len), Some(0));

    let response = customer
        .get(app.url(&format!("/orders/user/{}", order_id)))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 404);

    app.cleanup().await;
}

#[tokio::test]
async fn customer_can_cancel_own_order_only() {
    let app = spawn_app().await;
    app.register_customer("buyer5@example.com").await;
    app.register_customer("other5@example.com").await;
    app.register_seller("Store", "seller5@example.com").await;

    let customer = app.login("buyer5@example.com").await;
    let other = app.login("other5@example.com").await;
    let seller = app.login("seller5@example.com").await;
    let seller_id = app.account_id(&seller).await;
    let shipping_id = app.create_shipping_address(&customer).await;

    let body: Value = customer
        .post(app.url("/orders"))
        .json(&json!({
            "shipping_id": shipping_id,
            "total": 10.0,
            "payment_method": "cod",
            "items": [{
                "product_id": uuid::Uuid::new_v4(),
                "product_name": "Thing",
                "quantity": 1,
                "price": 10.0,
                "seller_id": seller_id,
            }],
        }))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse response");
    let order_id = body["order"]["_id"].as_str().unwrap().to_string();

    let response = other
        .put(app.url("/orders/cancel"))
        .json(&json!({ "order_id": order_id }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 404);

    let response = customer
        .put(app.url("/orders/cancel"))
        .json(&json!({ "order_id": order_id }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 200);

    let body: Value = customer
        .get(app.url(&format!("/orders/user/{}", order_id)))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(body["order"]["status"], "Cancelled");

    app.cleanup().await;
}
