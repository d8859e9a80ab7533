mod common;

use common::spawn_app;
use serde_json::{json, Value};

async fn seed_category(app: &common::TestApp) -> String {
    app.register_admin("catalog-admin@example.com").await;
    let admin = app.login("catalog-admin@example.com").await;

    let response = admin
        .post(app.url("/categories"))
        .json(&json!({ "name": "Gadgets" }))
        .send()
        .await
        .expect("Failed to execute request");
    let body: Value = response.json().await.expect("Failed to parse response");
    body["category"]["_id"].as_str().unwrap().to_string()
}

fn product_form(name: &str, price: &str, category_id: &str) -> reqwest::multipart::Form {
    reqwest::multipart::Form::new()
        .text("name", name.to_string())
        .text("description", "a test product")
        .text("quantity", "10")
        .text("price", price.to_string())
        .text("category_id", category_id.to_string())
}

fn png_part(file_name: &str) -> reqwest::multipart::Part {
    reqwest::multipart::Part::bytes(vec![0x89, b'P', b'N', b'G', 0, 0, 0, 0])
        .file_name(file_name.to_string())
        .mime_str("image/png")
        .expect("Invalid mime type")
}

fn stored_file_count(app: &common::TestApp) -> usize {
    std::fs::read_dir(&app.upload_dir)
        .map(|entries| entries.count())
        .unwrap_or(0)
}

#[tokio::test]
async fn seller_creates_product_with_image() {
    let app = spawn_app().await;
    let category_id = seed_category(&app).await;
    app.register_seller("Imaging", "imaging@example.com").await;
    let seller = app.login("imaging@example.com").await;

    // Tiny valid-enough PNG payload; only content type and size are checked.
    let image = reqwest::multipart::Part::bytes(vec![0x89, b'P', b'N', b'G', 0, 0, 0, 0])
        .file_name("photo.png")
        .mime_str("image/png")
        .expect("Invalid mime type");
    let form = product_form("Camera", "199.99", &category_id).part("images", image);

    let response = seller
        .post(app.url("/products"))
        .multipart(form)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    let product = &body["product"];
    assert_eq!(product["name"], "Camera");
    assert_eq!(product["status"], "active");
    assert_eq!(product["images"].as_array().map(Vec::len), Some(1));

    app.cleanup().await;
}

#[tokio::test]
async fn oversized_or_wrong_type_images_are_rejected() {
    let app = spawn_app().await;
    let category_id = seed_category(&app).await;
    app.register_seller("Strict", "strict@example.com").await;
    let seller = app.login("strict@example.com").await;

    let gif = reqwest::multipart::Part::bytes(vec![b'G', b'I', b'F'])
        .file_name("anim.gif")
        .mime_str("image/gif")
        .expect("Invalid mime type");
    let form = product_form("Animated", "5.0", &category_id).part("images", gif);
    let response = seller
        .post(app.url("/products"))
        .multipart(form)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 400);

    let oversized = reqwest::multipart::Part::bytes(vec![0u8; 1024 * 1024 + 1])
        .file_name("big.png")
        .mime_str("image/png")
        .expect("Invalid mime type");
    let form = product_form("Big", "5.0", &category_id).part("images", oversized);
    let response = seller
        .post(app.url("/products"))
        .multipart(form)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 400);

    app.cleanup().await;
}

#[tokio::test]
async fn update_exceeding_image_cap_stores_nothing() {
    let app = spawn_app().await;
    let category_id = seed_category(&app).await;
    app.register_seller("Gallery", "gallery@example.com").await;
    let seller = app.login("gallery@example.com").await;

    let mut form = product_form("Lens Kit", "49.0", &category_id);
    for i in 0..3 {
        form = form.part("images", png_part(&format!("photo-{}.png", i)));
    }
    let response = seller
        .post(app.url("/products"))
        .multipart(form)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let product_id = body["product"]["_id"].as_str().unwrap().to_string();
    assert_eq!(stored_file_count(&app), 3);

    // 3 kept + 3 new exceeds the cap; the rejection must not write files.
    let mut form = reqwest::multipart::Form::new();
    for i in 0..3 {
        form = form.part("images", png_part(&format!("extra-{}.png", i)));
    }
    let response = seller
        .put(app.url(&format!("/products/{}", product_id)))
        .multipart(form)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 400);
    assert_eq!(stored_file_count(&app), 3);

    app.cleanup().await;
}

#[tokio::test]
async fn deleted_products_drop_out_of_public_reads() {
    let app = spawn_app().await;
    let category_id = seed_category(&app).await;
    app.register_seller("Cleanup", "cleanup@example.com").await;
    let seller = app.login("cleanup@example.com").await;

    let response = seller
        .post(app.url("/products"))
        .multipart(product_form("Ephemeral", "9.99", &category_id))
        .send()
        .await
        .expect("Failed to execute request");
    let body: Value = response.json().await.expect("Failed to parse response");
    let product_id = body["product"]["_id"].as_str().unwrap().to_string();

    let response = seller
        .delete(app.url(&format!("/products/{}", product_id)))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 200);

    let response = app
        .client()
        .get(app.url(&format!("/products/view/{}", product_id)))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 404);

    let body: Value = app
        .client()
        .get(app.url("/products"))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(body["products"].as_array().map(Vec::len), Some(0));

    app.cleanup().await;
}

#[tokio::test]
async fn sellers_cannot_touch_each_others_products() {
    let app = spawn_app().await;
    let category_id = seed_category(&app).await;
    app.register_seller("Mine", "mine@example.com").await;
    app.register_seller("Yours", "yours@example.com").await;
    let owner = app.login("mine@example.com").await;
    let intruder = app.login("yours@example.com").await;

    let response = owner
        .post(app.url("/products"))
        .multipart(product_form("Guarded", "15.0", &category_id))
        .send()
        .await
        .expect("Failed to execute request");
    let body: Value = response.json().await.expect("Failed to parse response");
    let product_id = body["product"]["_id"].as_str().unwrap().to_string();

    let response = intruder
        .delete(app.url(&format!("/products/{}", product_id)))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 403);

    app.cleanup().await;
}

#[tokio::test]
async fn filter_sorts_by_price() {
    let app = spawn_app().await;
    let category_id = seed_category(&app).await;
    app.register_seller("Sorted", "sorted@example.com").await;
    let seller = app.login("sorted@example.com").await;

    for (name, price) in [("Cheap", "5.0"), ("Mid", "20.0"), ("Dear", "80.0")] {
        let response = seller
            .post(app.url("/products"))
            .multipart(product_form(name, price, &category_id))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status().as_u16(), 201);
    }

    let body: Value = app
        .client()
        .get(app.url(&format!(
            "/products/filter?category_id={}&sort=price-high-low",
            category_id
        )))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse response");
    let products = body["products"].as_array().expect("No products array");
    assert_eq!(products.len(), 3);
    assert_eq!(products[0]["name"], "Dear");
    assert_eq!(products[2]["name"], "Cheap");

    let body: Value = app
        .client()
        .get(app.url("/products/filter?min_price=10&max_price=50"))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse response");
    let products = body["products"].as_array().expect("No products array");
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["name"], "Mid");

    let body: Value = app
        .client()
        .get(app.url(&format!("/products/price-range?category_id={}", category_id)))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(body["min_price"], 5.0);
    assert_eq!(body["max_price"], 80.0);

    app.cleanup().await;
}
