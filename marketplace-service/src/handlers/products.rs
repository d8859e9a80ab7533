//! Product catalog handlers: the public browse surface, the seller's
//! multipart create/update flow, and admin moderation toggles.

use anyhow::anyhow;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use mongodb::bson::doc;
use serde::Deserialize;
use serde_json::json;
use service_core::error::AppError;
use uuid::Uuid;

use crate::middleware::AuthUser;
use crate::models::{Product, ProductStatus, StoredFile};
use crate::repository::products::ProductFilter;
use crate::services::audit::AuditEntry;
use crate::utils::upload;
use crate::AppState;

pub const MAX_IMAGES_PER_PRODUCT: usize = 5;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct PriceRangeQuery {
    pub category_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct BannerStatusRequest {
    pub banner_product: bool,
    pub banner_title: Option<String>,
    pub banner_description: Option<String>,
    pub banner_image: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct ActiveStatusRequest {
    pub is_active: bool,
}

// Public browse surface.

pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let products = state.products.list_all(params.limit).await?;
    Ok(Json(json!({ "products": products })))
}

pub async fn list_banner_products(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let products = state.products.list_banners().await?;
    Ok(Json(json!({ "products": products })))
}

pub async fn list_newest_products(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let products = state.products.list_newest(params.limit).await?;
    Ok(Json(json!({ "products": products })))
}

pub async fn list_featured_products(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let products = state.products.list_featured().await?;
    Ok(Json(json!({ "products": products })))
}

pub async fn search_products(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<impl IntoResponse, AppError> {
    if params.query.trim().is_empty() {
        return Err(AppError::BadRequest(anyhow!("Search query is required")));
    }
    let products = state.products.search_by_name(params.query.trim()).await?;
    Ok(Json(json!({ "products": products })))
}

pub async fn list_filtered_products(
    State(state): State<AppState>,
    Query(params): Query<ProductFilter>,
) -> Result<impl IntoResponse, AppError> {
    let products = state.products.list_filtered(&params).await?;
    Ok(Json(json!({ "products": products })))
}

pub async fn get_price_range(
    State(state): State<AppState>,
    Query(params): Query<PriceRangeQuery>,
) -> Result<impl IntoResponse, AppError> {
    let range = state.products.price_range(params.category_id).await?;
    Ok(Json(json!(range)))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let product = state
        .products
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow!("Product not found")))?;
    Ok(Json(json!({ "product": product })))
}

// Seller surface.

pub async fn list_seller_products(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let products = state.products.list_by_seller(claims.sub).await?;
    Ok(Json(json!({ "products": products })))
}

/// Scalar fields and image parts collected from a multipart body.
#[derive(Debug, Default)]
struct ProductForm {
    name: Option<String>,
    description: Option<String>,
    quantity: Option<i64>,
    price: Option<f64>,
    category_id: Option<Uuid>,
    images: Vec<(String, String, Vec<u8>)>,
    files_to_delete: Vec<Uuid>,
}

async fn read_product_form(mut multipart: Multipart) -> Result<ProductForm, AppError> {
    let mut form = ProductForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(anyhow!("Malformed multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "name" => form.name = Some(read_text(field).await?),
            "description" => form.description = Some(read_text(field).await?),
            "quantity" => {
                let text = read_text(field).await?;
                form.quantity = Some(
                    text.parse()
                        .map_err(|_| AppError::BadRequest(anyhow!("Invalid quantity")))?,
                );
            }
            "price" => {
                let text = read_text(field).await?;
                form.price = Some(
                    text.parse()
                        .map_err(|_| AppError::BadRequest(anyhow!("Invalid price")))?,
                );
            }
            "category_id" => {
                let text = read_text(field).await?;
                form.category_id = Some(
                    text.parse()
                        .map_err(|_| AppError::BadRequest(anyhow!("Invalid category id")))?,
                );
            }
            "files_to_delete" => {
                let text = read_text(field).await?;
                form.files_to_delete.push(
                    text.parse()
                        .map_err(|_| AppError::BadRequest(anyhow!("Invalid file id")))?,
                );
            }
            "images" => {
                let file_name = field.file_name().unwrap_or("image").to_string();
                let mime_type = field.content_type().unwrap_or_default().to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(anyhow!("Failed to read image: {}", e)))?;
                form.images.push((file_name, mime_type, data.to_vec()));
            }
            _ => {}
        }
    }

    if form.images.len() > MAX_IMAGES_PER_PRODUCT {
        return Err(AppError::BadRequest(anyhow!(
            "A product can have at most {} images",
            MAX_IMAGES_PER_PRODUCT
        )));
    }
    for (_, mime_type, data) in &form.images {
        upload::validate_image(mime_type, data.len())?;
    }

    Ok(form)
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(anyhow!("Malformed multipart field: {}", e)))
}

async fn store_images(
    state: &AppState,
    images: Vec<(String, String, Vec<u8>)>,
) -> Result<Vec<StoredFile>, AppError> {
    let mut stored = Vec::with_capacity(images.len());
    for (file_name, mime_type, data) in images {
        let file = upload::store_image(&state.config.uploads.dir, &file_name, &mime_type, &data)
            .await?;
        state.files.insert(file.clone()).await?;
        stored.push(file);
    }
    Ok(stored)
}

pub async fn create_product(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let form = read_product_form(multipart).await?;

    let name = form
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest(anyhow!("Product name is required")))?;
    let quantity = form
        .quantity
        .ok_or_else(|| AppError::BadRequest(anyhow!("Quantity is required")))?;
    let price = form
        .price
        .ok_or_else(|| AppError::BadRequest(anyhow!("Price is required")))?;
    let category_id = form
        .category_id
        .ok_or_else(|| AppError::BadRequest(anyhow!("Category is required")))?;

    if price <= 0.0 {
        return Err(AppError::BadRequest(anyhow!("Price must be positive")));
    }
    if quantity < 0 {
        return Err(AppError::BadRequest(anyhow!("Quantity cannot be negative")));
    }

    state
        .categories
        .find_by_id(category_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow!("Category not found")))?;

    if state.products.find_by_name(&name).await?.is_some() {
        return Err(AppError::Conflict(anyhow!("Product name already in use")));
    }

    let stored = store_images(&state, form.images).await?;
    let image_ids: Vec<Uuid> = stored.iter().map(|f| f.id).collect();

    let product = Product::new(
        name,
        form.description.unwrap_or_default(),
        quantity,
        price,
        category_id,
        claims.sub,
        image_ids,
    );
    state.products.insert(product.clone()).await?;

    tracing::info!(product_id = %product.id, seller_id = %claims.sub, "Product created");
    state
        .audit
        .record(AuditEntry {
            action: "create",
            entity: "product",
            entity_id: Some(product.id.to_string()),
            actor_id: Some(claims.sub),
            actor_role: Some(claims.role.as_str()),
            message: format!("Created product {}", product.name),
            ..Default::default()
        })
        .await;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Product created", "product": product })),
    ))
}

pub async fn update_product(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let product = owned_product(&state, id, claims.sub).await?;
    let form = read_product_form(multipart).await?;

    if let Some(price) = form.price {
        if price <= 0.0 {
            return Err(AppError::BadRequest(anyhow!("Price must be positive")));
        }
    }
    if let Some(quantity) = form.quantity {
        if quantity < 0 {
            return Err(AppError::BadRequest(anyhow!("Quantity cannot be negative")));
        }
    }
    if let Some(category_id) = form.category_id {
        state
            .categories
            .find_by_id(category_id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow!("Category not found")))?;
    }

    let mut images: Vec<Uuid> = product
        .images
        .iter()
        .filter(|img| !form.files_to_delete.contains(img))
        .copied()
        .collect();

    // Check the cap before anything touches disk.
    if images.len() + form.images.len() > MAX_IMAGES_PER_PRODUCT {
        return Err(AppError::BadRequest(anyhow!(
            "A product can have at most {} images",
            MAX_IMAGES_PER_PRODUCT
        )));
    }
    let stored = store_images(&state, form.images).await?;
    images.extend(stored.iter().map(|f| f.id));

    let mut set = doc! { "images": images.iter().map(|i| i.to_string()).collect::<Vec<_>>() };
    if let Some(name) = form.name {
        if let Some(existing) = state.products.find_by_name(&name).await? {
            if existing.id != id {
                return Err(AppError::Conflict(anyhow!("Product name already in use")));
            }
        }
        set.insert("name", name);
    }
    if let Some(description) = form.description {
        set.insert("description", description);
    }
    if let Some(quantity) = form.quantity {
        set.insert("quantity", quantity);
    }
    if let Some(price) = form.price {
        set.insert("price", price);
    }
    if let Some(category_id) = form.category_id {
        set.insert("category_id", category_id.to_string());
    }

    state.products.update_fields(id, set).await?;
    remove_stored_files(&state, &form.files_to_delete).await;

    state
        .audit
        .record(AuditEntry {
            action: "update",
            entity: "product",
            entity_id: Some(id.to_string()),
            actor_id: Some(claims.sub),
            actor_role: Some(claims.role.as_str()),
            message: "Updated product".to_string(),
            ..Default::default()
        })
        .await;

    Ok(Json(json!({ "message": "Product updated" })))
}

pub async fn delete_product(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let product = owned_product(&state, id, claims.sub).await?;

    state.products.set_status(id, ProductStatus::Deleted).await?;
    remove_stored_files(&state, &product.images).await;

    state
        .audit
        .record(AuditEntry {
            action: "delete",
            entity: "product",
            entity_id: Some(id.to_string()),
            actor_id: Some(claims.sub),
            actor_role: Some(claims.role.as_str()),
            message: format!("Deleted product {}", product.name),
            ..Default::default()
        })
        .await;

    Ok(Json(json!({ "message": "Product deleted" })))
}

// Admin moderation.

pub async fn update_banner_status(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<BannerStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    state
        .products
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow!("Product not found")))?;

    let mut set = doc! { "banner_product": payload.banner_product };
    if let Some(title) = payload.banner_title {
        set.insert("banner_title", title);
    }
    if let Some(description) = payload.banner_description {
        set.insert("banner_description", description);
    }
    if let Some(image) = payload.banner_image {
        set.insert("banner_image", image.to_string());
    }
    state.products.update_fields(id, set).await?;

    state
        .audit
        .record(AuditEntry {
            action: "update_banner_status",
            entity: "product",
            entity_id: Some(id.to_string()),
            actor_id: Some(claims.sub),
            actor_role: Some(claims.role.as_str()),
            message: format!("Set banner_product to {}", payload.banner_product),
            ..Default::default()
        })
        .await;

    Ok(Json(json!({ "message": "Banner status updated" })))
}

pub async fn update_active_status(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ActiveStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    state
        .products
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow!("Product not found")))?;

    state
        .products
        .update_fields(id, doc! { "is_active": payload.is_active })
        .await?;

    state
        .audit
        .record(AuditEntry {
            action: "update_active_status",
            entity: "product",
            entity_id: Some(id.to_string()),
            actor_id: Some(claims.sub),
            actor_role: Some(claims.role.as_str()),
            message: format!("Set is_active to {}", payload.is_active),
            ..Default::default()
        })
        .await;

    Ok(Json(json!({ "message": "Active status updated" })))
}

pub async fn admin_delete_product(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let product = state
        .products
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow!("Product not found")))?;

    state.products.set_status(id, ProductStatus::Deleted).await?;
    remove_stored_files(&state, &product.images).await;

    state
        .audit
        .record(AuditEntry {
            action: "delete",
            entity: "product",
            entity_id: Some(id.to_string()),
            actor_id: Some(claims.sub),
            actor_role: Some(claims.role.as_str()),
            message: format!("Deleted product {}", product.name),
            ..Default::default()
        })
        .await;

    Ok(Json(json!({ "message": "Product deleted" })))
}

async fn owned_product(
    state: &AppState,
    id: Uuid,
    seller_id: Uuid,
) -> Result<Product, AppError> {
    let product = state
        .products
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow!("Product not found")))?;
    if product.seller_id != seller_id {
        return Err(AppError::Forbidden(anyhow!(
            "Product belongs to another seller"
        )));
    }
    Ok(product)
}

/// Drop file records and their on-disk images. Failures are logged, not
/// propagated; the product write has already happened.
async fn remove_stored_files(state: &AppState, file_ids: &[Uuid]) {
    for file_id in file_ids {
        match state.files.find_by_id(*file_id).await {
            Ok(Some(file)) => {
                upload::remove_image(&state.config.uploads.dir, &file.url).await;
                if let Err(e) = state.files.delete_by_id(*file_id).await {
                    tracing::warn!(error = %e, file_id = %file_id, "Failed to delete file record");
                }
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, file_id = %file_id, "Failed to load file record");
            }
        }
    }
}
