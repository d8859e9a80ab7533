//! Category catalog handlers.
//!
//! Deletion is a hard delete and does not touch products that still
//! reference the category.

use anyhow::anyhow;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use service_core::error::AppError;
use uuid::Uuid;
use validator::Validate;

use crate::middleware::AuthUser;
use crate::models::Category;
use crate::services::audit::AuditEntry;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CategoryRequest {
    #[validate(length(min = 2, message = "Category name must be at least 2 characters"))]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: String,
}

pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let categories = state.categories.list_all().await?;
    Ok(Json(json!({ "categories": categories })))
}

pub async fn search_categories(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<impl IntoResponse, AppError> {
    if params.query.trim().is_empty() {
        return Err(AppError::BadRequest(anyhow!("Search query is required")));
    }
    let categories = state.categories.search_by_name(params.query.trim()).await?;
    Ok(Json(json!({ "categories": categories })))
}

pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let category = state
        .categories
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow!("Category not found")))?;
    Ok(Json(json!({ "category": category })))
}

pub async fn create_category(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<CategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    if state.categories.find_by_name(&payload.name).await?.is_some() {
        return Err(AppError::Conflict(anyhow!("Category already exists")));
    }

    let category = Category::new(payload.name, payload.description);
    state.categories.insert(category.clone()).await?;

    state
        .audit
        .record(AuditEntry {
            action: "create",
            entity: "category",
            entity_id: Some(category.id.to_string()),
            actor_id: Some(claims.sub),
            actor_role: Some(claims.role.as_str()),
            message: format!("Created category {}", category.name),
            ..Default::default()
        })
        .await;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Category created", "category": category })),
    ))
}

pub async fn update_category(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    state
        .categories
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow!("Category not found")))?;

    if let Some(existing) = state.categories.find_by_name(&payload.name).await? {
        if existing.id != id {
            return Err(AppError::Conflict(anyhow!("Category already exists")));
        }
    }

    state
        .categories
        .update(id, &payload.name, payload.description.as_deref())
        .await?;

    state
        .audit
        .record(AuditEntry {
            action: "update",
            entity: "category",
            entity_id: Some(id.to_string()),
            actor_id: Some(claims.sub),
            actor_role: Some(claims.role.as_str()),
            message: format!("Updated category {}", payload.name),
            ..Default::default()
        })
        .await;

    Ok(Json(json!({ "message": "Category updated" })))
}

pub async fn delete_category(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    if !state.categories.delete_by_id(id).await? {
        return Err(AppError::NotFound(anyhow!("Category not found")));
    }

    state
        .audit
        .record(AuditEntry {
            action: "delete",
            entity: "category",
            entity_id: Some(id.to_string()),
            actor_id: Some(claims.sub),
            actor_role: Some(claims.role.as_str()),
            message: "Deleted category".to_string(),
            ..Default::default()
        })
        .await;

    Ok(Json(json!({ "message": "Category deleted" })))
}
