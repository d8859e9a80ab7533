//! Customer self-service profile handlers plus the admin account surface.

use anyhow::anyhow;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use service_core::error::AppError;
use uuid::Uuid;
use validator::Validate;

use crate::middleware::AuthUser;
use crate::models::{Role, User};
use crate::services::audit::AuditEntry;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    // Credentials have dedicated endpoints; reject them here.
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangeEmailRequest {
    #[validate(email(message = "Invalid email address"))]
    pub new_email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let user = find_user(&state, claims.sub).await?;
    Ok(Json(json!({ "user": user.sanitized() })))
}

pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    apply_profile_update(&state, claims.sub, claims.role, payload).await
}

pub async fn change_email(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<ChangeEmailRequest>,
) -> Result<impl IntoResponse, AppError> {
    apply_email_change(&state, claims.sub, claims.role, payload).await
}

pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    apply_password_change(&state, claims.sub, claims.role, payload).await
}

/// Soft-delete the account, soft-delete its orders, and drop its cart.
/// Steps run in sequence without compensation; a failure part-way leaves the
/// earlier writes in place.
pub async fn delete_account(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    apply_account_delete(&state, claims.sub, claims.role).await
}

// Admin surface.

pub async fn list_users(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let users = state.users.list_all().await?;
    let users: Vec<_> = users.iter().map(User::sanitized).collect();
    Ok(Json(json!({ "users": users })))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let user = find_user(&state, id).await?;
    Ok(Json(json!({ "user": user.sanitized() })))
}

pub async fn admin_update_user(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    apply_profile_update(&state, id, claims.role, payload).await
}

pub async fn admin_change_email(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ChangeEmailRequest>,
) -> Result<impl IntoResponse, AppError> {
    apply_email_change(&state, id, claims.role, payload).await
}

pub async fn admin_change_password(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    apply_password_change(&state, id, claims.role, payload).await
}

pub async fn admin_delete_user(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    apply_account_delete(&state, id, claims.role).await
}

async fn find_user(state: &AppState, id: Uuid) -> Result<User, AppError> {
    state
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow!("User not found")))
}

async fn apply_profile_update(
    state: &AppState,
    id: Uuid,
    actor_role: Role,
    payload: UpdateProfileRequest,
) -> Result<Json<serde_json::Value>, AppError> {
    payload.validate()?;
    if payload.email.is_some() || payload.password.is_some() {
        return Err(AppError::BadRequest(anyhow!(
            "Email and password cannot be changed through profile update"
        )));
    }

    let before = find_user(state, id).await?;
    state
        .users
        .update_profile(
            id,
            &payload.first_name,
            &payload.last_name,
            payload.phone.as_deref(),
            payload.address.as_deref(),
        )
        .await?;
    let after = find_user(state, id).await?;

    state
        .audit
        .record(AuditEntry {
            action: "update_profile",
            entity: "user",
            entity_id: Some(id.to_string()),
            actor_id: Some(id),
            actor_role: Some(actor_role.as_str()),
            message: "Updated profile".to_string(),
            before_state: mongodb::bson::to_bson(&before.sanitized()).ok(),
            after_state: mongodb::bson::to_bson(&after.sanitized()).ok(),
            ..Default::default()
        })
        .await;

    Ok(Json(json!({ "message": "Profile updated", "user": after.sanitized() })))
}

async fn apply_email_change(
    state: &AppState,
    id: Uuid,
    actor_role: Role,
    payload: ChangeEmailRequest,
) -> Result<Json<serde_json::Value>, AppError> {
    payload.validate()?;

    let new_email = payload.new_email.to_lowercase();
    if let Some(existing) = state.users.find_by_email(&new_email).await? {
        if existing.id != id {
            return Err(AppError::Conflict(anyhow!("Email is already registered")));
        }
    }

    let before = find_user(state, id).await?;
    state.users.update_email(id, &new_email).await?;

    state
        .audit
        .record(AuditEntry {
            action: "change_email",
            entity: "user",
            entity_id: Some(id.to_string()),
            actor_id: Some(id),
            actor_role: Some(actor_role.as_str()),
            message: format!("Changed email from {}", before.email),
            ..Default::default()
        })
        .await;

    Ok(Json(json!({ "message": "Email updated" })))
}

async fn apply_password_change(
    state: &AppState,
    id: Uuid,
    actor_role: Role,
    payload: ChangePasswordRequest,
) -> Result<Json<serde_json::Value>, AppError> {
    payload.validate()?;

    find_user(state, id).await?;
    let password_hash = crate::utils::password::hash_password(&payload.new_password)?;
    state.users.update_password_hash(id, &password_hash).await?;

    state
        .audit
        .record(AuditEntry {
            action: "change_password",
            entity: "user",
            entity_id: Some(id.to_string()),
            actor_id: Some(id),
            actor_role: Some(actor_role.as_str()),
            message: "Changed password".to_string(),
            ..Default::default()
        })
        .await;

    Ok(Json(json!({ "message": "Password updated" })))
}

async fn apply_account_delete(
    state: &AppState,
    id: Uuid,
    actor_role: Role,
) -> Result<Json<serde_json::Value>, AppError> {
    find_user(state, id).await?;

    state.users.soft_delete(id).await?;
    state.orders.soft_delete_by_user(id).await?;
    state.carts.remove_by_user(id).await?;

    tracing::info!(user_id = %id, "Account soft-deleted");
    state
        .audit
        .record(AuditEntry {
            action: "delete_account",
            entity: "user",
            entity_id: Some(id.to_string()),
            actor_id: Some(id),
            actor_role: Some(actor_role.as_str()),
            message: "Soft-deleted account, its orders and cart".to_string(),
            ..Default::default()
        })
        .await;

    Ok(Json(json!({ "message": "Account deleted" })))
}
