//! Registration, login, and session handlers.
//!
//! Sessions are JWTs carried in an HTTP-only `token` cookie; customers and
//! admins live in `users`, sellers in their own collection.

use anyhow::anyhow;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use serde_json::json;
use service_core::error::AppError;
use validator::Validate;

use crate::middleware::{AuthUser, SESSION_COOKIE};
use crate::models::{Role, Seller, User};
use crate::services::audit::AuditEntry;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterUserRequest {
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterSellerRequest {
    #[validate(length(min = 2, message = "Store name must be at least 2 characters"))]
    pub store_name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn register_customer(
    State(state): State<AppState>,
    Json(payload): Json<RegisterUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    register_user(state, payload, Role::Customer).await
}

pub async fn register_admin(
    State(state): State<AppState>,
    Json(payload): Json<RegisterUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    register_user(state, payload, Role::Admin).await
}

async fn register_user(
    state: AppState,
    payload: RegisterUserRequest,
    role: Role,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let email = payload.email.to_lowercase();
    if state.users.find_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict(anyhow!("Email is already registered")));
    }

    let password_hash = crate::utils::password::hash_password(&payload.password)?;
    let user = User::new(
        payload.first_name,
        payload.last_name,
        email,
        password_hash,
        role,
    );
    state.users.insert(user.clone()).await?;

    tracing::info!(user_id = %user.id, role = role.as_str(), "Account registered");
    state
        .audit
        .record(AuditEntry {
            action: "register",
            entity: "user",
            entity_id: Some(user.id.to_string()),
            actor_id: Some(user.id),
            actor_role: Some(role.as_str()),
            message: format!("Registered {} account", role.as_str()),
            ..Default::default()
        })
        .await;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Account registered", "user": user.sanitized() })),
    ))
}

pub async fn register_seller(
    State(state): State<AppState>,
    Json(payload): Json<RegisterSellerRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let email = payload.email.to_lowercase();
    if state.sellers.find_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict(anyhow!("Email is already registered")));
    }

    let password_hash = crate::utils::password::hash_password(&payload.password)?;
    let seller = Seller::new(payload.store_name, email, password_hash);
    state.sellers.insert(seller.clone()).await?;

    tracing::info!(seller_id = %seller.id, "Seller registered");
    state
        .audit
        .record(AuditEntry {
            action: "register",
            entity: "seller",
            entity_id: Some(seller.id.to_string()),
            actor_id: Some(seller.id),
            actor_role: Some(Role::Seller.as_str()),
            message: "Registered seller account".to_string(),
            ..Default::default()
        })
        .await;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Account registered", "seller": seller.sanitized() })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let email = payload.email.to_lowercase();

    // Customers and admins share a collection; sellers have their own.
    let (account_id, role, password_hash, profile) =
        match state.users.find_by_email(&email).await? {
            Some(user) => (
                user.id,
                user.role,
                user.password_hash.clone(),
                json!(user.sanitized()),
            ),
            None => match state.sellers.find_by_email(&email).await? {
                Some(seller) => (
                    seller.id,
                    Role::Seller,
                    seller.password_hash.clone(),
                    json!(seller.sanitized()),
                ),
                None => return Err(AppError::Unauthorized(anyhow!("Invalid credentials"))),
            },
        };

    if crate::utils::password::verify_password(&payload.password, &password_hash).is_err() {
        return Err(AppError::Unauthorized(anyhow!("Invalid credentials")));
    }

    let token = state.jwt.issue(account_id, role)?;
    let jar = jar.add(session_cookie(token.clone(), state.jwt.expiry_minutes()));

    tracing::info!(account_id = %account_id, role = role.as_str(), "Login");
    state
        .audit
        .record(AuditEntry {
            action: "login",
            entity: "session",
            actor_id: Some(account_id),
            actor_role: Some(role.as_str()),
            message: "Logged in".to_string(),
            ..Default::default()
        })
        .await;

    Ok((
        jar,
        Json(json!({ "message": "Logged in", "token": token, "account": profile })),
    ))
}

pub async fn logout(jar: CookieJar) -> Result<impl IntoResponse, AppError> {
    if jar.get(SESSION_COOKIE).is_none() {
        return Err(AppError::BadRequest(anyhow!("No active session")));
    }

    let mut removal = Cookie::from(SESSION_COOKIE);
    removal.set_path("/");
    let jar = jar.remove(removal);

    Ok((jar, Json(json!({ "message": "Logged out" }))))
}

/// Resolve the authenticated account from its token claims.
pub async fn me(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    match claims.role {
        Role::Seller => {
            let seller = state
                .sellers
                .find_by_id(claims.sub)
                .await?
                .ok_or_else(|| AppError::NotFound(anyhow!("Account not found")))?;
            Ok(Json(json!({ "account": seller.sanitized() })))
        }
        _ => {
            let user = state
                .users
                .find_by_id(claims.sub)
                .await?
                .ok_or_else(|| AppError::NotFound(anyhow!("Account not found")))?;
            Ok(Json(json!({ "account": user.sanitized() })))
        }
    }
}

fn session_cookie(token: String, expiry_minutes: i64) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Strict);
    cookie.set_path("/");
    cookie.set_max_age(time::Duration::minutes(expiry_minutes));
    cookie
}
