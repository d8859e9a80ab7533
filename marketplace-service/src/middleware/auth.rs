//! Session middleware: validates the `token` cookie and stores the claims in
//! request extensions; role guards layer on top per route group.

use anyhow::anyhow;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use service_core::error::AppError;

use crate::{
    models::Role,
    services::Claims,
    AppState,
};

pub const SESSION_COOKIE: &str = "token";

pub async fn auth_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = jar
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .ok_or_else(|| AppError::Unauthorized(anyhow!("Missing session cookie")))?;

    let claims = state
        .jwt
        .validate(&token)
        .map_err(|_| AppError::Unauthorized(anyhow!("Invalid or expired token")))?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

async fn require_role(role: Role, req: Request, next: Next) -> Result<Response, AppError> {
    let claims = req
        .extensions()
        .get::<Claims>()
        .ok_or_else(|| AppError::Unauthorized(anyhow!("Missing session claims")))?;

    if claims.role != role {
        return Err(AppError::Forbidden(anyhow!(
            "Requires {} role",
            role.as_str()
        )));
    }

    Ok(next.run(req).await)
}

pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    require_role(Role::Admin, req, next).await
}

pub async fn require_customer(req: Request, next: Next) -> Result<Response, AppError> {
    require_role(Role::Customer, req, next).await
}

pub async fn require_seller(req: Request, next: Next) -> Result<Response, AppError> {
    require_role(Role::Seller, req, next).await
}

/// Extractor handing the validated claims to handlers.
pub struct AuthUser(pub Claims);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = parts
            .extensions
            .get::<Claims>()
            .ok_or_else(|| AppError::Unauthorized(anyhow!("Missing session claims")))?;

        Ok(AuthUser(claims.clone()))
    }
}
