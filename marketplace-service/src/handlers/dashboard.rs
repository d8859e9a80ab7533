//! Dashboard metric handlers for the admin and seller consoles.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use service_core::error::AppError;

use crate::middleware::AuthUser;
use crate::AppState;

pub async fn admin_dashboard(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let (product_count, customer_count, pending_orders, revenue) = tokio::try_join!(
        state.dashboard.count_all_products(),
        state.dashboard.count_all_customers(),
        state.dashboard.count_all_pending_orders(),
        state.dashboard.total_revenue(),
    )?;
    let (monthly_orders, monthly_revenue) = tokio::try_join!(
        state.dashboard.monthly_orders_admin(),
        state.dashboard.monthly_revenue_admin(),
    )?;

    Ok(Json(json!({
        "product_count": product_count,
        "customer_count": customer_count,
        "pending_orders": pending_orders,
        "revenue": revenue,
        "monthly_orders": monthly_orders,
        "monthly_revenue": monthly_revenue,
    })))
}

pub async fn seller_dashboard(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let seller_id = claims.sub;
    let (product_count, pending_orders, revenue) = tokio::try_join!(
        state.dashboard.count_products_by_seller(seller_id),
        state.dashboard.count_pending_orders_by_seller(seller_id),
        state.dashboard.revenue_by_seller(seller_id),
    )?;
    let (monthly_orders, monthly_revenue) = tokio::try_join!(
        state.dashboard.monthly_orders_by_seller(seller_id),
        state.dashboard.monthly_revenue_by_seller(seller_id),
    )?;

    Ok(Json(json!({
        "product_count": product_count,
        "pending_orders": pending_orders,
        "revenue": revenue,
        "monthly_orders": monthly_orders,
        "monthly_revenue": monthly_revenue,
    })))
}
