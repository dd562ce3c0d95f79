use axum::{
    extract::{Path, State},
    middleware::from_fn_with_state,
    routing::{get, put},
    Extension, Json, Router,
};
use bazaar_core::Order;
use bazaar_order::AllOrders;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::{admin_auth_middleware, AdminClaims};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    /// Free text from the client; parsed into a known status before use.
    pub status: String,
}

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/v1/admin/orders", get(list_orders))
        .route("/v1/admin/orders/{id}/status", put(update_order_status))
        .route_layer(from_fn_with_state(state, admin_auth_middleware))
}

/// GET /v1/admin/orders
pub async fn list_orders(State(state): State<AppState>) -> Result<Json<AllOrders>, AppError> {
    Ok(Json(state.queries.get_all_orders().await?))
}

/// PUT /v1/admin/orders/{id}/status
pub async fn update_order_status(
    State(state): State<AppState>,
    Extension(claims): Extension<AdminClaims>,
    Path(order_id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<Order>, AppError> {
    tracing::info!("Admin {} requested status {} for order {}", claims.sub, req.status, order_id);

    let order = state
        .lifecycle
        .update_order_status_str(order_id, &req.status)
        .await?;

    Ok(Json(order))
}
