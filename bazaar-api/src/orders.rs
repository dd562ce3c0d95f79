use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::{get, post},
    Extension, Json, Router,
};
use bazaar_order::{OrderDetails, OrderError, PlacedOrder};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::{customer_auth_middleware, payment_circuit_middleware, CustomerClaims};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub address: String,
}

#[derive(Debug, Serialize)]
pub struct MyOrdersResponse {
    pub orders: Vec<OrderDetails>,
}

pub fn routes(state: AppState) -> Router<AppState> {
    let place = Router::new()
        .route("/v1/orders/place", post(place_order))
        .route_layer(from_fn_with_state(state.clone(), payment_circuit_middleware));

    Router::new()
        .route("/v1/orders/checkout", post(checkout))
        .route("/v1/orders/me", get(my_orders))
        .route("/v1/orders/{id}", get(get_order))
        .merge(place)
        .route_layer(from_fn_with_state(state, customer_auth_middleware))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/orders/checkout
/// Turn the caller's cart into a fresh unconfirmed order
pub async fn checkout(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
    Json(req): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<OrderDetails>), AppError> {
    let details = state.checkout.checkout(&claims.sub, req.address).await?;
    Ok((StatusCode::CREATED, Json(details)))
}

/// POST /v1/orders/place
/// Hand the pending order to the payment gateway
pub async fn place_order(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
) -> Result<Json<PlacedOrder>, AppError> {
    let placed = state.payments.place_order(&claims.sub).await?;
    Ok(Json(placed))
}

/// GET /v1/orders/me
/// Confirmed orders of the caller
pub async fn my_orders(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
) -> Result<Json<MyOrdersResponse>, AppError> {
    let orders = state.queries.get_orders(&claims.sub).await?;
    Ok(Json(MyOrdersResponse { orders }))
}

/// GET /v1/orders/{id}
/// Someone else's order reads as not found.
pub async fn get_order(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<OrderDetails>, AppError> {
    let details = state.queries.get_single_order(order_id).await?;

    if details.order.user_id != claims.sub {
        return Err(OrderError::OrderNotFound(order_id).into());
    }

    Ok(Json(details))
}
