use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bazaar_catalog::PricingError;
use bazaar_core::PaymentGatewayError;
use bazaar_order::OrderError;
use serde_json::json;

/// Handler error: an order service failure rendered as `{"error": ...}`.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct AppError(#[from] OrderError);

impl AppError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            OrderError::EmptyCart(_)
            | OrderError::InvalidStatus(_)
            | OrderError::InvalidTransition { .. }
            | OrderError::InvalidQuantity { .. }
            | OrderError::NonPayableAmount(_) => StatusCode::BAD_REQUEST,
            OrderError::Pricing(PricingError::Overflow) => StatusCode::INTERNAL_SERVER_ERROR,
            OrderError::Pricing(_) => StatusCode::BAD_REQUEST,
            OrderError::OrderNotFound(_)
            | OrderError::ProductNotFound(_)
            | OrderError::CouponNotFound(_)
            | OrderError::NoPendingOrder(_) => StatusCode::NOT_FOUND,
            OrderError::AlreadyDelivered(_)
            | OrderError::InsufficientStock { .. }
            | OrderError::ConcurrentModification(_) => StatusCode::CONFLICT,
            OrderError::PaymentGateway(PaymentGatewayError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            OrderError::PaymentGateway(_) => StatusCode::BAD_GATEWAY,
            OrderError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let error_message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Internal Server Error: {}", self);
            "Internal Server Error".to_string()
        } else {
            if status.is_server_error() {
                tracing::warn!("Upstream failure: {}", self);
            }
            self.to_string()
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
