use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What we ask the gateway to create. Amounts are already in minor units.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GatewayOrderRequest {
    pub amount_minor_units: i64,
    pub currency: String,
    /// Our own order id, echoed back by the provider for reconciliation.
    pub receipt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GatewayOrder {
    pub id: String, // Provider's ID (e.g., order_Kx81...)
    pub amount_minor_units: i64,
    pub currency: String,
}

#[derive(Debug, thiserror::Error)]
pub enum PaymentGatewayError {
    #[error("Gateway rejected the request: {0}")]
    Rejected(String),
    #[error("Gateway unreachable: {0}")]
    Transport(String),
    #[error("Unexpected gateway response: {0}")]
    InvalidResponse(String),
    #[error("Gateway did not respond within {0:?}")]
    Timeout(Duration),
}

/// A payment provider that can open a provider-side order for an amount.
///
/// Injected into the payment orchestrator as `Arc<dyn PaymentGateway>`.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_order(
        &self,
        request: &GatewayOrderRequest,
    ) -> Result<GatewayOrder, PaymentGatewayError>;
}
