//! HTTP payment gateway client (Razorpay-compatible orders API).

use async_trait::async_trait;
use bazaar_core::{GatewayOrder, GatewayOrderRequest, PaymentGateway, PaymentGatewayError};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

#[derive(Debug, Clone)]
pub struct HttpGatewayConfig {
    /// e.g. `"https://api.razorpay.com"`
    pub base_url: String,
    pub key_id: String,
    pub key_secret: String,
}

#[derive(Debug, Clone)]
pub struct HttpPaymentGateway {
    config: HttpGatewayConfig,
    http: Client,
}

#[derive(Debug, Serialize)]
struct CreateOrderBody<'a> {
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreateOrderResponse {
    id: String,
    amount: i64,
    currency: String,
}

impl HttpPaymentGateway {
    pub fn new(config: HttpGatewayConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    fn orders_url(&self) -> String {
        format!("{}/v1/orders", self.config.base_url.trim_end_matches('/'))
    }
}

impl<'a> From<&'a GatewayOrderRequest> for CreateOrderBody<'a> {
    fn from(request: &'a GatewayOrderRequest) -> Self {
        Self {
            amount: request.amount_minor_units,
            currency: &request.currency,
            receipt: &request.receipt,
        }
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn create_order(
        &self,
        request: &GatewayOrderRequest,
    ) -> Result<GatewayOrder, PaymentGatewayError> {
        debug!(receipt = %request.receipt, amount = request.amount_minor_units, "Creating gateway order");

        let response = self
            .http
            .post(self.orders_url())
            .basic_auth(&self.config.key_id, Some(&self.config.key_secret))
            .json(&CreateOrderBody::from(request))
            .send()
            .await
            .map_err(|e| PaymentGatewayError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            error!("Gateway order creation failed with status {}: {}", status, text);

            return Err(PaymentGatewayError::Rejected(format!(
                "status {}: {}",
                status, text
            )));
        }

        let parsed: CreateOrderResponse = response
            .json()
            .await
            .map_err(|e| PaymentGatewayError::InvalidResponse(e.to_string()))?;

        if parsed.amount != request.amount_minor_units {
            return Err(PaymentGatewayError::InvalidResponse(format!(
                "gateway echoed amount {} for a request of {}",
                parsed.amount, request.amount_minor_units
            )));
        }

        Ok(GatewayOrder {
            id: parsed.id,
            amount_minor_units: parsed.amount,
            currency: parsed.currency,
        })
    }
}
