use bazaar_catalog::{PriceBreakdown, PricedLine};
use bazaar_shared::{Masked, Money};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Order status in the lifecycle.
///
/// Variants are declared in lifecycle order; the derived `Ord` is the
/// transition order (a legal transition always moves to a greater status).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Unconfirmed,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Unconfirmed,
        OrderStatus::Confirmed,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Unconfirmed => "UNCONFIRMED",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Processing => "PROCESSING",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::Delivered => "DELIVERED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown order status: {0}")]
pub struct ParseStatusError(pub String);

impl FromStr for OrderStatus {
    type Err = ParseStatusError;

    /// Case-insensitive: `"Shipped"`, `"shipped"` and `"SHIPPED"` all parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseStatusError(s.to_string()))
    }
}

/// A product line frozen at order creation. Never repriced afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderLine {
    pub product_id: Uuid,
    pub product_name: String,
    pub unit_price: Money,
    pub quantity: i64,
    pub line_total: Money,
}

impl From<PricedLine> for OrderLine {
    fn from(line: PricedLine) -> Self {
        Self {
            product_id: line.product_id,
            product_name: line.product_name,
            unit_price: line.unit_price,
            quantity: line.quantity,
            line_total: line.line_total,
        }
    }
}

/// The single source of truth for a customer's purchase.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Order {
    pub id: Uuid,
    pub user_id: String,
    pub lines: Vec<OrderLine>,
    pub address: Masked<String>,
    pub coupon_code: Option<String>,
    pub grand_total: Money,
    pub discount: Money,
    pub shipping_price: Money,
    pub amount_to_be_paid: Money,
    pub currency: String,
    pub payment_gateway_order_id: Option<String>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub delivered_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Build a fresh unconfirmed order from a price breakdown.
    pub fn unconfirmed(
        user_id: impl Into<String>,
        address: Masked<String>,
        coupon_code: Option<String>,
        breakdown: PriceBreakdown,
        currency: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            lines: breakdown.lines.into_iter().map(OrderLine::from).collect(),
            address,
            coupon_code,
            grand_total: breakdown.grand_total,
            discount: breakdown.discount,
            shipping_price: breakdown.shipping_price,
            amount_to_be_paid: breakdown.amount_to_be_paid,
            currency: currency.into(),
            payment_gateway_order_id: None,
            status: OrderStatus::Unconfirmed,
            created_at: now,
            updated_at: now,
            delivered_at: None,
        }
    }

    /// Write a transition's fields onto the order. Callers check legality first.
    pub fn apply(&mut self, transition: &OrderTransition) {
        self.status = transition.status;
        if let Some(gateway_order_id) = &transition.payment_gateway_order_id {
            self.payment_gateway_order_id = Some(gateway_order_id.clone());
        }
        if let Some(delivered_at) = transition.delivered_at {
            self.delivered_at = Some(delivered_at);
        }
        self.updated_at = Utc::now();
    }
}

/// The fields a status change writes, applied only if the stored status still
/// matches what the caller last read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderTransition {
    pub status: OrderStatus,
    pub payment_gateway_order_id: Option<String>,
    pub delivered_at: Option<DateTime<Utc>>,
}

impl OrderTransition {
    pub fn to(status: OrderStatus) -> Self {
        Self {
            status,
            payment_gateway_order_id: None,
            delivered_at: None,
        }
    }

    pub fn with_gateway_order(mut self, gateway_order_id: impl Into<String>) -> Self {
        self.payment_gateway_order_id = Some(gateway_order_id.into());
        self
    }

    pub fn with_delivered_at(mut self, delivered_at: DateTime<Utc>) -> Self {
        self.delivered_at = Some(delivered_at);
        self
    }
}
