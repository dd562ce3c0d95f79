use bazaar_catalog::{Coupon, Product};
use bazaar_core::Order;
use bazaar_shared::Money;
use serde::Serialize;
use uuid::Uuid;

/// An order with its coupon and products resolved for display.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetails {
    pub order: Order,
    pub coupon: Option<Coupon>,
    pub products: Vec<Product>,
}

/// Result of handing an order to the payment gateway.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PlacedOrder {
    pub order_id: Uuid,
    pub gateway_order_id: String,
    pub amount: Money,
    pub currency: String,
}

/// Admin listing: every order plus the sum of their payable amounts.
#[derive(Debug, Clone, Serialize)]
pub struct AllOrders {
    pub total_amount: Money,
    pub orders: Vec<Order>,
}
