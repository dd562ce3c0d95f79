use bazaar_catalog::PricingError;
use bazaar_core::{OrderStatus, ParseStatusError, PaymentGatewayError, StoreError};
use bazaar_shared::Money;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Cart is empty for user {0}")]
    EmptyCart(String),

    #[error("Invalid order status: {0}")]
    InvalidStatus(String),

    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Order {0} has already been delivered")]
    AlreadyDelivered(Uuid),

    #[error("No pending order for user {0}")]
    NoPendingOrder(String),

    #[error("Order not found: {0}")]
    OrderNotFound(Uuid),

    #[error("Product not found: {0}")]
    ProductNotFound(Uuid),

    #[error("Coupon not found: {0}")]
    CouponNotFound(String),

    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: Uuid,
        requested: i64,
        available: i64,
    },

    #[error("Invalid quantity {quantity} for product {product_id}")]
    InvalidQuantity { product_id: Uuid, quantity: i64 },

    #[error("Payment gateway error: {0}")]
    PaymentGateway(#[from] PaymentGatewayError),

    #[error("Amount {0} cannot be charged")]
    NonPayableAmount(Money),

    #[error("Order {0} was modified concurrently")]
    ConcurrentModification(Uuid),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ParseStatusError> for OrderError {
    fn from(err: ParseStatusError) -> Self {
        Self::InvalidStatus(err.0)
    }
}
