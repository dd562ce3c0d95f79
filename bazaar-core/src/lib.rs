pub mod order;
pub mod payment;
pub mod repository;

pub use order::{Order, OrderLine, OrderStatus, OrderTransition, ParseStatusError};
pub use payment::{GatewayOrder, GatewayOrderRequest, PaymentGateway, PaymentGatewayError};
pub use repository::{
    CartRepository, CouponRepository, OrderRepository, ProductRepository, StockDecrement,
};

/// Failure reported by a storage collaborator.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(String),
    #[error("Conflicting write: {0}")]
    Conflict(String),
    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn backend(err: impl std::fmt::Display) -> Self {
        Self::Backend(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
