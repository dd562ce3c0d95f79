use async_trait::async_trait;
use bazaar_catalog::{Cart, Coupon, Product};
use uuid::Uuid;

use crate::order::{Order, OrderStatus, OrderTransition};
use crate::StoreResult;

/// Result of a compare-and-decrement on a product's stock counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockDecrement {
    Applied { remaining: i64 },
    Insufficient { available: i64 },
    NotFound,
}

/// Repository trait for product data access
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn get_product(&self, id: Uuid) -> StoreResult<Option<Product>>;

    /// Atomically subtract `quantity` if, and only if, at least that much is in stock.
    async fn decrement_stock(&self, id: Uuid, quantity: i64) -> StoreResult<StockDecrement>;

    /// Put stock back, used to compensate a decrement that must be undone.
    async fn increment_stock(&self, id: Uuid, quantity: i64) -> StoreResult<()>;
}

/// Repository trait for the cart subsystem (read-only from here)
#[async_trait]
pub trait CartRepository: Send + Sync {
    async fn find_cart_for_user(&self, user_id: &str) -> StoreResult<Option<Cart>>;
}

/// Repository trait for coupon lookups
#[async_trait]
pub trait CouponRepository: Send + Sync {
    async fn get_coupon(&self, code: &str) -> StoreResult<Option<Coupon>>;
}

/// Repository trait for order data access
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn create_order(&self, order: &Order) -> StoreResult<()>;

    async fn get_order(&self, id: Uuid) -> StoreResult<Option<Order>>;

    async fn list_orders(&self) -> StoreResult<Vec<Order>>;

    async fn find_by_user_and_status(
        &self,
        user_id: &str,
        status: OrderStatus,
    ) -> StoreResult<Vec<Order>>;

    /// Hard-delete every unconfirmed order of the user. Returns how many were removed.
    async fn delete_unconfirmed_for_user(&self, user_id: &str) -> StoreResult<u64>;

    /// Apply `transition` only if the stored status still equals `expected`.
    ///
    /// Returns `false` when the order is missing or its status has moved on.
    async fn transition(
        &self,
        id: Uuid,
        expected: OrderStatus,
        transition: &OrderTransition,
    ) -> StoreResult<bool>;
}
