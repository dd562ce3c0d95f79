use async_trait::async_trait;
use bazaar_catalog::{Cart, Coupon, Product};
use bazaar_core::{
    CartRepository, CouponRepository, Order, OrderRepository, OrderStatus, OrderTransition,
    ProductRepository, StockDecrement, StoreError, StoreResult,
};
use bazaar_shared::Money;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory implementation of every store the order services consume.
///
/// Each map sits behind its own lock; a write lock makes the conditional
/// updates (stock decrement, status transition) atomic.
#[derive(Default)]
pub struct InMemoryStore {
    products: RwLock<HashMap<Uuid, Product>>,
    carts: RwLock<HashMap<String, Cart>>,
    coupons: RwLock<HashMap<String, Coupon>>,
    orders: RwLock<HashMap<Uuid, Order>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_product(&self, product: Product) {
        self.products.write().await.insert(product.id, product);
    }

    pub async fn set_price(&self, id: Uuid, price: Money) -> StoreResult<()> {
        let mut products = self.products.write().await;
        let product = products
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("product {}", id)))?;
        product.price = price;
        Ok(())
    }

    pub async fn put_cart(&self, cart: Cart) {
        self.carts.write().await.insert(cart.user_id.clone(), cart);
    }

    pub async fn insert_coupon(&self, coupon: Coupon) {
        self.coupons.write().await.insert(coupon.code.clone(), coupon);
    }
}

#[async_trait]
impl ProductRepository for InMemoryStore {
    async fn get_product(&self, id: Uuid) -> StoreResult<Option<Product>> {
        Ok(self.products.read().await.get(&id).cloned())
    }

    async fn decrement_stock(&self, id: Uuid, quantity: i64) -> StoreResult<StockDecrement> {
        let mut products = self.products.write().await;
        let Some(product) = products.get_mut(&id) else {
            return Ok(StockDecrement::NotFound);
        };

        if product.stock < quantity {
            return Ok(StockDecrement::Insufficient {
                available: product.stock,
            });
        }

        product.stock -= quantity;
        Ok(StockDecrement::Applied {
            remaining: product.stock,
        })
    }

    async fn increment_stock(&self, id: Uuid, quantity: i64) -> StoreResult<()> {
        let mut products = self.products.write().await;
        let product = products
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("product {}", id)))?;
        product.stock += quantity;
        Ok(())
    }
}

#[async_trait]
impl CartRepository for InMemoryStore {
    async fn find_cart_for_user(&self, user_id: &str) -> StoreResult<Option<Cart>> {
        Ok(self.carts.read().await.get(user_id).cloned())
    }
}

#[async_trait]
impl CouponRepository for InMemoryStore {
    async fn get_coupon(&self, code: &str) -> StoreResult<Option<Coupon>> {
        Ok(self.coupons.read().await.get(code).cloned())
    }
}

#[async_trait]
impl OrderRepository for InMemoryStore {
    async fn create_order(&self, order: &Order) -> StoreResult<()> {
        let mut orders = self.orders.write().await;
        if orders.contains_key(&order.id) {
            return Err(StoreError::Conflict(format!("order {} already exists", order.id)));
        }
        orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn get_order(&self, id: Uuid) -> StoreResult<Option<Order>> {
        Ok(self.orders.read().await.get(&id).cloned())
    }

    async fn list_orders(&self) -> StoreResult<Vec<Order>> {
        let mut orders: Vec<Order> = self.orders.read().await.values().cloned().collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn find_by_user_and_status(
        &self,
        user_id: &str,
        status: OrderStatus,
    ) -> StoreResult<Vec<Order>> {
        let mut orders: Vec<Order> = self
            .orders
            .read()
            .await
            .values()
            .filter(|o| o.user_id == user_id && o.status == status)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn delete_unconfirmed_for_user(&self, user_id: &str) -> StoreResult<u64> {
        let mut orders = self.orders.write().await;
        let before = orders.len();
        orders.retain(|_, o| !(o.user_id == user_id && o.status == OrderStatus::Unconfirmed));
        Ok((before - orders.len()) as u64)
    }

    async fn transition(
        &self,
        id: Uuid,
        expected: OrderStatus,
        transition: &OrderTransition,
    ) -> StoreResult<bool> {
        let mut orders = self.orders.write().await;
        match orders.get_mut(&id) {
            Some(order) if order.status == expected => {
                order.apply(transition);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
