use bazaar_catalog::{PricingError, Product};
use bazaar_core::{CouponRepository, Order, OrderRepository, OrderStatus, ProductRepository};
use bazaar_shared::Money;
use futures_util::future::try_join_all;
use std::sync::Arc;
use uuid::Uuid;

use crate::errors::OrderError;
use crate::models::{AllOrders, OrderDetails};

/// Read-only order views for customers and admins.
pub struct OrderQueries {
    orders: Arc<dyn OrderRepository>,
    products: Arc<dyn ProductRepository>,
    coupons: Arc<dyn CouponRepository>,
}

impl OrderQueries {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        products: Arc<dyn ProductRepository>,
        coupons: Arc<dyn CouponRepository>,
    ) -> Self {
        Self {
            orders,
            products,
            coupons,
        }
    }

    /// The user's confirmed orders, newest first.
    pub async fn get_orders(&self, user_id: &str) -> Result<Vec<OrderDetails>, OrderError> {
        let orders = self
            .orders
            .find_by_user_and_status(user_id, OrderStatus::Confirmed)
            .await?;

        try_join_all(orders.into_iter().map(|order| self.resolve(order))).await
    }

    pub async fn get_single_order(&self, id: Uuid) -> Result<OrderDetails, OrderError> {
        let order = self
            .orders
            .get_order(id)
            .await?
            .ok_or(OrderError::OrderNotFound(id))?;

        self.resolve(order).await
    }

    pub async fn get_all_orders(&self) -> Result<AllOrders, OrderError> {
        let orders = self.orders.list_orders().await?;

        let total_amount = orders
            .iter()
            .try_fold(Money::ZERO, |sum, order| sum.checked_add(order.amount_to_be_paid))
            .ok_or(PricingError::Overflow)?;

        Ok(AllOrders { total_amount, orders })
    }

    // Products removed from the catalog since the order was placed are skipped;
    // the order's own lines still carry name and price.
    async fn resolve(&self, order: Order) -> Result<OrderDetails, OrderError> {
        let coupon = match &order.coupon_code {
            Some(code) => self.coupons.get_coupon(code).await?,
            None => None,
        };

        let mut products: Vec<Product> = Vec::with_capacity(order.lines.len());
        for line in &order.lines {
            if let Some(product) = self.products.get_product(line.product_id).await? {
                products.push(product);
            }
        }

        Ok(OrderDetails {
            order,
            coupon,
            products,
        })
    }
}
