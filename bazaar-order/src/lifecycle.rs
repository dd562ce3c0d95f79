use bazaar_core::{Order, OrderRepository, OrderStatus, OrderTransition};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::OrderError;
use crate::inventory::StockAdjuster;
use crate::locks::OrderLocks;

/// Admin-driven order state machine.
///
/// Statuses only move forward (`OrderStatus` ordering). Crossing into
/// `Shipped` takes the order's lines out of stock; reaching `Delivered`
/// stamps the delivery time. A delivered order is never touched again.
pub struct OrderLifecycle {
    orders: Arc<dyn OrderRepository>,
    stock: StockAdjuster,
    locks: OrderLocks,
}

impl OrderLifecycle {
    pub fn new(orders: Arc<dyn OrderRepository>, stock: StockAdjuster) -> Self {
        Self {
            orders,
            stock,
            locks: OrderLocks::new(),
        }
    }

    /// Parse `status` and apply it. Unknown values fail with `InvalidStatus`
    /// before the order is even loaded.
    pub async fn update_order_status_str(&self, id: Uuid, status: &str) -> Result<Order, OrderError> {
        let target: OrderStatus = status.parse()?;
        self.update_order_status(id, target).await
    }

    /// Move an order to `target`.
    ///
    /// Requesting the status the order already has is a successful no-op, so a
    /// retried "ship" request never decrements stock twice.
    #[instrument(skip(self))]
    pub async fn update_order_status(&self, id: Uuid, target: OrderStatus) -> Result<Order, OrderError> {
        let _guard = self.locks.acquire(id).await;

        let mut order = self
            .orders
            .get_order(id)
            .await?
            .ok_or(OrderError::OrderNotFound(id))?;
        let current = order.status;

        if current.is_terminal() {
            return Err(OrderError::AlreadyDelivered(id));
        }

        if current == target {
            info!("Order {} already {}, nothing to do", id, target);
            return Ok(order);
        }

        // Confirmation happens through payment handoff, never by hand.
        if current == OrderStatus::Unconfirmed || target < current {
            return Err(OrderError::InvalidTransition { from: current, to: target });
        }

        let applied = if current < OrderStatus::Shipped && target >= OrderStatus::Shipped {
            self.stock.check_available(&order.lines).await?;
            self.stock.decrement_all(&order.lines).await?
        } else {
            Vec::new()
        };

        let mut transition = OrderTransition::to(target);
        if target == OrderStatus::Delivered {
            transition = transition.with_delivered_at(Utc::now());
        }

        match self.orders.transition(id, current, &transition).await {
            Ok(true) => {}
            Ok(false) => {
                warn!("Order {} changed underneath a {} -> {} transition", id, current, target);
                self.stock.restock_all(&applied).await;
                return Err(OrderError::ConcurrentModification(id));
            }
            Err(e) => {
                self.stock.restock_all(&applied).await;
                return Err(e.into());
            }
        }

        order.apply(&transition);
        info!("Order {} moved from {} to {}", id, current, target);
        Ok(order)
    }
}
