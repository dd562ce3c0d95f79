use async_trait::async_trait;
use bazaar_core::{
    GatewayOrder, GatewayOrderRequest, OrderRepository, OrderStatus, OrderTransition,
    PaymentGateway, PaymentGatewayError,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::errors::OrderError;
use crate::models::PlacedOrder;

/// Hands a user's pending order to the payment gateway and confirms it.
pub struct PaymentOrchestrator {
    orders: Arc<dyn OrderRepository>,
    gateway: Arc<dyn PaymentGateway>,
    timeout: Duration,
}

impl PaymentOrchestrator {
    pub fn new(orders: Arc<dyn OrderRepository>, gateway: Arc<dyn PaymentGateway>, timeout: Duration) -> Self {
        Self {
            orders,
            gateway,
            timeout,
        }
    }

    /// Create a gateway order for the user's unconfirmed order, then confirm it.
    ///
    /// The local order is only written after the gateway answers. Any gateway
    /// failure, including a timeout, leaves it unconfirmed and the call can be
    /// retried as is.
    #[instrument(skip(self))]
    pub async fn place_order(&self, user_id: &str) -> Result<PlacedOrder, OrderError> {
        let order = self
            .orders
            .find_by_user_and_status(user_id, OrderStatus::Unconfirmed)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| OrderError::NoPendingOrder(user_id.to_string()))?;

        if !order.amount_to_be_paid.is_positive() {
            return Err(OrderError::NonPayableAmount(order.amount_to_be_paid));
        }

        let request = GatewayOrderRequest {
            amount_minor_units: order.amount_to_be_paid.minor_units(),
            currency: order.currency.clone(),
            receipt: order.id.to_string(),
        };

        let gateway_order = match tokio::time::timeout(self.timeout, self.gateway.create_order(&request)).await {
            Ok(Ok(gateway_order)) => gateway_order,
            Ok(Err(e)) => {
                error!("Gateway order creation failed for order {}: {}", order.id, e);
                return Err(e.into());
            }
            Err(_) => {
                error!("Gateway did not answer within {:?} for order {}", self.timeout, order.id);
                return Err(PaymentGatewayError::Timeout(self.timeout).into());
            }
        };

        let confirm = OrderTransition::to(OrderStatus::Confirmed).with_gateway_order(gateway_order.id.clone());
        if !self.orders.transition(order.id, OrderStatus::Unconfirmed, &confirm).await? {
            warn!(
                "Order {} left UNCONFIRMED before gateway order {} could be attached",
                order.id, gateway_order.id
            );
            return Err(OrderError::ConcurrentModification(order.id));
        }

        info!("Order {} confirmed with gateway order {}", order.id, gateway_order.id);

        Ok(PlacedOrder {
            order_id: order.id,
            gateway_order_id: gateway_order.id,
            amount: order.amount_to_be_paid,
            currency: order.currency,
        })
    }
}

/// What the mock gateway does when asked for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockBehavior {
    Succeed,
    Fail,
    Stall(Duration),
}

/// In-process gateway for local runs and tests.
pub struct MockPaymentGateway {
    behavior: Mutex<MockBehavior>,
    calls: AtomicUsize,
    last_request: Mutex<Option<GatewayOrderRequest>>,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self::with_behavior(MockBehavior::Succeed)
    }

    pub fn with_behavior(behavior: MockBehavior) -> Self {
        Self {
            behavior: Mutex::new(behavior),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn set_behavior(&self, behavior: MockBehavior) {
        *self.behavior.lock().unwrap_or_else(|p| p.into_inner()) = behavior;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<GatewayOrderRequest> {
        self.last_request.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }
}

impl Default for MockPaymentGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_order(&self, request: &GatewayOrderRequest) -> Result<GatewayOrder, PaymentGatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap_or_else(|p| p.into_inner()) = Some(request.clone());

        let behavior = *self.behavior.lock().unwrap_or_else(|p| p.into_inner());
        match behavior {
            MockBehavior::Succeed => {}
            MockBehavior::Fail => {
                return Err(PaymentGatewayError::Rejected("Simulated gateway failure".to_string()));
            }
            MockBehavior::Stall(delay) => tokio::time::sleep(delay).await,
        }

        Ok(GatewayOrder {
            id: format!("mock_order_{}", Uuid::new_v4().simple()),
            amount_minor_units: request.amount_minor_units,
            currency: request.currency.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Fixture, USER};
    use bazaar_catalog::{Cart, Coupon};
    use bazaar_shared::Money;
    use chrono::{Duration as ChronoDuration, Utc};
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_place_order_confirms_with_gateway_id() {
        let fx = Fixture::new().await;
        let gateway = Arc::new(MockPaymentGateway::new());
        let details = fx.checkout().checkout(USER, "addr".to_string()).await.unwrap();

        let placed = fx.payments(gateway.clone()).place_order(USER).await.unwrap();

        assert_eq!(placed.order_id, details.order.id);
        assert_eq!(placed.amount, Money::from_minor(23500));
        assert!(placed.gateway_order_id.starts_with("mock_order_"));

        let stored = fx.stored(&details.order).await;
        assert_eq!(stored.status, OrderStatus::Confirmed);
        assert_eq!(stored.payment_gateway_order_id.as_deref(), Some(placed.gateway_order_id.as_str()));

        let request = gateway.last_request().unwrap();
        assert_eq!(request.amount_minor_units, 23500);
        assert_eq!(request.currency, "INR");
        assert_eq!(request.receipt, details.order.id.to_string());
    }

    #[tokio::test]
    async fn test_gateway_failure_keeps_order_retryable() {
        let fx = Fixture::new().await;
        let gateway = Arc::new(MockPaymentGateway::with_behavior(MockBehavior::Fail));
        let payments = fx.payments(gateway.clone());
        let details = fx.checkout().checkout(USER, "addr".to_string()).await.unwrap();

        let result = payments.place_order(USER).await;
        assert!(matches!(result, Err(OrderError::PaymentGateway(PaymentGatewayError::Rejected(_)))));

        let stored = fx.stored(&details.order).await;
        assert_eq!(stored.status, OrderStatus::Unconfirmed);
        assert!(stored.payment_gateway_order_id.is_none());

        gateway.set_behavior(MockBehavior::Succeed);
        payments.place_order(USER).await.unwrap();
        assert_eq!(fx.stored(&details.order).await.status, OrderStatus::Confirmed);
        assert_eq!(gateway.calls(), 2);
    }

    #[tokio::test]
    async fn test_gateway_timeout_keeps_order_unconfirmed() {
        let fx = Fixture::new().await;
        let gateway = Arc::new(MockPaymentGateway::with_behavior(MockBehavior::Stall(
            Duration::from_secs(5),
        )));
        let payments = PaymentOrchestrator::new(fx.store.clone(), gateway, Duration::from_millis(50));
        let details = fx.checkout().checkout(USER, "addr".to_string()).await.unwrap();

        let result = payments.place_order(USER).await;

        assert!(matches!(result, Err(OrderError::PaymentGateway(PaymentGatewayError::Timeout(_)))));
        assert_eq!(fx.stored(&details.order).await.status, OrderStatus::Unconfirmed);
    }

    #[tokio::test]
    async fn test_no_pending_order() {
        let fx = Fixture::new().await;
        let gateway = Arc::new(MockPaymentGateway::new());

        let result = fx.payments(gateway.clone()).place_order(USER).await;

        assert!(matches!(result, Err(OrderError::NoPendingOrder(u)) if u == USER));
        assert_eq!(gateway.calls(), 0);
    }

    #[tokio::test]
    async fn test_second_place_has_nothing_pending() {
        let fx = Fixture::new().await;
        let payments = fx.payments(Arc::new(MockPaymentGateway::new()));
        fx.checkout().checkout(USER, "addr".to_string()).await.unwrap();

        payments.place_order(USER).await.unwrap();
        let again = payments.place_order(USER).await;
        assert!(matches!(again, Err(OrderError::NoPendingOrder(_))));
    }

    #[tokio::test]
    async fn test_non_positive_amount_never_reaches_gateway() {
        let fx = Fixture::new().await;
        fx.store
            .insert_coupon(Coupon::new("HUGE", Decimal::from(150), Utc::now() + ChronoDuration::days(1)))
            .await;
        let mut cart = Cart::new(USER).with_coupon("HUGE");
        cart.add_item(&fx.a, 1);
        fx.store.put_cart(cart).await;
        let details = fx.checkout().checkout(USER, "addr".to_string()).await.unwrap();
        assert!(details.order.amount_to_be_paid.is_negative());

        let gateway = Arc::new(MockPaymentGateway::new());
        let result = fx.payments(gateway.clone()).place_order(USER).await;

        assert!(matches!(result, Err(OrderError::NonPayableAmount(_))));
        assert_eq!(gateway.calls(), 0);
        assert_eq!(fx.stored(&details.order).await.status, OrderStatus::Unconfirmed);
    }

    #[tokio::test]
    async fn test_checkout_place_ship_deliver() {
        let fx = Fixture::new().await;
        let lifecycle = fx.lifecycle();
        let details = fx.checkout().checkout(USER, "addr".to_string()).await.unwrap();
        let id = details.order.id;

        fx.payments(Arc::new(MockPaymentGateway::new())).place_order(USER).await.unwrap();
        lifecycle.update_order_status(id, OrderStatus::Shipped).await.unwrap();
        let delivered = lifecycle.update_order_status(id, OrderStatus::Delivered).await.unwrap();

        assert_eq!(delivered.status, OrderStatus::Delivered);
        assert!(delivered.payment_gateway_order_id.is_some());
        assert_eq!(fx.stock(&fx.a).await, 8);
        assert_eq!(fx.stock(&fx.b).await, 9);

        let again = lifecycle.update_order_status(id, OrderStatus::Shipped).await;
        assert!(matches!(again, Err(OrderError::AlreadyDelivered(_))));
        assert_eq!(fx.stock(&fx.a).await, 8);
    }
}
