use bazaar_catalog::{CartLine, PricingEngine, Product};
use bazaar_core::{CartRepository, CouponRepository, Order, OrderRepository, ProductRepository};
use bazaar_shared::Masked;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::errors::OrderError;
use crate::models::OrderDetails;

/// Turns a user's cart into a fresh unconfirmed order.
///
/// A user holds at most one unconfirmed order: checkout first discards any
/// earlier one. Two concurrent checkouts for the same user are not
/// serialized, so the last one to write wins.
pub struct CheckoutOrchestrator {
    carts: Arc<dyn CartRepository>,
    products: Arc<dyn ProductRepository>,
    coupons: Arc<dyn CouponRepository>,
    orders: Arc<dyn OrderRepository>,
    pricing: PricingEngine,
}

impl CheckoutOrchestrator {
    pub fn new(
        carts: Arc<dyn CartRepository>,
        products: Arc<dyn ProductRepository>,
        coupons: Arc<dyn CouponRepository>,
        orders: Arc<dyn OrderRepository>,
        pricing: PricingEngine,
    ) -> Self {
        Self {
            carts,
            products,
            coupons,
            orders,
            pricing,
        }
    }

    #[instrument(skip(self, address))]
    pub async fn checkout(&self, user_id: &str, address: String) -> Result<OrderDetails, OrderError> {
        let discarded = self.orders.delete_unconfirmed_for_user(user_id).await?;
        if discarded > 0 {
            info!("Discarded {} unconfirmed order(s) for user {}", discarded, user_id);
        }

        let cart = self
            .carts
            .find_cart_for_user(user_id)
            .await?
            .filter(|cart| !cart.is_empty())
            .ok_or_else(|| OrderError::EmptyCart(user_id.to_string()))?;

        let mut lines = Vec::with_capacity(cart.items.len());
        for item in &cart.items {
            let product = self
                .products
                .get_product(item.product_id)
                .await?
                .ok_or(OrderError::ProductNotFound(item.product_id))?;
            lines.push(CartLine::new(product, item.quantity));
        }

        let coupon = match &cart.coupon_code {
            Some(code) => Some(
                self.coupons
                    .get_coupon(code)
                    .await?
                    .ok_or_else(|| OrderError::CouponNotFound(code.clone()))?,
            ),
            None => None,
        };

        let breakdown = self.pricing.price(&lines, coupon.as_ref(), Utc::now())?;

        let order = Order::unconfirmed(
            user_id,
            Masked::new(address),
            cart.coupon_code.clone(),
            breakdown,
            self.pricing.config().currency.clone(),
        );
        self.orders.create_order(&order).await?;

        info!(
            "Created unconfirmed order {} for user {}: {} to pay",
            order.id, user_id, order.amount_to_be_paid
        );

        let products: Vec<Product> = lines.into_iter().map(|line| line.product).collect();
        Ok(OrderDetails {
            order,
            coupon,
            products,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Fixture, USER};
    use bazaar_catalog::{Cart, Coupon};
    use bazaar_core::OrderStatus;
    use bazaar_shared::Money;
    use chrono::Duration;
    use rust_decimal::Decimal;

    async fn unconfirmed_count(fx: &Fixture) -> usize {
        fx.store
            .find_by_user_and_status(USER, OrderStatus::Unconfirmed)
            .await
            .unwrap()
            .len()
    }

    #[tokio::test]
    async fn test_reference_checkout() {
        let fx = Fixture::new().await;

        let details = fx.checkout().checkout(USER, "42 Market Road".to_string()).await.unwrap();
        let order = &details.order;

        assert_eq!(order.status, OrderStatus::Unconfirmed);
        assert_eq!(order.grand_total, Money::from_major(250).unwrap());
        assert_eq!(order.discount, Money::from_major(25).unwrap());
        assert_eq!(order.shipping_price, Money::from_major(10).unwrap());
        assert_eq!(order.amount_to_be_paid, Money::from_minor(23500));
        assert_eq!(order.currency, "INR");
        assert_eq!(order.address.expose(), "42 Market Road");
        assert_eq!(details.coupon.as_ref().map(|c| c.code.as_str()), Some("SAVE10"));
        assert_eq!(details.products.len(), 2);

        let stored = fx.stored(order).await;
        assert_eq!(&stored, order);
    }

    #[tokio::test]
    async fn test_checkout_reprices_from_current_product_price() {
        let fx = Fixture::new().await;
        fx.store.set_price(fx.a.id, Money::from_major(120).unwrap()).await.unwrap();

        let details = fx.checkout().checkout(USER, "addr".to_string()).await.unwrap();

        assert_eq!(details.order.grand_total, Money::from_major(290).unwrap());
        assert_eq!(details.order.lines[0].unit_price, Money::from_major(120).unwrap());
        assert_eq!(details.order.lines[0].line_total, Money::from_major(240).unwrap());
    }

    #[tokio::test]
    async fn test_second_checkout_replaces_first() {
        let fx = Fixture::new().await;
        let checkout = fx.checkout();

        let first = checkout.checkout(USER, "addr".to_string()).await.unwrap();
        let second = checkout.checkout(USER, "addr".to_string()).await.unwrap();

        assert_ne!(first.order.id, second.order.id);
        assert_eq!(unconfirmed_count(&fx).await, 1);
        assert!(fx.store.get_order(first.order.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_checkout_keeps_confirmed_orders() {
        let fx = Fixture::new().await;
        let confirmed = fx.order_in(OrderStatus::Confirmed).await;

        fx.checkout().checkout(USER, "addr".to_string()).await.unwrap();

        assert!(fx.store.get_order(confirmed.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_empty_cart_creates_no_order() {
        let fx = Fixture::new().await;
        fx.store.put_cart(Cart::new(USER)).await;

        let result = fx.checkout().checkout(USER, "addr".to_string()).await;

        assert!(matches!(result, Err(OrderError::EmptyCart(u)) if u == USER));
        assert_eq!(unconfirmed_count(&fx).await, 0);
    }

    #[tokio::test]
    async fn test_missing_cart_is_empty_cart() {
        let fx = Fixture::new().await;

        let result = fx.checkout().checkout("someone-else", "addr".to_string()).await;
        assert!(matches!(result, Err(OrderError::EmptyCart(_))));
        assert!(fx.store.list_orders().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_expired_coupon_fails_checkout() {
        let fx = Fixture::new().await;
        fx.store
            .insert_coupon(Coupon::new("OLD", Decimal::from(10), Utc::now() - Duration::days(1)))
            .await;
        let mut cart = Cart::new(USER).with_coupon("OLD");
        cart.add_item(&fx.a, 1);
        fx.store.put_cart(cart).await;

        let result = fx.checkout().checkout(USER, "addr".to_string()).await;

        assert!(matches!(result, Err(OrderError::Pricing(_))));
        assert_eq!(unconfirmed_count(&fx).await, 0);
    }

    #[tokio::test]
    async fn test_unknown_coupon_code() {
        let fx = Fixture::new().await;
        let mut cart = Cart::new(USER).with_coupon("NOPE");
        cart.add_item(&fx.a, 1);
        fx.store.put_cart(cart).await;

        let result = fx.checkout().checkout(USER, "addr".to_string()).await;
        assert!(matches!(result, Err(OrderError::CouponNotFound(c)) if c == "NOPE"));
    }

    #[tokio::test]
    async fn test_full_discount_pays_shipping_only() {
        let fx = Fixture::new().await;
        fx.store
            .insert_coupon(Coupon::new("FREE", Decimal::from(100), Utc::now() + Duration::days(1)))
            .await;
        let mut cart = Cart::new(USER).with_coupon("FREE");
        cart.add_item(&fx.a, 1);
        fx.store.put_cart(cart).await;

        let details = fx.checkout().checkout(USER, "addr".to_string()).await.unwrap();
        assert_eq!(details.order.amount_to_be_paid, details.order.shipping_price);
    }
}
