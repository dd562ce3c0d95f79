use bazaar_catalog::{Cart, Coupon, PriceBreakdown, PricingConfig, PricingEngine, Product};
use bazaar_core::{Order, OrderLine, OrderRepository, OrderStatus};
use bazaar_shared::{Masked, Money};
use bazaar_store::InMemoryStore;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::checkout::CheckoutOrchestrator;
use crate::inventory::StockAdjuster;
use crate::lifecycle::OrderLifecycle;
use crate::orchestrator::PaymentOrchestrator;
use crate::queries::OrderQueries;

pub const USER: &str = "user-1";
pub const COUPON: &str = "SAVE10";

pub fn line_for(product: &Product, quantity: i64) -> OrderLine {
    OrderLine {
        product_id: product.id,
        product_name: product.name.clone(),
        unit_price: product.price,
        quantity,
        line_total: product.price.checked_mul(quantity).unwrap(),
    }
}

/// Store seeded with the reference basket: 2 x A @ 100.00, 1 x B @ 50.00,
/// both with 10 units in stock, plus a live 10% coupon on the cart.
pub struct Fixture {
    pub store: Arc<InMemoryStore>,
    pub a: Product,
    pub b: Product,
}

impl Fixture {
    pub async fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let a = Product::new("A", Money::from_major(100).unwrap(), 10);
        let b = Product::new("B", Money::from_major(50).unwrap(), 10);
        store.insert_product(a.clone()).await;
        store.insert_product(b.clone()).await;

        store
            .insert_coupon(Coupon::new(COUPON, Decimal::from(10), Utc::now() + Duration::days(1)))
            .await;

        let mut cart = Cart::new(USER).with_coupon(COUPON);
        cart.add_item(&a, 2);
        cart.add_item(&b, 1);
        store.put_cart(cart).await;

        Self { store, a, b }
    }

    pub fn checkout(&self) -> CheckoutOrchestrator {
        CheckoutOrchestrator::new(
            self.store.clone(),
            self.store.clone(),
            self.store.clone(),
            self.store.clone(),
            PricingEngine::new(PricingConfig::default()),
        )
    }

    pub fn lifecycle(&self) -> OrderLifecycle {
        OrderLifecycle::new(self.store.clone(), StockAdjuster::new(self.store.clone()))
    }

    pub fn queries(&self) -> OrderQueries {
        OrderQueries::new(self.store.clone(), self.store.clone(), self.store.clone())
    }

    pub fn payments(&self, gateway: Arc<dyn bazaar_core::PaymentGateway>) -> PaymentOrchestrator {
        PaymentOrchestrator::new(self.store.clone(), gateway, std::time::Duration::from_secs(10))
    }

    /// Store an order for the reference basket directly in `status`.
    pub async fn order_in(&self, status: OrderStatus) -> Order {
        self.order_with_lines(status, vec![line_for(&self.a, 2), line_for(&self.b, 1)])
            .await
    }

    pub async fn order_with_lines(&self, status: OrderStatus, lines: Vec<OrderLine>) -> Order {
        let grand_total = lines
            .iter()
            .try_fold(Money::ZERO, |acc, l| acc.checked_add(l.line_total))
            .unwrap();
        let shipping = Money::from_minor(1000);

        let mut order = Order::unconfirmed(
            USER,
            Masked::new("42 Market Road".to_string()),
            None,
            PriceBreakdown {
                lines: vec![],
                grand_total,
                discount: Money::ZERO,
                shipping_price: shipping,
                amount_to_be_paid: grand_total.checked_add(shipping).unwrap(),
            },
            "INR",
        );
        order.lines = lines;
        order.status = status;
        self.store.create_order(&order).await.unwrap();
        order
    }

    pub async fn stock(&self, product: &Product) -> i64 {
        use bazaar_core::ProductRepository;
        self.store.get_product(product.id).await.unwrap().unwrap().stock
    }

    pub async fn stored(&self, order: &Order) -> Order {
        self.store.get_order(order.id).await.unwrap().unwrap()
    }
}
