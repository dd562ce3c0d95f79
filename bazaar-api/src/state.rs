use std::sync::Arc;
use std::time::Duration;

use bazaar_catalog::{PricingConfig, PricingEngine};
use bazaar_core::{CartRepository, CouponRepository, OrderRepository, PaymentGateway, ProductRepository};
use bazaar_order::{CheckoutOrchestrator, OrderLifecycle, OrderQueries, PaymentOrchestrator, StockAdjuster};
use bazaar_shared::Money;
use bazaar_store::app_config::Config;
use bazaar_store::{DbClient, InMemoryStore, StoreCatalogRepository, StoreOrderRepository};

use crate::middleware::resiliency::CircuitBreaker;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
}

/// The storage collaborators the order services are built on.
#[derive(Clone)]
pub struct Repositories {
    pub products: Arc<dyn ProductRepository>,
    pub carts: Arc<dyn CartRepository>,
    pub coupons: Arc<dyn CouponRepository>,
    pub orders: Arc<dyn OrderRepository>,
}

impl Repositories {
    pub fn in_memory(store: Arc<InMemoryStore>) -> Self {
        Self {
            products: store.clone(),
            carts: store.clone(),
            coupons: store.clone(),
            orders: store,
        }
    }

    pub fn postgres(db: &DbClient) -> Self {
        let catalog = Arc::new(StoreCatalogRepository::new(db.pool.clone()));
        Self {
            products: catalog.clone(),
            carts: catalog.clone(),
            coupons: catalog,
            orders: Arc::new(StoreOrderRepository::new(db.pool.clone())),
        }
    }
}

pub struct ResiliencyState {
    pub payment_cb: CircuitBreaker,
}

#[derive(Clone)]
pub struct AppState {
    pub checkout: Arc<CheckoutOrchestrator>,
    pub payments: Arc<PaymentOrchestrator>,
    pub lifecycle: Arc<OrderLifecycle>,
    pub queries: Arc<OrderQueries>,
    pub auth: AuthConfig,
    pub resiliency: Arc<ResiliencyState>,
}

impl AppState {
    pub fn new(repos: Repositories, gateway: Arc<dyn PaymentGateway>, config: &Config) -> Self {
        let pricing = PricingEngine::new(PricingConfig {
            shipping_price: Money::from_minor(config.business_rules.shipping_price_minor),
            currency: config.business_rules.currency.clone(),
        });

        let checkout = CheckoutOrchestrator::new(
            repos.carts.clone(),
            repos.products.clone(),
            repos.coupons.clone(),
            repos.orders.clone(),
            pricing,
        );
        let payments = PaymentOrchestrator::new(
            repos.orders.clone(),
            gateway,
            Duration::from_millis(config.payment.timeout_ms),
        );
        let lifecycle = OrderLifecycle::new(repos.orders.clone(), StockAdjuster::new(repos.products.clone()));
        let queries = OrderQueries::new(repos.orders, repos.products, repos.coupons);

        Self {
            checkout: Arc::new(checkout),
            payments: Arc::new(payments),
            lifecycle: Arc::new(lifecycle),
            queries: Arc::new(queries),
            auth: AuthConfig {
                secret: config.auth.jwt_secret.clone(),
            },
            resiliency: Arc::new(ResiliencyState {
                payment_cb: CircuitBreaker::new(
                    "payment",
                    config.resiliency.payment_failure_threshold,
                    Duration::from_secs(config.resiliency.payment_reset_seconds),
                ),
            }),
        }
    }
}
