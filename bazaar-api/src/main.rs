use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use bazaar_api::{app, AppState, Repositories};
use bazaar_core::PaymentGateway;
use bazaar_order::MockPaymentGateway;
use bazaar_store::{DbClient, HttpGatewayConfig, HttpPaymentGateway, InMemoryStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "bazaar_api=debug,bazaar_order=debug,tower_http=debug,axum::rejection=trace".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = bazaar_store::app_config::Config::load().context("Failed to load config")?;
    tracing::info!("Starting Bazaar API on port {}", config.server.port);

    let repos = match &config.database.url {
        Some(url) => {
            let db = DbClient::new(url).await.context("Failed to connect to Postgres")?;
            db.migrate().await.context("Failed to run migrations")?;
            Repositories::postgres(&db)
        }
        None => {
            tracing::warn!("No database.url configured, orders are kept in memory");
            Repositories::in_memory(Arc::new(InMemoryStore::new()))
        }
    };

    let gateway: Arc<dyn PaymentGateway> = if config.payment.mock {
        tracing::warn!("Using the mock payment gateway");
        Arc::new(MockPaymentGateway::new())
    } else {
        Arc::new(HttpPaymentGateway::new(HttpGatewayConfig {
            base_url: config.payment.base_url.clone(),
            key_id: config.payment.key_id.clone(),
            key_secret: config.payment.key_secret.clone(),
        }))
    };

    let app = app(AppState::new(repos, gateway, &config));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
