pub mod app_config;
pub mod catalog_repo;
pub mod database;
pub mod gateway;
pub mod memory;
pub mod order_repo;

pub use catalog_repo::StoreCatalogRepository;
pub use database::DbClient;
pub use gateway::{HttpGatewayConfig, HttpPaymentGateway};
pub use memory::InMemoryStore;
pub use order_repo::StoreOrderRepository;
