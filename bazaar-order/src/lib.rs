pub mod checkout;
pub mod errors;
pub mod inventory;
pub mod lifecycle;
mod locks;
pub mod models;
pub mod orchestrator;
pub mod queries;

#[cfg(test)]
mod test_support;

pub use checkout::CheckoutOrchestrator;
pub use errors::OrderError;
pub use inventory::StockAdjuster;
pub use lifecycle::OrderLifecycle;
pub use models::{AllOrders, OrderDetails, PlacedOrder};
pub use orchestrator::{MockBehavior, MockPaymentGateway, PaymentOrchestrator};
pub use queries::OrderQueries;
