pub mod auth;
pub mod resiliency;

pub use auth::{admin_auth_middleware, customer_auth_middleware, AdminClaims, CustomerClaims};
pub use resiliency::{payment_circuit_middleware, CircuitBreaker};
