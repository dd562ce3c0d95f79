pub mod cart;
pub mod coupon;
pub mod pricing;
pub mod product;

pub use cart::{Cart, CartItem, CartLine};
pub use coupon::Coupon;
pub use pricing::{PriceBreakdown, PricedLine, PricingConfig, PricingEngine, PricingError};
pub use product::Product;
