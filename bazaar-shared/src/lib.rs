pub mod money;
pub mod pii;

pub use money::Money;
pub use pii::Masked;
