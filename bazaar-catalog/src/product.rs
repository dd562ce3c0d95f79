use bazaar_shared::Money;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A sellable product with its current price and stock counter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Money,
    pub stock: i64,
}

impl Product {
    pub fn new(name: impl Into<String>, price: Money, stock: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            price,
            stock,
        }
    }

    pub fn has_stock_for(&self, quantity: i64) -> bool {
        self.stock >= quantity
    }
}
