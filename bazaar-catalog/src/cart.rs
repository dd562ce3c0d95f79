use bazaar_shared::Money;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::product::Product;

/// A user's cart as the cart subsystem stores it. Read-only input to checkout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cart {
    pub user_id: String,
    pub items: Vec<CartItem>,
    pub coupon_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CartItem {
    pub product_id: Uuid,
    pub quantity: i64,
    /// Price when the item was added. Informational only; checkout reprices.
    pub unit_price_at_add: Money,
}

impl Cart {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            items: Vec::new(),
            coupon_code: None,
        }
    }

    pub fn add_item(&mut self, product: &Product, quantity: i64) {
        self.items.push(CartItem {
            product_id: product.id,
            quantity,
            unit_price_at_add: product.price,
        });
    }

    pub fn with_coupon(mut self, code: impl Into<String>) -> Self {
        self.coupon_code = Some(code.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A cart item with its product resolved from the product store.
#[derive(Debug, Clone)]
pub struct CartLine {
    pub product: Product,
    pub quantity: i64,
}

impl CartLine {
    pub fn new(product: Product, quantity: i64) -> Self {
        Self { product, quantity }
    }
}
