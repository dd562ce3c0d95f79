use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Percentage coupon attached to a cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Coupon {
    pub code: String,
    /// Percent of the pre-shipping grand total, e.g. `10` for 10%. Not capped at 100.
    pub discount_percent: Decimal,
    pub expiration_date: DateTime<Utc>,
}

impl Coupon {
    pub fn new(code: impl Into<String>, discount_percent: Decimal, expiration_date: DateTime<Utc>) -> Self {
        Self {
            code: code.into(),
            discount_percent,
            expiration_date,
        }
    }

    /// A coupon expiring exactly at `now` is still applicable.
    pub fn is_applicable_at(&self, now: DateTime<Utc>) -> bool {
        self.expiration_date >= now
    }
}
