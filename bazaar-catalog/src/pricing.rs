use bazaar_shared::Money;
use chrono::{DateTime, Utc};
use rust_decimal::{prelude::ToPrimitive, Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cart::CartLine;
use crate::coupon::Coupon;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Flat shipping rate added to every order.
    pub shipping_price: Money,

    /// ISO currency code the prices are expressed in.
    pub currency: String,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            shipping_price: Money::from_minor(1000),
            currency: "INR".to_string(),
        }
    }
}

/// One priced line, captured from the product's price at checkout time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PricedLine {
    pub product_id: Uuid,
    pub product_name: String,
    pub unit_price: Money,
    pub quantity: i64,
    pub line_total: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PriceBreakdown {
    pub lines: Vec<PricedLine>,
    pub grand_total: Money,
    pub discount: Money,
    pub shipping_price: Money,
    pub amount_to_be_paid: Money,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PricingError {
    #[error("Invalid quantity {quantity} for product {product_id}")]
    InvalidQuantity { product_id: Uuid, quantity: i64 },

    #[error("Coupon {0} has expired")]
    CouponExpired(String),

    #[error("Price calculation overflowed")]
    Overflow,
}

/// Computes order totals from resolved cart lines. Pure: no I/O, no clock reads.
pub struct PricingEngine {
    config: PricingConfig,
}

impl PricingEngine {
    pub fn new(config: PricingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// Price a cart.
    ///
    /// Line totals always use the product's *current* price, not the price cached
    /// in the cart. The coupon's expiry is checked against `now`; an expired coupon
    /// fails the whole calculation rather than being silently dropped.
    pub fn price(
        &self,
        lines: &[CartLine],
        coupon: Option<&Coupon>,
        now: DateTime<Utc>,
    ) -> Result<PriceBreakdown, PricingError> {
        let mut priced = Vec::with_capacity(lines.len());
        let mut grand_total = Money::ZERO;

        for line in lines {
            if line.quantity <= 0 {
                return Err(PricingError::InvalidQuantity {
                    product_id: line.product.id,
                    quantity: line.quantity,
                });
            }

            let line_total = line
                .product
                .price
                .checked_mul(line.quantity)
                .ok_or(PricingError::Overflow)?;
            grand_total = grand_total
                .checked_add(line_total)
                .ok_or(PricingError::Overflow)?;

            priced.push(PricedLine {
                product_id: line.product.id,
                product_name: line.product.name.clone(),
                unit_price: line.product.price,
                quantity: line.quantity,
                line_total,
            });
        }

        let discount = match coupon {
            Some(coupon) => {
                if !coupon.is_applicable_at(now) {
                    return Err(PricingError::CouponExpired(coupon.code.clone()));
                }
                percentage_of(grand_total, coupon.discount_percent)?
            }
            None => Money::ZERO,
        };

        let shipping_price = self.config.shipping_price;
        let amount_to_be_paid = grand_total
            .checked_add(shipping_price)
            .and_then(|total| total.checked_sub(discount))
            .ok_or(PricingError::Overflow)?;

        Ok(PriceBreakdown {
            lines: priced,
            grand_total,
            discount,
            shipping_price,
            amount_to_be_paid,
        })
    }
}

/// `percent`% of `amount`, rounded to a whole minor unit (half away from zero).
fn percentage_of(amount: Money, percent: Decimal) -> Result<Money, PricingError> {
    let exact = Decimal::from(amount.minor_units())
        .checked_mul(percent)
        .and_then(|scaled| scaled.checked_div(Decimal::ONE_HUNDRED))
        .ok_or(PricingError::Overflow)?;

    exact
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .map(Money::from_minor)
        .ok_or(PricingError::Overflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::Product;
    use chrono::Duration;

    fn engine() -> PricingEngine {
        PricingEngine::new(PricingConfig::default())
    }

    fn coupon(percent: Decimal) -> Coupon {
        Coupon::new("TEST", percent, Utc::now() + Duration::days(1))
    }

    fn sample_lines() -> Vec<CartLine> {
        vec![
            CartLine::new(Product::new("A", Money::from_major(100).unwrap(), 10), 2),
            CartLine::new(Product::new("B", Money::from_major(50).unwrap(), 10), 1),
        ]
    }

    #[test]
    fn test_reference_scenario() {
        let breakdown = engine()
            .price(&sample_lines(), Some(&coupon(Decimal::from(10))), Utc::now())
            .unwrap();

        assert_eq!(breakdown.grand_total, Money::from_major(250).unwrap());
        assert_eq!(breakdown.discount, Money::from_major(25).unwrap());
        assert_eq!(breakdown.shipping_price, Money::from_major(10).unwrap());
        assert_eq!(breakdown.amount_to_be_paid, Money::from_major(235).unwrap());
        assert_eq!(breakdown.lines[0].line_total, Money::from_major(200).unwrap());
        assert_eq!(breakdown.lines[1].line_total, Money::from_major(50).unwrap());
    }

    #[test]
    fn test_no_coupon_has_zero_discount() {
        let breakdown = engine().price(&sample_lines(), None, Utc::now()).unwrap();

        assert_eq!(breakdown.discount, Money::ZERO);
        assert_eq!(breakdown.amount_to_be_paid, Money::from_major(260).unwrap());
    }

    #[test]
    fn test_full_discount_leaves_only_shipping() {
        let breakdown = engine()
            .price(&sample_lines(), Some(&coupon(Decimal::from(100))), Utc::now())
            .unwrap();

        assert_eq!(breakdown.discount, breakdown.grand_total);
        assert_eq!(breakdown.amount_to_be_paid, breakdown.shipping_price);
    }

    #[test]
    fn test_discount_above_hundred_goes_negative() {
        let breakdown = engine()
            .price(&sample_lines(), Some(&coupon(Decimal::from(150))), Utc::now())
            .unwrap();

        // 250 + 10 - 375
        assert_eq!(breakdown.discount, Money::from_major(375).unwrap());
        assert_eq!(breakdown.amount_to_be_paid, Money::from_major(-115).unwrap());
        assert!(breakdown.amount_to_be_paid.is_negative());
    }

    #[test]
    fn test_zero_shipping_and_full_discount_is_zero() {
        let engine = PricingEngine::new(PricingConfig {
            shipping_price: Money::ZERO,
            currency: "INR".to_string(),
        });
        let breakdown = engine
            .price(&sample_lines(), Some(&coupon(Decimal::from(100))), Utc::now())
            .unwrap();

        assert_eq!(breakdown.amount_to_be_paid, Money::ZERO);
    }

    #[test]
    fn test_fractional_discount_rounds_to_minor_unit() {
        // 12.5% of 0.99 = 0.12375 -> 0.12
        let lines = vec![CartLine::new(Product::new("C", Money::from_minor(99), 1), 1)];
        let breakdown = engine()
            .price(&lines, Some(&coupon(Decimal::new(125, 1))), Utc::now())
            .unwrap();
        assert_eq!(breakdown.discount, Money::from_minor(12));

        // 50% of 0.05 = 0.025 -> 0.03
        let lines = vec![CartLine::new(Product::new("D", Money::from_minor(5), 1), 1)];
        let breakdown = engine()
            .price(&lines, Some(&coupon(Decimal::from(50))), Utc::now())
            .unwrap();
        assert_eq!(breakdown.discount, Money::from_minor(3));
    }

    #[test]
    fn test_uses_current_product_price() {
        let mut lines = sample_lines();
        lines[0].product.price = Money::from_major(120).unwrap();

        let breakdown = engine().price(&lines, None, Utc::now()).unwrap();
        assert_eq!(breakdown.grand_total, Money::from_major(290).unwrap());
    }

    #[test]
    fn test_expired_coupon_rejected() {
        let now = Utc::now();
        let expired = Coupon::new("OLD", Decimal::from(10), now - Duration::minutes(1));

        let result = engine().price(&sample_lines(), Some(&expired), now);
        assert_eq!(result, Err(PricingError::CouponExpired("OLD".to_string())));
    }

    #[test]
    fn test_non_positive_quantity_rejected() {
        let lines = vec![CartLine::new(Product::new("A", Money::from_minor(100), 1), 0)];
        let result = engine().price(&lines, None, Utc::now());
        assert!(matches!(result, Err(PricingError::InvalidQuantity { quantity: 0, .. })));
    }

    #[test]
    fn test_overflow_is_reported() {
        let lines = vec![CartLine::new(Product::new("A", Money::from_minor(i64::MAX), 1), 2)];
        let result = engine().price(&lines, None, Utc::now());
        assert_eq!(result, Err(PricingError::Overflow));
    }
}
