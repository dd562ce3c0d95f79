use bazaar_core::{OrderLine, ProductRepository, StockDecrement};
use futures_util::future::try_join_all;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::errors::OrderError;

/// Applies inventory decrements when goods leave the warehouse.
///
/// Each single decrement is a compare-and-decrement in the product store, so two
/// orders depleting the same product cannot both see the old stock value.
pub struct StockAdjuster {
    products: Arc<dyn ProductRepository>,
}

impl StockAdjuster {
    pub fn new(products: Arc<dyn ProductRepository>) -> Self {
        Self { products }
    }

    /// Decrement one product's stock. Returns the remaining stock.
    ///
    /// `quantity` must be positive; stock is only ever added back through `restock_all`.
    pub async fn decrement(&self, product_id: Uuid, quantity: i64) -> Result<i64, OrderError> {
        if quantity <= 0 {
            return Err(OrderError::InvalidQuantity { product_id, quantity });
        }

        match self.products.decrement_stock(product_id, quantity).await? {
            StockDecrement::Applied { remaining } => {
                info!("Decremented stock for product {} by {}: {} left", product_id, quantity, remaining);
                Ok(remaining)
            }
            StockDecrement::Insufficient { available } => Err(OrderError::InsufficientStock {
                product_id,
                requested: quantity,
                available,
            }),
            StockDecrement::NotFound => Err(OrderError::ProductNotFound(product_id)),
        }
    }

    /// Verify every product can cover the order's total demand for it, without
    /// touching stock. Lookups run concurrently.
    pub async fn check_available(&self, lines: &[OrderLine]) -> Result<(), OrderError> {
        let demand = demand_per_product(lines)?;

        let lookups = demand.iter().map(|(&product_id, &requested)| {
            let products = Arc::clone(&self.products);
            async move {
                let product = products
                    .get_product(product_id)
                    .await?
                    .ok_or(OrderError::ProductNotFound(product_id))?;

                if !product.has_stock_for(requested) {
                    return Err(OrderError::InsufficientStock {
                        product_id,
                        requested,
                        available: product.stock,
                    });
                }
                Ok::<(), OrderError>(())
            }
        });

        try_join_all(lookups).await?;
        Ok(())
    }

    /// Decrement stock for every line, in order.
    ///
    /// All-or-nothing: if any line fails, the lines already decremented are put
    /// back before the error is returned. On success returns the applied
    /// `(product, quantity)` pairs so the caller can undo them later.
    pub async fn decrement_all(&self, lines: &[OrderLine]) -> Result<Vec<(Uuid, i64)>, OrderError> {
        let mut applied = Vec::with_capacity(lines.len());

        for line in lines {
            match self.decrement(line.product_id, line.quantity).await {
                Ok(_) => applied.push((line.product_id, line.quantity)),
                Err(err) => {
                    warn!(
                        "Stock decrement failed for product {} ({}), rolling back {} line(s)",
                        line.product_id,
                        err,
                        applied.len()
                    );
                    self.restock_all(&applied).await;
                    return Err(err);
                }
            }
        }

        Ok(applied)
    }

    /// Compensate previously applied decrements. Failures are logged, not returned:
    /// the caller is already on an error path.
    pub async fn restock_all(&self, applied: &[(Uuid, i64)]) {
        for &(product_id, quantity) in applied.iter().rev() {
            if let Err(e) = self.products.increment_stock(product_id, quantity).await {
                error!("Failed to restock product {} by {}: {}", product_id, quantity, e);
            }
        }
    }
}

fn demand_per_product(lines: &[OrderLine]) -> Result<BTreeMap<Uuid, i64>, OrderError> {
    let mut demand = BTreeMap::new();
    for line in lines {
        let invalid = || OrderError::InvalidQuantity {
            product_id: line.product_id,
            quantity: line.quantity,
        };
        if line.quantity <= 0 {
            return Err(invalid());
        }

        let total = demand.entry(line.product_id).or_insert(0i64);
        *total = total.checked_add(line.quantity).ok_or_else(invalid)?;
    }
    Ok(demand)
}
