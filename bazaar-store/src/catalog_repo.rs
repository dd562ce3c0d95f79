use async_trait::async_trait;
use bazaar_catalog::{Cart, CartItem, Coupon, Product};
use bazaar_core::{
    CartRepository, CouponRepository, ProductRepository, StockDecrement, StoreError, StoreResult,
};
use bazaar_shared::Money;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

/// Postgres-backed products, coupons and carts.
pub struct StoreCatalogRepository {
    pool: PgPool,
}

impl StoreCatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal structs for type-safe querying
#[derive(sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    price_minor: i64,
    stock: i64,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price: Money::from_minor(row.price_minor),
            stock: row.stock,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CouponRow {
    code: String,
    discount_percent: Decimal,
    expiration_date: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct CartItemRow {
    product_id: Uuid,
    quantity: i64,
    unit_price_minor: i64,
}

#[async_trait]
impl ProductRepository for StoreCatalogRepository {
    async fn get_product(&self, id: Uuid) -> StoreResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(
            "SELECT id, name, description, price_minor, stock FROM products WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(row.map(Product::from))
    }

    async fn decrement_stock(&self, id: Uuid, quantity: i64) -> StoreResult<StockDecrement> {
        // Single statement: the stock check and the write cannot interleave with another order.
        let remaining: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE products SET stock = stock - $2, updated_at = NOW()
            WHERE id = $1 AND stock >= $2
            RETURNING stock
            "#,
        )
        .bind(id)
        .bind(quantity)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        if let Some(remaining) = remaining {
            return Ok(StockDecrement::Applied { remaining });
        }

        let available: Option<i64> = sqlx::query_scalar("SELECT stock FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::backend)?;

        Ok(match available {
            Some(available) => StockDecrement::Insufficient { available },
            None => StockDecrement::NotFound,
        })
    }

    async fn increment_stock(&self, id: Uuid, quantity: i64) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE products SET stock = stock + $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(quantity)
        .execute(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("product {}", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl CouponRepository for StoreCatalogRepository {
    async fn get_coupon(&self, code: &str) -> StoreResult<Option<Coupon>> {
        let row = sqlx::query_as::<_, CouponRow>(
            "SELECT code, discount_percent, expiration_date FROM coupons WHERE code = $1",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(row.map(|r| Coupon::new(r.code, r.discount_percent, r.expiration_date)))
    }
}

#[async_trait]
impl CartRepository for StoreCatalogRepository {
    async fn find_cart_for_user(&self, user_id: &str) -> StoreResult<Option<Cart>> {
        let coupon_code: Option<Option<String>> =
            sqlx::query_scalar("SELECT coupon_code FROM carts WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(StoreError::backend)?;

        let Some(coupon_code) = coupon_code else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, CartItemRow>(
            r#"
            SELECT product_id, quantity, unit_price_minor
            FROM cart_items
            WHERE user_id = $1
            ORDER BY position
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(Some(Cart {
            user_id: user_id.to_string(),
            items: items
                .into_iter()
                .map(|item| CartItem {
                    product_id: item.product_id,
                    quantity: item.quantity,
                    unit_price_at_add: Money::from_minor(item.unit_price_minor),
                })
                .collect(),
            coupon_code,
        }))
    }
}
