use async_trait::async_trait;
use bazaar_core::{
    Order, OrderLine, OrderRepository, OrderStatus, OrderTransition, StoreError, StoreResult,
};
use bazaar_shared::{Masked, Money};
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

pub struct StoreOrderRepository {
    pool: PgPool,
}

impl StoreOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const ORDER_COLUMNS: &str = "id, user_id, lines, address, coupon_code, grand_total_minor, \
    discount_minor, shipping_price_minor, amount_to_be_paid_minor, currency, \
    payment_gateway_order_id, status, created_at, updated_at, delivered_at";

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    user_id: String,
    lines: Json<Vec<OrderLine>>,
    address: String,
    coupon_code: Option<String>,
    grand_total_minor: i64,
    discount_minor: i64,
    shipping_price_minor: i64,
    amount_to_be_paid_minor: i64,
    currency: String,
    payment_gateway_order_id: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    delivered_at: Option<DateTime<Utc>>,
}

impl TryFrom<OrderRow> for Order {
    type Error = StoreError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<OrderStatus>().map_err(StoreError::backend)?;

        Ok(Order {
            id: row.id,
            user_id: row.user_id,
            lines: row.lines.0,
            address: Masked::new(row.address),
            coupon_code: row.coupon_code,
            grand_total: Money::from_minor(row.grand_total_minor),
            discount: Money::from_minor(row.discount_minor),
            shipping_price: Money::from_minor(row.shipping_price_minor),
            amount_to_be_paid: Money::from_minor(row.amount_to_be_paid_minor),
            currency: row.currency,
            payment_gateway_order_id: row.payment_gateway_order_id,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
            delivered_at: row.delivered_at,
        })
    }
}

fn into_orders(rows: Vec<OrderRow>) -> StoreResult<Vec<Order>> {
    rows.into_iter().map(Order::try_from).collect()
}

#[async_trait]
impl OrderRepository for StoreOrderRepository {
    async fn create_order(&self, order: &Order) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO orders (id, user_id, lines, address, coupon_code, grand_total_minor,
                discount_minor, shipping_price_minor, amount_to_be_paid_minor, currency,
                payment_gateway_order_id, status, created_at, updated_at, delivered_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(order.id)
        .bind(&order.user_id)
        .bind(Json(&order.lines))
        .bind(order.address.expose())
        .bind(&order.coupon_code)
        .bind(order.grand_total.minor_units())
        .bind(order.discount.minor_units())
        .bind(order.shipping_price.minor_units())
        .bind(order.amount_to_be_paid.minor_units())
        .bind(&order.currency)
        .bind(&order.payment_gateway_order_id)
        .bind(order.status.as_str())
        .bind(order.created_at)
        .bind(order.updated_at)
        .bind(order.delivered_at)
        .execute(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(())
    }

    async fn get_order(&self, id: Uuid) -> StoreResult<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {} FROM orders WHERE id = $1",
            ORDER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        row.map(Order::try_from).transpose()
    }

    async fn list_orders(&self) -> StoreResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {} FROM orders ORDER BY created_at DESC",
            ORDER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        into_orders(rows)
    }

    async fn find_by_user_and_status(
        &self,
        user_id: &str,
        status: OrderStatus,
    ) -> StoreResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {} FROM orders WHERE user_id = $1 AND status = $2 ORDER BY created_at DESC",
            ORDER_COLUMNS
        ))
        .bind(user_id)
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        into_orders(rows)
    }

    async fn delete_unconfirmed_for_user(&self, user_id: &str) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM orders WHERE user_id = $1 AND status = $2")
            .bind(user_id)
            .bind(OrderStatus::Unconfirmed.as_str())
            .execute(&self.pool)
            .await
            .map_err(StoreError::backend)?;

        Ok(result.rows_affected())
    }

    async fn transition(
        &self,
        id: Uuid,
        expected: OrderStatus,
        transition: &OrderTransition,
    ) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET status = $3,
                payment_gateway_order_id = COALESCE($4, payment_gateway_order_id),
                delivered_at = COALESCE($5, delivered_at),
                updated_at = NOW()
            WHERE id = $1 AND status = $2
            "#,
        )
        .bind(id)
        .bind(expected.as_str())
        .bind(transition.status.as_str())
        .bind(&transition.payment_gateway_order_id)
        .bind(transition.delivered_at)
        .execute(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(result.rows_affected() == 1)
    }
}
