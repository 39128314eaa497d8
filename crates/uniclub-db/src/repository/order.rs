//! # Order Repository
//!
//! ```text
//! OrderDraft ──► create() ── BEGIN ── INSERT orders ── INSERT order_lines × n ── COMMIT
//!
//! update_status(id, next)   admin, any allowed move
//! cancel_for_user(id, user) shopper, PENDING only
//! ```
//!
//! Placing an order does not touch variant stock.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

use uniclub_core::checkout::{BillingDetails, OrderDraft};
use uniclub_core::{CoreError, Order, OrderLine, OrderStatus};

use crate::error::{DbError, DbResult};

const ORDER_COLUMNS: &str =
    "id, user_id, payment_method_id, note, status, subtotal, shipping_fee, total, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Stores the draft as a `PENDING` order.
    pub async fn create(&self, draft: &OrderDraft) -> DbResult<Order> {
        if draft.lines.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }

        let now = Utc::now();
        let billing = &draft.billing;
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO orders (
                user_id, payment_method_id, note, status,
                subtotal, shipping_fee, total,
                full_name, phone, email, address, province, district, ward,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?15)
            RETURNING {ORDER_COLUMNS}"
        );
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(draft.user_id)
            .bind(draft.payment_method_id)
            .bind(&draft.note)
            .bind(OrderStatus::Pending)
            .bind(draft.subtotal)
            .bind(draft.shipping_fee)
            .bind(draft.total)
            .bind(billing.full_name.trim())
            .bind(billing.phone.trim())
            .bind(billing.email.trim())
            .bind(billing.address.trim())
            .bind(billing.province.trim())
            .bind(billing.district.trim())
            .bind(billing.ward.trim())
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;

        for line in &draft.lines {
            sqlx::query(
                "INSERT INTO order_lines (order_id, variant_id, sku, quantity, unit_price)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .bind(order.id)
            .bind(line.variant_id)
            .bind(&line.sku)
            .bind(line.quantity)
            .bind(line.unit_price)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            order_id = order.id,
            user_id = order.user_id,
            lines = draft.lines.len(),
            total = %order.total,
            "Order placed"
        );
        Ok(order)
    }

    pub async fn get(&self, id: i64) -> DbResult<Option<Order>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1");
        Ok(sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn lines(&self, order_id: i64) -> DbResult<Vec<OrderLine>> {
        Ok(sqlx::query_as::<_, OrderLine>(
            "SELECT id, order_id, variant_id, sku, quantity, unit_price
             FROM order_lines WHERE order_id = ?1 ORDER BY id",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn billing(&self, order_id: i64) -> DbResult<Option<BillingDetails>> {
        Ok(sqlx::query_as::<_, BillingDetails>(
            "SELECT full_name, phone, email, address, province, district, ward
             FROM orders WHERE id = ?1",
        )
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    /// A shopper's orders, newest first.
    pub async fn list_for_user(&self, user_id: i64) -> DbResult<Vec<Order>> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = ?1 ORDER BY created_at DESC, id DESC"
        );
        Ok(sqlx::query_as::<_, Order>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?)
    }

    /// Every order, optionally narrowed to one status.
    pub async fn list(&self, status: Option<OrderStatus>) -> DbResult<Vec<Order>> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders
             WHERE ?1 IS NULL OR status = ?1
             ORDER BY created_at DESC, id DESC"
        );
        Ok(sqlx::query_as::<_, Order>(&sql)
            .bind(status)
            .fetch_all(&self.pool)
            .await?)
    }

    /// Admin status change, checked against the transition table.
    pub async fn update_status(&self, id: i64, next: OrderStatus) -> DbResult<Order> {
        let current = self
            .get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", id))?;
        current.status.transition(next)?;
        self.write_status(current, next).await
    }

    /// Shopper cancellation: only their own order, only while `PENDING`.
    pub async fn cancel_for_user(&self, id: i64, user_id: i64) -> DbResult<Order> {
        let current = self
            .get(id)
            .await?
            .filter(|o| o.user_id == user_id)
            .ok_or_else(|| DbError::not_found("Order", id))?;

        if !current.status.customer_can_cancel() {
            return Err(CoreError::InvalidStatusTransition {
                entity: "order",
                from: current.status.to_string(),
                to: OrderStatus::Cancelled.to_string(),
            }
            .into());
        }
        self.write_status(current, OrderStatus::Cancelled).await
    }

    async fn write_status(&self, current: Order, next: OrderStatus) -> DbResult<Order> {
        let sql = format!(
            "UPDATE orders SET status = ?2, updated_at = ?3
             WHERE id = ?1 AND status = ?4
             RETURNING {ORDER_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Order>(&sql)
            .bind(current.id)
            .bind(next)
            .bind(Utc::now())
            .bind(current.status)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| CoreError::InvalidStatusTransition {
                entity: "order",
                from: current.status.to_string(),
                to: next.to_string(),
            })?;

        info!(order_id = current.id, from = %current.status, to = %next, "Order status changed");
        Ok(updated)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
