//! # Order Commands
//!
//! Shopper side: history, detail, cancel while pending.
//! Admin side: list and move through the status table.

use serde::Serialize;
use tracing::info;

use uniclub_core::checkout::BillingDetails;
use uniclub_core::{Order, OrderLine, OrderStatus};

use crate::error::{ApiError, ApiResult};
use crate::state::{DbState, SessionState};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    pub order: Order,
    pub lines: Vec<OrderLine>,
    pub billing: BillingDetails,
    /// Whether the shopper may still cancel.
    pub cancellable: bool,
}

/// The signed-in shopper's orders, newest first.
pub async fn my_orders(db: &DbState, session: &SessionState) -> ApiResult<Vec<Order>> {
    let user = session.require_user()?;
    Ok(db.inner().orders().list_for_user(user.id).await?)
}

/// One of the shopper's own orders. Other shoppers' orders read as missing.
pub async fn order_detail(
    db: &DbState,
    session: &SessionState,
    order_id: i64,
) -> ApiResult<OrderDetail> {
    let user = session.require_user()?;
    let orders = db.inner().orders();

    let order = orders
        .get(order_id)
        .await?
        .filter(|o| o.user_id == user.id)
        .ok_or_else(|| ApiError::not_found("Order", order_id))?;
    let billing = orders
        .billing(order_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Order", order_id))?;

    Ok(OrderDetail {
        lines: orders.lines(order_id).await?,
        cancellable: order.status.customer_can_cancel(),
        billing,
        order,
    })
}

pub async fn cancel_order(db: &DbState, session: &SessionState, order_id: i64) -> ApiResult<Order> {
    let user = session.require_user()?;
    let order = db.inner().orders().cancel_for_user(order_id, user.id).await?;
    info!(order_id, user_id = user.id, "Order cancelled by customer");
    Ok(order)
}

/// Admin listing, optionally one status only.
pub async fn list_orders(db: &DbState, status: Option<OrderStatus>) -> ApiResult<Vec<Order>> {
    Ok(db.inner().orders().list(status).await?)
}

pub async fn update_order_status(
    db: &DbState,
    order_id: i64,
    status: OrderStatus,
) -> ApiResult<Order> {
    Ok(db.inner().orders().update_status(order_id, status).await?)
}
