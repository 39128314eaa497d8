//! # Checkout Command
//!
//! ```text
//! session user ──┐
//! cart ──────────┼──► OrderDraft::from_cart ──► orders.create ──► clear cart + note
//! order note ────┤
//! billing form ──┘
//! ```
//!
//! Stock is not reserved or decremented when an order is placed.

use serde::Deserialize;
use tracing::info;

use uniclub_core::checkout::{BillingDetails, OrderDraft};
use uniclub_core::{FacetKind, FieldErrors, Order};

use crate::error::ApiResult;
use crate::state::{CartState, ConfigState, DbState, SessionState};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub payment_method_id: i64,
    pub billing: BillingDetails,
}

pub async fn checkout(
    db: &DbState,
    cart: &CartState,
    session: &SessionState,
    config: &ConfigState,
    request: CheckoutRequest,
) -> ApiResult<Order> {
    let user = session.require_user()?;

    let method = db
        .inner()
        .catalog()
        .get_facet(FacetKind::PaymentMethod, request.payment_method_id)
        .await?;
    if !method.is_some_and(|m| m.is_active) {
        let mut errors = FieldErrors::new();
        errors.insert("payment_method_id", "Choose a payment method");
        return Err(errors.into());
    }

    let draft = OrderDraft::from_cart(
        &cart.load()?,
        user.id,
        request.payment_method_id,
        request.billing,
        session.order_note()?,
        config.shipping_policy(),
    )?;

    let order = db.inner().orders().create(&draft).await?;

    cart.clear()?;
    session.clear_order_note()?;

    info!(order_id = order.id, user_id = user.id, total = %order.total, "Checkout complete");
    Ok(order)
}
