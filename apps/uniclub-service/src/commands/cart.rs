//! # Cart Commands
//!
//! Every command answers with the whole cart and its totals, so the page
//! re-renders from one response.

use serde::Serialize;
use tracing::{debug, info};

use uniclub_core::cart::{Cart, CartLine};
use uniclub_core::{CoreError, FacetKind, Money};

use super::label;
use crate::error::ApiResult;
use crate::state::{CartState, ConfigState, DbState, SessionState};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    pub lines: Vec<CartLine>,
    pub item_count: i64,
    pub subtotal: Money,
    pub shipping_fee: Money,
    pub total: Money,
    /// How much more to spend for free shipping; zero once reached.
    pub free_shipping_gap: Money,
}

impl CartSummary {
    pub fn new(cart: &Cart, config: &ConfigState) -> Self {
        let policy = config.shipping_policy();
        let subtotal = cart.subtotal();
        let shipping_fee = if cart.is_empty() {
            Money::zero()
        } else {
            policy.fee_for(subtotal)
        };
        let gap = policy.free_shipping_threshold - subtotal;

        CartSummary {
            lines: cart.lines().to_vec(),
            item_count: cart.item_count(),
            subtotal,
            shipping_fee,
            total: subtotal + shipping_fee,
            free_shipping_gap: if gap.is_positive() { gap } else { Money::zero() },
        }
    }
}

pub fn cart_summary(cart: &CartState, config: &ConfigState) -> ApiResult<CartSummary> {
    Ok(CartSummary::new(&cart.load()?, config))
}

/// Puts `quantity` units of a variant in the cart, capped at current stock.
pub async fn add_to_cart(
    db: &DbState,
    cart: &CartState,
    config: &ConfigState,
    variant_id: i64,
    quantity: i64,
) -> ApiResult<CartSummary> {
    let catalog = db.inner().catalog();
    let variant = catalog
        .get_variant(variant_id)
        .await?
        .filter(|v| v.is_active)
        .ok_or(CoreError::VariantNotFound(variant_id))?;
    let product = catalog
        .get_product(variant.product_id)
        .await?
        .filter(|p| p.is_active)
        .ok_or(CoreError::ProductNotFound(variant.product_id))?;

    let size = catalog.get_facet(FacetKind::Size, variant.size_id).await?;
    let color = catalog.get_facet(FacetKind::Color, variant.color_id).await?;

    let line = CartLine::from_variant(
        &product,
        &variant,
        &label(size.as_slice(), variant.size_id),
        &label(color.as_slice(), variant.color_id),
        quantity,
    );
    let updated = cart.add(line)?;

    info!(variant_id, sku = %variant.sku, quantity, "Added to cart");
    Ok(CartSummary::new(&updated, config))
}

pub fn update_cart_quantity(
    cart: &CartState,
    config: &ConfigState,
    variant_id: i64,
    quantity: i64,
) -> ApiResult<CartSummary> {
    let updated = cart.update_quantity(variant_id, quantity)?;
    debug!(variant_id, quantity, "Cart quantity changed");
    Ok(CartSummary::new(&updated, config))
}

/// Removing a line that is not there is a no-op.
pub fn remove_from_cart(
    cart: &CartState,
    config: &ConfigState,
    variant_id: i64,
) -> ApiResult<CartSummary> {
    let updated = cart.remove(variant_id)?;
    debug!(variant_id, "Removed from cart");
    Ok(CartSummary::new(&updated, config))
}

/// Keeps the note for checkout. A blank note removes it.
pub fn set_order_note(session: &SessionState, note: &str) -> ApiResult<()> {
    session.set_order_note(note)?;
    Ok(())
}
