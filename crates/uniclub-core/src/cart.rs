//! # Cart
//!
//! The storefront cart and its persisted form.
//!
//! ## Invariants
//! - One line per variant; adding a present variant merges quantities
//! - Every quantity stays within `[1, max_quantity]`, where `max_quantity`
//!   is the variant's stock when it was added
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Shopper Action        CartStore                 Stored JSON array      │
//! │  ──────────────        ─────────                 ─────────────────      │
//! │  Add to cart ────────► add() ──────────────────► qty = min(q + n, max)  │
//! │  Change quantity ────► update_quantity() ──────► qty = clamp(n, 1, max) │
//! │  Remove ─────────────► remove() ───────────────► line dropped           │
//! │  Checkout succeeded ─► clear() ────────────────► []                     │
//! │                                                                         │
//! │  Each call loads, mutates and saves under "uniclub_cart".              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, StorageError};
use crate::money::Money;
use crate::storage::{read_json, write_json, KeyValueStore};
use crate::types::{Product, Variant};
use crate::CART_KEY;

// =============================================================================
// Cart Line
// =============================================================================

/// One variant selected for purchase.
///
/// Display fields are copied at add time so the cart renders without
/// another catalog lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartLine {
    pub variant_id: i64,
    pub sku: String,
    pub product_name: String,
    pub size: String,
    pub color: String,
    pub unit_price: Money,
    pub quantity: i64,
    pub image: Option<String>,
    /// Stock of the variant when it was added.
    pub max_quantity: i64,
}

impl CartLine {
    /// Builds a line for `quantity` units of `variant`.
    ///
    /// The quantity is clamped into `[1, variant.quantity]`.
    pub fn from_variant(
        product: &Product,
        variant: &Variant,
        size: &str,
        color: &str,
        quantity: i64,
    ) -> Self {
        let max_quantity = variant.quantity;
        CartLine {
            variant_id: variant.id,
            sku: variant.sku.clone(),
            product_name: product.name.clone(),
            size: size.to_string(),
            color: color.to_string(),
            unit_price: variant.effective_price(product),
            quantity: clamp_quantity(quantity, max_quantity),
            image: variant.image.clone(),
            max_quantity,
        }
    }

    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

/// `min(max(1, quantity), max_quantity)`.
#[inline]
pub fn clamp_quantity(quantity: i64, max_quantity: i64) -> i64 {
    quantity.max(1).min(max_quantity)
}

// =============================================================================
// Cart
// =============================================================================

/// The cart contents. Serialises as a bare JSON array of lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cart(Vec<CartLine>);

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.0
    }

    pub fn line(&self, variant_id: i64) -> Option<&CartLine> {
        self.0.iter().find(|l| l.variant_id == variant_id)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Adds a line, merging into an existing line for the same variant.
    ///
    /// ## Errors
    /// [`CoreError::InsufficientStock`] when the variant has nothing in stock.
    pub fn add(&mut self, line: CartLine) -> CoreResult<()> {
        if line.max_quantity < 1 {
            return Err(CoreError::InsufficientStock {
                sku: line.sku,
                available: line.max_quantity.max(0),
                requested: line.quantity.max(1),
            });
        }

        match self.0.iter_mut().find(|l| l.variant_id == line.variant_id) {
            Some(existing) => {
                existing.max_quantity = line.max_quantity;
                existing.quantity = clamp_quantity(
                    existing.quantity.saturating_add(line.quantity.max(1)),
                    existing.max_quantity,
                );
            }
            None => {
                let quantity = clamp_quantity(line.quantity, line.max_quantity);
                self.0.push(CartLine { quantity, ..line });
            }
        }
        Ok(())
    }

    /// Re-clamps every line and drops lines that cannot be bought.
    fn normalize(mut self) -> Self {
        self.0.retain(|l| l.max_quantity >= 1);
        for l in &mut self.0 {
            l.quantity = clamp_quantity(l.quantity, l.max_quantity);
        }
        self
    }

    /// Sets a line's quantity, clamped into `[1, max_quantity]`.
    pub fn update_quantity(&mut self, variant_id: i64, quantity: i64) -> CoreResult<()> {
        let line = self
            .0
            .iter_mut()
            .find(|l| l.variant_id == variant_id)
            .ok_or(CoreError::NotInCart(variant_id))?;
        line.quantity = clamp_quantity(quantity, line.max_quantity);
        Ok(())
    }

    /// Drops a line. Returns whether it was present.
    pub fn remove(&mut self, variant_id: i64) -> bool {
        let before = self.0.len();
        self.0.retain(|l| l.variant_id != variant_id);
        self.0.len() != before
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Σ unit price × quantity.
    pub fn subtotal(&self) -> Money {
        self.0.iter().map(CartLine::line_total).sum()
    }

    /// Σ quantity (the badge number).
    pub fn item_count(&self) -> i64 {
        self.0.iter().fold(0, |n, l| n.saturating_add(l.quantity))
    }
}

// =============================================================================
// Cart Store
// =============================================================================

/// A [`Cart`] persisted under [`CART_KEY`].
#[derive(Debug, Clone)]
pub struct CartStore<S> {
    store: S,
}

impl<S: KeyValueStore> CartStore<S> {
    pub fn new(store: S) -> Self {
        CartStore { store }
    }

    /// Current cart; absent or unreadable data is an empty cart. Loaded
    /// quantities are re-clamped into `[1, max_quantity]`.
    pub fn load(&self) -> Result<Cart, StorageError> {
        let cart: Cart = read_json(&self.store, CART_KEY)?.unwrap_or_default();
        Ok(cart.normalize())
    }

    pub fn save(&self, cart: &Cart) -> Result<(), StorageError> {
        write_json(&self.store, CART_KEY, cart)
    }

    fn modify<F>(&self, f: F) -> CoreResult<Cart>
    where
        F: FnOnce(&mut Cart) -> CoreResult<()>,
    {
        let mut cart = self.load()?;
        f(&mut cart)?;
        self.save(&cart)?;
        Ok(cart)
    }

    pub fn add(&self, line: CartLine) -> CoreResult<Cart> {
        let variant_id = line.variant_id;
        let cart = self.modify(|c| c.add(line))?;
        debug!(variant_id, items = cart.item_count(), "Added to cart");
        Ok(cart)
    }

    pub fn update_quantity(&self, variant_id: i64, quantity: i64) -> CoreResult<Cart> {
        self.modify(|c| c.update_quantity(variant_id, quantity))
    }

    pub fn remove(&self, variant_id: i64) -> CoreResult<Cart> {
        self.modify(|c| {
            c.remove(variant_id);
            Ok(())
        })
    }

    pub fn clear(&self) -> CoreResult<()> {
        self.save(&Cart::new())?;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
