//! # Checkout
//!
//! Turns a cart plus billing details into an order draft ready to store.
//!
//! ```text
//! Cart ──► subtotal ──► ShippingPolicy ──► shipping fee ──► total
//!   │                                                          │
//!   └── lines (variant, sku, qty, unit price) ─────────────────┴──► OrderDraft
//! ```
//!
//! Stock is not reserved or decremented here; checkout only records what
//! the shopper asked for.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::Cart;
use crate::error::{CoreError, CoreResult, FieldErrors};
use crate::money::Money;
use crate::validation::{validate_email, validate_phone, validate_required};

// =============================================================================
// Billing Details
// =============================================================================

/// Delivery contact entered on the checkout page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct BillingDetails {
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub province: String,
    pub district: String,
    pub ward: String,
}

impl BillingDetails {
    /// Every field is required; email and phone must also be well formed.
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();

        let required = [
            ("full_name", &self.full_name),
            ("address", &self.address),
            ("province", &self.province),
            ("district", &self.district),
            ("ward", &self.ward),
        ];
        for (field, value) in required {
            if let Err(e) = validate_required(field, value) {
                errors.insert(field, e.to_string());
            }
        }

        if let Err(e) = validate_phone(&self.phone) {
            errors.insert("phone", e.to_string());
        }
        if let Err(e) = validate_email(&self.email) {
            errors.insert("email", e.to_string());
        }

        errors
    }
}

// =============================================================================
// Shipping Policy
// =============================================================================

/// Flat-fee shipping, waived at or above a subtotal threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ShippingPolicy {
    pub free_shipping_threshold: Money,
    pub flat_fee: Money,
}

impl Default for ShippingPolicy {
    fn default() -> Self {
        ShippingPolicy {
            free_shipping_threshold: Money::from_dong(499_000),
            flat_fee: Money::from_dong(30_000),
        }
    }
}

impl ShippingPolicy {
    pub fn fee_for(&self, subtotal: Money) -> Money {
        if subtotal >= self.free_shipping_threshold {
            Money::zero()
        } else {
            self.flat_fee
        }
    }
}

// =============================================================================
// Order Draft
// =============================================================================

/// One line of an order about to be stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderDraftLine {
    pub variant_id: i64,
    pub sku: String,
    pub quantity: i64,
    pub unit_price: Money,
}

/// Everything needed to create an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderDraft {
    pub user_id: i64,
    pub payment_method_id: i64,
    pub note: Option<String>,
    pub billing: BillingDetails,
    pub lines: Vec<OrderDraftLine>,
    pub subtotal: Money,
    pub shipping_fee: Money,
    pub total: Money,
}

impl OrderDraft {
    /// Prices the cart and checks the billing form.
    ///
    /// ## Errors
    /// - [`CoreError::EmptyCart`] when there is nothing to buy
    /// - [`CoreError::Invalid`] with the billing field errors
    pub fn from_cart(
        cart: &Cart,
        user_id: i64,
        payment_method_id: i64,
        billing: BillingDetails,
        note: Option<String>,
        policy: &ShippingPolicy,
    ) -> CoreResult<OrderDraft> {
        if cart.is_empty() {
            return Err(CoreError::EmptyCart);
        }
        billing.validate().into_result()?;

        let lines = cart
            .lines()
            .iter()
            .map(|l| OrderDraftLine {
                variant_id: l.variant_id,
                sku: l.sku.clone(),
                quantity: l.quantity,
                unit_price: l.unit_price,
            })
            .collect();

        let subtotal = cart.subtotal();
        let shipping_fee = policy.fee_for(subtotal);

        Ok(OrderDraft {
            user_id,
            payment_method_id,
            note: note
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            billing,
            lines,
            subtotal,
            shipping_fee,
            total: subtotal + shipping_fee,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::CartLine;

    fn billing() -> BillingDetails {
        BillingDetails {
            full_name: "Trần Thị B".to_string(),
            phone: "0912345678".to_string(),
            email: "b@uniclub.vn".to_string(),
            address: "12 Nguyễn Trãi".to_string(),
            province: "TP HCM".to_string(),
            district: "Quận 8".to_string(),
            ward: "Phường 13".to_string(),
        }
    }

    fn cart_worth(unit_price: i64, quantity: i64) -> Cart {
        let mut cart = Cart::new();
        cart.add(CartLine {
            variant_id: 1,
            sku: "TS001-BLK-M".to_string(),
            product_name: "Áo thun cổ tròn".to_string(),
            size: "M".to_string(),
            color: "Đen".to_string(),
            unit_price: Money::from_dong(unit_price),
            quantity,
            image: None,
            max_quantity: 10,
        })
        .unwrap();
        cart
    }

    #[test]
    fn test_shipping_threshold() {
        let policy = ShippingPolicy::default();
        assert_eq!(policy.fee_for(Money::from_dong(498_999)).amount(), 30_000);
        assert!(policy.fee_for(Money::from_dong(499_000)).is_zero());
        assert!(policy.fee_for(Money::from_dong(1_000_000)).is_zero());
    }

    #[test]
    fn test_billing_validation() {
        assert!(billing().validate().is_empty());

        let errors = BillingDetails::default().validate();
        for field in ["full_name", "phone", "email", "address", "province", "district", "ward"] {
            assert!(errors.contains(field), "missing error for {field}");
        }

        let bad = BillingDetails {
            email: "not-an-email".to_string(),
            ..billing()
        };
        assert_eq!(bad.validate().len(), 1);
    }

    #[test]
    fn test_draft_totals() {
        let draft = OrderDraft::from_cart(
            &cart_worth(150_000, 2),
            7,
            1,
            billing(),
            Some("  Giao buổi sáng ".to_string()),
            &ShippingPolicy::default(),
        )
        .unwrap();

        assert_eq!(draft.subtotal.amount(), 300_000);
        assert_eq!(draft.shipping_fee.amount(), 30_000);
        assert_eq!(draft.total.amount(), 330_000);
        assert_eq!(draft.note.as_deref(), Some("Giao buổi sáng"));
        assert_eq!(draft.lines.len(), 1);
        assert_eq!(draft.lines[0].quantity, 2);
    }

    #[test]
    fn test_draft_free_shipping() {
        let draft = OrderDraft::from_cart(
            &cart_worth(250_000, 2),
            7,
            1,
            billing(),
            Some("   ".to_string()),
            &ShippingPolicy::default(),
        )
        .unwrap();
        assert!(draft.shipping_fee.is_zero());
        assert_eq!(draft.total.amount(), 500_000);
        assert_eq!(draft.note, None);
    }

    #[test]
    fn test_draft_errors() {
        let policy = ShippingPolicy::default();
        assert!(matches!(
            OrderDraft::from_cart(&Cart::new(), 7, 1, billing(), None, &policy),
            Err(CoreError::EmptyCart)
        ));
        assert!(matches!(
            OrderDraft::from_cart(&cart_worth(1, 1), 7, 1, BillingDetails::default(), None, &policy),
            Err(CoreError::Invalid(_))
        ));
    }
}
