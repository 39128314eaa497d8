//! # Domain Types
//!
//! Core domain types shared by the storefront and the admin back office.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │ 1 │    Variant      │   │     Review      │       │
//! │  │  ─────────────  │──►│  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │ n │  id, sku        │   │  product_id     │       │
//! │  │  category_id    │   │  size_id        │   │  stars (1..=5)  │       │
//! │  │  brand_id       │   │  color_id       │   │  is_active      │       │
//! │  │  base_price     │   │  price?, qty    │   └─────────────────┘       │
//! │  └─────────────────┘   └─────────────────┘                              │
//! │                                                                         │
//! │  Facet = Category | Brand | Size | Color | PaymentMethod               │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                              │
//! │  │  ReceiptNote    │   │     Order       │                              │
//! │  │  ReceiptStatus  │   │  OrderStatus    │  ← closed enums with an     │
//! │  │  PENDING ──►    │   │  PENDING ──►    │    explicit transition      │
//! │  │  COMPLETED|     │   │  CONFIRMED ──►  │    table                    │
//! │  │  CANCELLED      │   │  SHIPPING ──►   │                              │
//! │  └─────────────────┘   │  DELIVERED      │                              │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Field naming is uniform across the crate: `variant_id`, `size_id`,
//! `color_id`. Serialized forms use camelCase (`variantId`, `sizeId`).

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;
use crate::money::Money;

// =============================================================================
// Facets
// =============================================================================

/// A named lookup row: category, brand, size, color or payment method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Facet {
    pub id: i64,
    pub name: String,
    pub is_active: bool,
}

pub type Category = Facet;
pub type Brand = Facet;
pub type Size = Facet;
pub type Color = Facet;
pub type PaymentMethod = Facet;

/// Which lookup table a [`Facet`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum FacetKind {
    Category,
    Brand,
    Size,
    Color,
    PaymentMethod,
}

impl FacetKind {
    /// Backing table name.
    pub const fn table(self) -> &'static str {
        match self {
            FacetKind::Category => "categories",
            FacetKind::Brand => "brands",
            FacetKind::Size => "sizes",
            FacetKind::Color => "colors",
            FacetKind::PaymentMethod => "payment_methods",
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A catalog product. Purchasable units are its [`Variant`]s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    pub id: i64,

    /// Display name, matched by catalog search.
    pub name: String,

    pub description: Option<String>,

    pub category_id: i64,

    pub brand_id: i64,

    /// Price used when no active variant carries its own price.
    pub base_price: Money,

    /// Whether product is listed (soft delete).
    pub is_active: bool,

    /// Drives the "newest" catalog ordering.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Variant
// =============================================================================

/// A specific size/color combination of a product, identified by its SKU.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Variant {
    pub id: i64,

    /// Stock Keeping Unit, unique per variant.
    pub sku: String,

    pub product_id: i64,

    pub size_id: i64,

    pub color_id: i64,

    /// Own price; `None` falls back to the product's base price.
    pub price: Option<Money>,

    /// Units on hand.
    pub quantity: i64,

    pub image: Option<String>,

    pub is_active: bool,
}

impl Variant {
    /// Whether this variant can be put in a cart right now.
    #[inline]
    pub fn in_stock(&self) -> bool {
        self.is_active && self.quantity > 0
    }

    /// Price a shopper pays for this variant.
    pub fn effective_price(&self, product: &Product) -> Money {
        self.price.unwrap_or(product.base_price)
    }
}

// =============================================================================
// Review
// =============================================================================

/// Lowest accepted star rating.
pub const MIN_STARS: i64 = 1;

/// Highest accepted star rating.
pub const MAX_STARS: i64 = 5;

/// A shopper's star rating of a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Review {
    pub id: i64,
    pub product_id: i64,
    pub user_id: i64,
    /// 1..=5
    pub stars: i64,
    pub comment: Option<String>,
    /// Hidden reviews do not count towards the average.
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Supplier
// =============================================================================

/// A vendor that goods-receipt notes are raised against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Supplier {
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub is_active: bool,
}

// =============================================================================
// Session User
// =============================================================================

/// The signed-in user record persisted under [`crate::USER_KEY`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SessionUser {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    /// Opaque bearer token; cleared together with the record on 401.
    pub token: String,
}

// =============================================================================
// Receipt Status
// =============================================================================

/// Lifecycle of a goods-receipt note.
///
/// ```text
/// PENDING ──approve──► COMPLETED
///    │
///    └────cancel─────► CANCELLED
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
#[ts(export)]
pub enum ReceiptStatus {
    /// Submitted, waiting for approval.
    #[default]
    Pending,
    Completed,
    Cancelled,
}

impl ReceiptStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            ReceiptStatus::Pending => "PENDING",
            ReceiptStatus::Completed => "COMPLETED",
            ReceiptStatus::Cancelled => "CANCELLED",
        }
    }

    /// Transition table.
    pub const fn can_transition_to(self, next: ReceiptStatus) -> bool {
        matches!(
            (self, next),
            (ReceiptStatus::Pending, ReceiptStatus::Completed)
                | (ReceiptStatus::Pending, ReceiptStatus::Cancelled)
        )
    }

    /// Returns `next` if the move is allowed.
    pub fn transition(self, next: ReceiptStatus) -> Result<ReceiptStatus, CoreError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(CoreError::InvalidStatusTransition {
                entity: "receipt",
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }
}

impl fmt::Display for ReceiptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// Lifecycle of a storefront order.
///
/// ```text
/// PENDING ──► CONFIRMED ──► SHIPPING ──► DELIVERED
///    │            │
///    └────────────┴──► CANCELLED
/// ```
///
/// `DELIVERED` and `CANCELLED` are terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
#[ts(export)]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Shipping,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Shipping,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Shipping => "SHIPPING",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    /// Transition table.
    pub const fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, Shipping)
                | (Confirmed, Cancelled)
                | (Shipping, Delivered)
        )
    }

    /// A shopper may only cancel an order nobody has confirmed yet.
    pub const fn customer_can_cancel(self) -> bool {
        matches!(self, OrderStatus::Pending)
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Returns `next` if the move is allowed.
    pub fn transition(self, next: OrderStatus) -> Result<OrderStatus, CoreError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(CoreError::InvalidStatusTransition {
                entity: "order",
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Receipt Note (GRN)
// =============================================================================

/// Header of a stored goods-receipt note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ReceiptNote {
    pub id: i64,
    pub supplier_id: i64,
    #[ts(as = "String")]
    pub received_date: NaiveDate,
    pub note: Option<String>,
    pub total_cost: Money,
    pub status: ReceiptStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// One stored line of a goods-receipt note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ReceiptLineRecord {
    pub id: i64,
    pub receipt_id: i64,
    pub variant_id: i64,
    pub sku: String,
    pub quantity: i64,
    pub unit_cost: Money,
    pub subtotal: Money,
}

// =============================================================================
// Order
// =============================================================================

/// Header of a stored storefront order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub payment_method_id: i64,
    pub note: Option<String>,
    pub status: OrderStatus,
    pub subtotal: Money,
    pub shipping_fee: Money,
    pub total: Money,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// One stored line of an order, priced at checkout time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderLine {
    pub id: i64,
    pub order_id: i64,
    pub variant_id: i64,
    pub sku: String,
    pub quantity: i64,
    pub unit_price: Money,
}

impl OrderLine {
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_transition_table() {
        use OrderStatus::*;
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(Shipping));
        assert!(Confirmed.can_transition_to(Cancelled));
        assert!(Shipping.can_transition_to(Delivered));

        assert!(!Shipping.can_transition_to(Cancelled));
        assert!(!Delivered.can_transition_to(Pending));
        assert!(!Pending.can_transition_to(Delivered));
        for status in OrderStatus::ALL {
            assert!(!status.can_transition_to(status));
        }
    }

    #[test]
    fn test_terminal_statuses_have_no_exits() {
        for from in OrderStatus::ALL.into_iter().filter(|s| s.is_terminal()) {
            for to in OrderStatus::ALL {
                assert!(!from.can_transition_to(to), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn test_invalid_order_transition_is_error() {
        let err = OrderStatus::Delivered
            .transition(OrderStatus::Cancelled)
            .unwrap_err();
        assert_eq!(err.to_string(), "Cannot move order from DELIVERED to CANCELLED");
    }

    #[test]
    fn test_receipt_transition_table() {
        assert_eq!(
            ReceiptStatus::Pending.transition(ReceiptStatus::Completed).unwrap(),
            ReceiptStatus::Completed
        );
        assert!(ReceiptStatus::Pending
            .transition(ReceiptStatus::Cancelled)
            .is_ok());
        assert!(ReceiptStatus::Completed
            .transition(ReceiptStatus::Cancelled)
            .is_err());
        assert!(ReceiptStatus::Cancelled
            .transition(ReceiptStatus::Completed)
            .is_err());
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&ReceiptStatus::Pending).unwrap(),
            "\"PENDING\""
        );
        let status: OrderStatus = serde_json::from_str("\"SHIPPING\"").unwrap();
        assert_eq!(status, OrderStatus::Shipping);
    }

    #[test]
    fn test_variant_effective_price_falls_back() {
        let now = Utc::now();
        let product = Product {
            id: 1,
            name: "Áo thun".to_string(),
            description: None,
            category_id: 1,
            brand_id: 1,
            base_price: Money::from_dong(150_000),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let mut variant = Variant {
            id: 10,
            sku: "TS001-BLK-M".to_string(),
            product_id: 1,
            size_id: 1,
            color_id: 1,
            price: None,
            quantity: 0,
            image: None,
            is_active: true,
        };
        assert_eq!(variant.effective_price(&product).amount(), 150_000);
        assert!(!variant.in_stock());

        variant.price = Some(Money::from_dong(199_000));
        variant.quantity = 3;
        assert_eq!(variant.effective_price(&product).amount(), 199_000);
        assert!(variant.in_stock());
    }
}
