//! # uniclub-core: Pure Business Logic for UniClub
//!
//! This crate is the **heart** of the UniClub storefront and admin
//! back office. It contains all business logic as pure functions with zero
//! I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        UniClub Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │             Storefront (web)          Admin (web)               │   │
//! │  │    Catalog ──► Cart ──► Checkout      GRN ──► Orders            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 uniclub-service (commands)                      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ uniclub-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐          │   │
//! │  │   │  ledger  │ │ catalog  │ │   cart   │ │ checkout │          │   │
//! │  │   │ GRN rows │ │ filter + │ │ clamped  │ │ shipping │          │   │
//! │  │   │ + totals │ │   sort   │ │  lines   │ │ + orders │          │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────┘          │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                   uniclub-db (Database Layer)                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Variant, Review, Order, ...)
//! - [`money`] - Money type with integer arithmetic
//! - [`error`] - Domain error types
//! - [`validation`] - Field validators and billing checks
//! - [`ledger`] - Goods-receipt line-item ledger
//! - [`catalog`] - Catalog filter/sort pipeline
//! - [`query`] - Catalog query-string codec
//! - [`cart`] - Storefront cart and its persisted store
//! - [`checkout`] - Order drafts and shipping policy
//! - [`storage`] - Key-value persistence port and session store
//!
//! ## Example Usage
//!
//! ```rust
//! use uniclub_core::ledger::{LineField, ReceiptLedger};
//!
//! let mut ledger = ReceiptLedger::new();
//! ledger.add_row();
//! ledger.update_field(0, LineField::Quantity, "2").unwrap();
//! ledger.update_field(0, LineField::UnitCost, "100000").unwrap();
//!
//! assert_eq!(ledger.total().amount(), 200_000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod error;
pub mod ledger;
pub mod money;
pub mod query;
pub mod storage;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, FieldErrors, LedgerError, StorageError, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Storage key for the persisted cart (JSON array of cart lines).
pub const CART_KEY: &str = "uniclub_cart";

/// Storage key for the signed-in user record (JSON object).
pub const USER_KEY: &str = "uniclub_user";

/// Session-scoped scratch key for the order note typed on the cart page.
pub const ORDER_NOTE_KEY: &str = "order_note";

/// Label used when a variant's size or color cannot be resolved.
pub const UNKNOWN_LABEL: &str = "N/A";

/// Maximum accepted length of catalog search text.
pub const MAX_SEARCH_LEN: usize = 100;
