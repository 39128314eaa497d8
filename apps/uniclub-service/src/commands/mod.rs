//! # Commands Module
//!
//! Plain async functions called by the web fronts' API handlers. Each takes
//! the state types it needs and returns `ApiResult<T>`.
//!
//! ```text
//! commands/
//! ├── catalog.rs     browse_catalog, catalog_filters, product_detail
//! ├── cart.rs        cart_summary, add_to_cart, update_cart_quantity, remove_from_cart, set_order_note
//! ├── checkout.rs    checkout
//! ├── orders.rs      my_orders, order_detail, cancel_order, list_orders, update_order_status
//! ├── reviews.rs     submit_review
//! ├── receipts.rs    new_receipt_draft + draft edits, submit/approve/cancel, receipt_lines
//! └── inventory.rs   adjust_stock
//! ```

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod inventory;
pub mod orders;
pub mod receipts;
pub mod reviews;

use uniclub_core::{Facet, UNKNOWN_LABEL};

/// Facet name by id, `N/A` when missing.
pub(crate) fn label(facets: &[Facet], id: i64) -> String {
    facets
        .iter()
        .find(|f| f.id == id)
        .map(|f| f.name.clone())
        .unwrap_or_else(|| UNKNOWN_LABEL.to_string())
}
