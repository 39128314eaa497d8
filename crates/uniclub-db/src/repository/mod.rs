//! # Repository Module
//!
//! One repository per aggregate, each holding a clone of the pool.
//!
//! ```text
//! ┌──────────────────────┬──────────────────────────────────────────────────┐
//! │ Repository           │ Tables                                           │
//! ├──────────────────────┼──────────────────────────────────────────────────┤
//! │ CatalogRepository    │ products, variants, reviews, facet lookups       │
//! │ SupplierRepository   │ suppliers                                        │
//! │ ReceiptRepository    │ receipt_notes, receipt_lines                     │
//! │ OrderRepository      │ orders, order_lines                              │
//! └──────────────────────┴──────────────────────────────────────────────────┘
//! ```
//!
//! Queries are plain runtime SQL mapped with `FromRow`, so the crate builds
//! without a prepared query cache.

pub mod catalog;
pub mod order;
pub mod receipt;
pub mod supplier;
