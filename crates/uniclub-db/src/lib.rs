//! # uniclub-db: Storage Layer for UniClub
//!
//! SQLite storage for the catalog, suppliers, goods receipts and orders,
//! on an async `sqlx` pool.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  uniclub-service command (browse_catalog, submit_receipt, checkout...) │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    uniclub-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌──────────────────┐   ┌─────────────┐  │   │
//! │  │   │   Database    │    │   Repositories   │   │ Migrations  │  │   │
//! │  │   │   (pool.rs)   │◄───│ Catalog Supplier │   │ (embedded)  │  │   │
//! │  │   │  SqlitePool   │    │ Receipt  Order   │   │ 001, 002    │  │   │
//! │  │   └───────────────┘    └──────────────────┘   └─────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (or :memory: in tests)                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use uniclub_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("uniclub.db")).await?;
//! let snapshot = db.catalog().snapshot().await?;
//! let note = ledger.submit(&db.receipts()).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::catalog::{CatalogRepository, CatalogSnapshot};
pub use repository::order::OrderRepository;
pub use repository::receipt::ReceiptRepository;
pub use repository::supplier::SupplierRepository;
