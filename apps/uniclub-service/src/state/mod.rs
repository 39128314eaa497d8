//! # State Module
//!
//! One state type per concern; each command takes only what it needs.
//!
//! ```text
//! ┌──────────────┐ ┌──────────────┐ ┌──────────────┐ ┌──────────────┐ ┌──────────────┐
//! │   DbState    │ │  CartState   │ │ SessionState │ │ LedgerState  │ │ ConfigState  │
//! │              │ │              │ │              │ │              │ │              │
//! │  Database    │ │  CartStore   │ │ SessionStore │ │ Mutex<Option │ │  AppConfig   │
//! │  (pool)      │ │  + Mutex     │ │              │ │  <Ledger>>   │ │  (read-only) │
//! └──────────────┘ └──────┬───────┘ └──────┬───────┘ └──────────────┘ └──────────────┘
//!                         └────────┬───────┘
//!                                  ▼
//!                      SharedStore (Arc<dyn KeyValueStore>)
//! ```

mod cart;
mod config;
mod db;
mod ledger;
mod session;

use std::sync::Arc;

use uniclub_core::storage::KeyValueStore;

pub use cart::CartState;
pub use config::ConfigState;
pub use db::DbState;
pub use ledger::LedgerState;
pub use session::SessionState;

/// The key-value backend shared by the cart and session states.
pub type SharedStore = Arc<dyn KeyValueStore>;
