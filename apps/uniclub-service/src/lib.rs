//! # UniClub Service
//!
//! The command layer behind the storefront and the admin console.
//!
//! ## Module Organization
//! ```text
//! uniclub_service/
//! ├── lib.rs          ◄─── tracing setup, AppContext bootstrap
//! ├── config.rs       ◄─── AppConfig (defaults → TOML → env)
//! ├── error.rs        ◄─── ApiError returned by every command
//! ├── storage.rs      ◄─── JsonFileStore (one file per key)
//! ├── state/
//! │   ├── db.rs       ◄─── Database pool wrapper
//! │   ├── cart.rs     ◄─── persisted cart + writer lock
//! │   ├── session.rs  ◄─── signed-in user, order note
//! │   ├── ledger.rs   ◄─── open goods-receipt draft
//! │   └── config.rs   ◄─── read-only settings
//! └── commands/
//!     ├── catalog.rs  ◄─── browse, filters, product detail
//!     ├── cart.rs     ◄─── add, update, remove, summary
//!     ├── checkout.rs ◄─── cart → order
//!     ├── orders.rs   ◄─── shopper and admin order views
//!     ├── reviews.rs  ◄─── star ratings
//!     ├── receipts.rs ◄─── goods-receipt ledger
//!     └── inventory.rs◄─── manual stock adjustment
//! ```
//!
//! ## Startup
//! ```text
//! AppConfig::load ──► Database::new (migrate) ──► JsonFileStore::open ──► AppContext
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod state;
pub mod storage;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use uniclub_db::{Database, DbConfig};

use config::AppConfig;
use error::{ApiError, ApiResult};
use state::{CartState, ConfigState, DbState, LedgerState, SessionState, SharedStore};
use storage::JsonFileStore;

/// Installs the global tracing subscriber.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - everything at debug
/// - `RUST_LOG=uniclub=trace` - trace for the uniclub crates only
/// - Default: `info,uniclub=debug,sqlx=warn`
///
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,uniclub=debug,sqlx=warn"));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Every state a command may ask for.
#[derive(Debug)]
pub struct AppContext {
    pub db: DbState,
    pub cart: CartState,
    pub session: SessionState,
    pub ledger: LedgerState,
    pub config: ConfigState,
}

impl AppContext {
    /// Opens the database and the key-value directory named by `config`.
    pub async fn bootstrap(config: AppConfig) -> ApiResult<AppContext> {
        let db_path = config.resolved_database_path();
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                ApiError::internal(format!("Cannot create {}: {e}", parent.display()))
            })?;
        }
        info!(db_path = %db_path.display(), "Database path determined");

        let db = Database::new(DbConfig::new(db_path)).await?;
        let store = JsonFileStore::open(config.resolved_storage_dir())?;

        let context = AppContext::with_store(db, Arc::new(store), config);
        info!(store = %context.config.config().store_name, "State initialized");
        Ok(context)
    }

    /// Assembles the states over an already opened database and store.
    pub fn with_store(db: Database, store: SharedStore, config: AppConfig) -> AppContext {
        AppContext {
            db: DbState::new(db),
            cart: CartState::new(Arc::clone(&store)),
            session: SessionState::new(store),
            ledger: LedgerState::new(),
            config: ConfigState::new(config),
        }
    }
}
