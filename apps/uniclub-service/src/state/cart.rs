//! # Cart State
//!
//! The persisted cart behind a process-wide lock.
//!
//! ```text
//! add_to_cart ───────┐
//! update_quantity ───┼──► lock ──► load ──► change ──► save ──► unlock
//! remove_from_cart ──┘
//! ```
//!
//! The lock only orders writers inside this process. Another process on the
//! same storage directory still races, and the last save wins.

use std::sync::{Mutex, MutexGuard};

use uniclub_core::cart::{Cart, CartLine, CartStore};
use uniclub_core::{CoreResult, StorageError};

use super::SharedStore;

pub struct CartState {
    store: CartStore<SharedStore>,
    lock: Mutex<()>,
}

impl CartState {
    pub fn new(store: SharedStore) -> Self {
        CartState {
            store: CartStore::new(store),
            lock: Mutex::new(()),
        }
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        // guards no data
        self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn load(&self) -> Result<Cart, StorageError> {
        let _guard = self.guard();
        self.store.load()
    }

    pub fn add(&self, line: CartLine) -> CoreResult<Cart> {
        let _guard = self.guard();
        self.store.add(line)
    }

    pub fn update_quantity(&self, variant_id: i64, quantity: i64) -> CoreResult<Cart> {
        let _guard = self.guard();
        self.store.update_quantity(variant_id, quantity)
    }

    pub fn remove(&self, variant_id: i64) -> CoreResult<Cart> {
        let _guard = self.guard();
        self.store.remove(variant_id)
    }

    pub fn clear(&self) -> CoreResult<()> {
        let _guard = self.guard();
        self.store.clear()
    }
}

impl std::fmt::Debug for CartState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartState").finish_non_exhaustive()
    }
}
