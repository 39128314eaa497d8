//! # Receipt Draft State
//!
//! The goods-receipt form an admin is filling in. One draft at a time;
//! starting a new one discards the old.

use std::sync::{Mutex, MutexGuard};

use uniclub_core::ledger::ReceiptLedger;

use crate::error::{ApiError, ApiResult};

#[derive(Debug, Default)]
pub struct LedgerState {
    draft: Mutex<Option<ReceiptLedger>>,
}

impl LedgerState {
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> MutexGuard<'_, Option<ReceiptLedger>> {
        self.draft.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn replace(&self, ledger: ReceiptLedger) {
        *self.guard() = Some(ledger);
    }

    pub fn discard(&self) {
        *self.guard() = None;
    }

    pub fn has_draft(&self) -> bool {
        self.guard().is_some()
    }

    /// Reads the open draft.
    pub fn with_draft<F, T>(&self, f: F) -> ApiResult<T>
    where
        F: FnOnce(&ReceiptLedger) -> T,
    {
        self.guard().as_ref().map(f).ok_or_else(no_draft)
    }

    /// Changes the open draft.
    pub fn with_draft_mut<F, T>(&self, f: F) -> ApiResult<T>
    where
        F: FnOnce(&mut ReceiptLedger) -> ApiResult<T>,
    {
        match self.guard().as_mut() {
            Some(ledger) => f(ledger),
            None => Err(no_draft()),
        }
    }
}

fn no_draft() -> ApiError {
    ApiError::not_found("Receipt draft", "current")
}
