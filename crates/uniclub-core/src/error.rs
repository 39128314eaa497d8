//! # Error Types
//!
//! Domain-specific error types for uniclub-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  uniclub-core errors (this file)                                       │
//! │  ├── CoreError        - General domain errors                          │
//! │  ├── ValidationError  - Single-field input failures                    │
//! │  ├── LedgerError      - Receipt ledger row operations                  │
//! │  ├── StorageError     - Key-value persistence port failures            │
//! │  └── FieldErrors      - Form-level error map (returned, never thrown)  │
//! │                                                                         │
//! │  uniclub-db errors (separate crate)                                    │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  uniclub-service errors                                                │
//! │  └── ApiError         - What the web fronts see (serialized)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found.
    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    /// Variant cannot be found.
    #[error("Variant not found: {0}")]
    VariantNotFound(i64),

    /// Cart has no line for the given variant.
    #[error("Variant {0} is not in the cart")]
    NotInCart(i64),

    /// Variant has no stock to put in a cart.
    ///
    /// ## When This Occurs
    /// - Adding a variant whose stock is zero at add-time
    #[error("Insufficient stock for {sku}: available {available}, requested {requested}")]
    InsufficientStock {
        sku: String,
        available: i64,
        requested: i64,
    },

    /// A status change that the transition table does not allow.
    ///
    /// ## When This Occurs
    /// - Cancelling an order that already shipped
    /// - Approving a receipt that was cancelled
    #[error("Cannot move {entity} from {from} to {to}")]
    InvalidStatusTransition {
        entity: &'static str,
        from: String,
        to: String,
    },

    /// Checkout attempted with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Form-level validation failed.
    #[error("Validation failed: {0}")]
    Invalid(FieldErrors),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Persistence port failure.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when a single value doesn't meet requirements.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., malformed email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Ledger Error
// =============================================================================

/// Errors raised by receipt ledger row operations.
///
/// None of these mutate the ledger: the row the caller touched is left
/// exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Row index does not exist.
    #[error("Row {index} does not exist (ledger has {len} rows)")]
    RowOutOfRange { index: usize, len: usize },

    /// Variant is not offered for the row's selected product.
    #[error("Variant {variant_id} is not available for the selected product")]
    UnknownVariant { variant_id: i64 },

    /// SKU is already on another row.
    ///
    /// `existing_row` is the row the view should bring into focus.
    #[error("Variant {sku} is already in the list")]
    DuplicateSku { sku: String, existing_row: usize },
}

// =============================================================================
// Storage Error
// =============================================================================

/// Failures of the key-value persistence port.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Backend could not read or write the key.
    #[error("Storage backend failed for key {key}: {reason}")]
    Backend { key: String, reason: String },

    /// Stored blob could not be encoded.
    #[error("Could not encode value for key {key}: {reason}")]
    Encode { key: String, reason: String },
}

// =============================================================================
// Field Errors
// =============================================================================

/// Ordered map of field name → user-facing message.
///
/// Produced by form validation (`ReceiptLedger::validate`,
/// `BillingDetails::validate`). An empty map means the form is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    /// Creates an empty error set.
    pub fn new() -> Self {
        FieldErrors(BTreeMap::new())
    }

    /// Records a message for a field, replacing any earlier one.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    /// Returns the message recorded for a field.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Checks if a field has an error.
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates `(field, message)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Converts to `Ok(())` when empty, else `Err(self)`.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", field, message)?;
            first = false;
        }
        Ok(())
    }
}

impl From<FieldErrors> for CoreError {
    fn from(errors: FieldErrors) -> Self {
        CoreError::Invalid(errors)
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
