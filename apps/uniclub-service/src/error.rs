//! # API Error Type
//!
//! One serialisable error for every command.
//!
//! ```text
//! ValidationError ─┐
//! FieldErrors ─────┤
//! LedgerError ─────┤
//! CoreError ───────┼──► ApiError { code, message, fields? } ──► web front
//! StorageError ────┤
//! DbError ─────────┤
//! ConfigError ─────┘
//! ```
//!
//! ```json
//! { "code": "VALIDATION_ERROR", "message": "phone is required", "fields": { "phone": "..." } }
//! ```

use serde::Serialize;
use tracing::error;

use uniclub_core::ledger::SubmitError;
use uniclub_core::{CoreError, FieldErrors, LedgerError, StorageError, ValidationError};
use uniclub_db::DbError;

use crate::config::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
    /// Per-field messages for form validation failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldErrors>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// 404
    NotFound,
    /// 400
    ValidationError,
    /// 409: duplicate SKU, stock or status conflicts
    Conflict,
    /// 401: the stored credentials were cleared
    Unauthorized,
    DatabaseError,
    StorageError,
    InternalError,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            fields: None,
        }
    }

    pub fn not_found(resource: &str, id: impl std::fmt::Display) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{resource} not found: {id}"))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn unauthorized() -> Self {
        ApiError::new(ErrorCode::Unauthorized, "Please sign in again")
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::InternalError, message)
    }
}

impl From<FieldErrors> for ApiError {
    fn from(fields: FieldErrors) -> Self {
        ApiError {
            code: ErrorCode::ValidationError,
            message: fields.to_string(),
            fields: Some(fields),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        let code = match &err {
            LedgerError::RowOutOfRange { .. } => ErrorCode::ValidationError,
            LedgerError::UnknownVariant { .. } => ErrorCode::NotFound,
            LedgerError::DuplicateSku { sku, existing_row } => {
                // points the form at the row that already holds the variant
                let mut fields = FieldErrors::new();
                fields.insert(
                    format!("details[{existing_row}].sku"),
                    format!("Variant {sku} is already in the list"),
                );
                return ApiError {
                    code: ErrorCode::Conflict,
                    message: err.to_string(),
                    fields: Some(fields),
                };
            }
        };
        ApiError::new(code, err.to_string())
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        error!(error = %err, "Storage failure");
        ApiError::new(ErrorCode::StorageError, "Could not read or write saved data")
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(id) => ApiError::not_found("Product", id),
            CoreError::VariantNotFound(id) => ApiError::not_found("Variant", id),
            CoreError::NotInCart(id) => ApiError::not_found("Cart line", id),
            e @ (CoreError::InsufficientStock { .. } | CoreError::InvalidStatusTransition { .. }) => {
                ApiError::new(ErrorCode::Conflict, e.to_string())
            }
            CoreError::EmptyCart => ApiError::validation("Cart is empty"),
            CoreError::Invalid(fields) => ApiError::from(fields),
            CoreError::Validation(e) => ApiError::from(e),
            CoreError::Storage(e) => ApiError::from(e),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(entity, id),
            DbError::Domain(e) => ApiError::from(e),
            DbError::UniqueViolation { field } => {
                ApiError::new(ErrorCode::Conflict, format!("{field} already exists"))
            }
            DbError::ForeignKeyViolation(message) => {
                error!(%message, "Foreign key violation");
                ApiError::validation("Invalid reference")
            }
            DbError::CheckViolation(message) => {
                error!(%message, "Constraint violation");
                ApiError::validation("Value out of range")
            }
            other => {
                error!(error = %other, "Database failure");
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

impl From<SubmitError<DbError>> for ApiError {
    fn from(err: SubmitError<DbError>) -> Self {
        match err {
            SubmitError::Invalid(fields) => ApiError::from(fields),
            SubmitError::Gateway(e) => ApiError::from(e),
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        error!(error = %err, "Configuration error");
        ApiError::internal(err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

pub type ApiResult<T> = Result<T, ApiError>;
