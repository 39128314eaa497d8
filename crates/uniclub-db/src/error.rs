//! # Database Error Types
//!
//! ```text
//! sqlx::Error / MigrateError ──► DbError ──► ApiError (service) ──► client
//!                  CoreError ──┘
//! ```
//!
//! Repositories also surface domain refusals (an illegal status move, a
//! stock decrease past zero) as [`DbError::Domain`] so callers get one
//! error type per call.

use thiserror::Error;
use uniclub_core::{CoreError, ValidationError};

/// Storage failures.
#[derive(Debug, Error)]
pub enum DbError {
    /// The row does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A UNIQUE index refused the write, e.g. a second variant with the same SKU.
    #[error("Duplicate value for {field}")]
    UniqueViolation { field: String },

    /// The row references a parent that does not exist.
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// A CHECK constraint refused the write.
    #[error("Constraint failed: {0}")]
    CheckViolation(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Business rule refused the operation before anything was written.
    #[error(transparent)]
    Domain(#[from] CoreError),

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        DbError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

impl From<ValidationError> for DbError {
    fn from(err: ValidationError) -> Self {
        DbError::Domain(CoreError::Validation(err))
    }
}

/// SQLite reports constraint failures only through the message text:
///
/// ```text
/// "UNIQUE constraint failed: variants.sku" → UniqueViolation { field: "variants.sku" }
/// "FOREIGN KEY constraint failed"          → ForeignKeyViolation
/// "CHECK constraint failed: quantity >= 0" → CheckViolation
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),
            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();
                if let Some(field) = msg.strip_prefix("UNIQUE constraint failed: ") {
                    DbError::UniqueViolation {
                        field: field.to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation(msg.to_string())
                } else if msg.contains("CHECK constraint failed") {
                    DbError::CheckViolation(msg.to_string())
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool is closed".to_string()),
            other => DbError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;
