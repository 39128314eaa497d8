//! # Goods Receipt Repository
//!
//! Stores the notes produced by the receipt ledger and moves them through
//! their status machine.
//!
//! ```text
//! ReceiptLedger::submit(&repo)
//!       │  NewReceipt (status PENDING)
//!       ▼
//! create() ── BEGIN ── INSERT receipt_notes ── INSERT receipt_lines × n ── COMMIT
//!
//! approve(id)  PENDING ──► COMPLETED
//! cancel(id)   PENDING ──► CANCELLED
//! ```
//!
//! Approving records the status only; stock levels are maintained through
//! the catalog's stock adjustments.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use uniclub_core::ledger::{NewReceipt, ReceiptGateway};
use uniclub_core::{CoreError, FieldErrors, ReceiptLineRecord, ReceiptNote, ReceiptStatus};

use crate::error::{DbError, DbResult};

const NOTE_COLUMNS: &str = "id, supplier_id, received_date, note, total_cost, status, created_at";

#[derive(Debug, Clone)]
pub struct ReceiptRepository {
    pool: SqlitePool,
}

impl ReceiptRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ReceiptRepository { pool }
    }

    /// Writes the header and all lines in one transaction.
    pub async fn create(&self, receipt: NewReceipt) -> DbResult<ReceiptNote> {
        if receipt.lines.is_empty() {
            let mut errors = FieldErrors::new();
            errors.insert("details", "At least one line is required");
            return Err(CoreError::from(errors).into());
        }

        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO receipt_notes (supplier_id, received_date, note, total_cost, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING {NOTE_COLUMNS}"
        );
        let note = sqlx::query_as::<_, ReceiptNote>(&sql)
            .bind(receipt.supplier_id)
            .bind(receipt.received_date)
            .bind(&receipt.note)
            .bind(receipt.total_cost)
            .bind(receipt.status)
            .bind(Utc::now())
            .fetch_one(&mut *tx)
            .await?;

        for line in &receipt.lines {
            sqlx::query(
                "INSERT INTO receipt_lines (receipt_id, variant_id, sku, quantity, unit_cost, subtotal)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )
            .bind(note.id)
            .bind(line.variant_id)
            .bind(&line.sku)
            .bind(line.quantity)
            .bind(line.unit_cost)
            .bind(line.subtotal)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            receipt_id = note.id,
            supplier_id = note.supplier_id,
            lines = receipt.lines.len(),
            total = %note.total_cost,
            "Receipt note created"
        );
        Ok(note)
    }

    pub async fn get(&self, id: i64) -> DbResult<Option<ReceiptNote>> {
        let sql = format!("SELECT {NOTE_COLUMNS} FROM receipt_notes WHERE id = ?1");
        Ok(sqlx::query_as::<_, ReceiptNote>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Newest first, optionally narrowed to one status.
    pub async fn list(&self, status: Option<ReceiptStatus>) -> DbResult<Vec<ReceiptNote>> {
        let sql = format!(
            "SELECT {NOTE_COLUMNS} FROM receipt_notes
             WHERE ?1 IS NULL OR status = ?1
             ORDER BY received_date DESC, id DESC"
        );
        Ok(sqlx::query_as::<_, ReceiptNote>(&sql)
            .bind(status)
            .fetch_all(&self.pool)
            .await?)
    }

    pub async fn lines(&self, receipt_id: i64) -> DbResult<Vec<ReceiptLineRecord>> {
        Ok(sqlx::query_as::<_, ReceiptLineRecord>(
            "SELECT id, receipt_id, variant_id, sku, quantity, unit_cost, subtotal
             FROM receipt_lines WHERE receipt_id = ?1 ORDER BY id",
        )
        .bind(receipt_id)
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn approve(&self, id: i64) -> DbResult<ReceiptNote> {
        self.move_to(id, ReceiptStatus::Completed).await
    }

    pub async fn cancel(&self, id: i64) -> DbResult<ReceiptNote> {
        self.move_to(id, ReceiptStatus::Cancelled).await
    }

    /// The UPDATE is guarded on the status read, so a concurrent move makes
    /// this one fail instead of overwriting it.
    async fn move_to(&self, id: i64, next: ReceiptStatus) -> DbResult<ReceiptNote> {
        let current = self
            .get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Receipt", id))?;
        current.status.transition(next)?;

        let sql = format!(
            "UPDATE receipt_notes SET status = ?2
             WHERE id = ?1 AND status = ?3
             RETURNING {NOTE_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, ReceiptNote>(&sql)
            .bind(id)
            .bind(next)
            .bind(current.status)
            .fetch_optional(&self.pool)
            .await?;

        match updated {
            Some(note) => {
                info!(receipt_id = id, from = %current.status, to = %next, "Receipt status changed");
                Ok(note)
            }
            None => {
                debug!(receipt_id = id, "Receipt status changed underneath");
                Err(CoreError::InvalidStatusTransition {
                    entity: "receipt",
                    from: current.status.to_string(),
                    to: next.to_string(),
                }
                .into())
            }
        }
    }
}

impl ReceiptGateway for ReceiptRepository {
    type Error = DbError;

    async fn create_receipt(&self, receipt: NewReceipt) -> Result<ReceiptNote, DbError> {
        self.create(receipt).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
