//! # Goods Receipt Commands
//!
//! The admin fills a draft row by row, then submits it as a `PENDING` note.
//!
//! ```text
//! new_receipt_draft ──► set_receipt_header
//!                       add_receipt_row / remove_receipt_row
//!                       select_receipt_product ──► select_receipt_variant
//!                       update_receipt_field (quantity, unit cost)
//!                              │
//!                              ▼
//!                       submit_receipt ──► PENDING ──► approve_receipt ──► COMPLETED
//!                                                 └──► cancel_receipt  ──► CANCELLED
//! ```
//!
//! Every draft command answers with the full draft view.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use uniclub_core::ledger::{variants_for_product, LineField, ReceiptLedger, VariantOption};
use uniclub_core::{FieldErrors, Money, ReceiptLineRecord, ReceiptNote, ReceiptStatus, Supplier};

use crate::error::{ApiError, ApiResult};
use crate::state::{DbState, LedgerState};

// =============================================================================
// Views
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptRowView {
    pub index: usize,
    pub product_id: Option<i64>,
    pub variant_id: Option<i64>,
    pub sku: String,
    pub color: String,
    pub size: String,
    pub quantity: String,
    pub unit_cost: String,
    pub subtotal: Money,
    /// Variants offered for the row's product.
    pub variant_choices: Vec<VariantOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptDraftView {
    pub supplier_id: Option<i64>,
    pub received_date: Option<NaiveDate>,
    pub note: String,
    pub rows: Vec<ReceiptRowView>,
    pub total: Money,
    /// Everything still blocking submission, keyed like `details[1].quantity`.
    pub errors: FieldErrors,
    pub submittable: bool,
}

impl ReceiptDraftView {
    pub fn of(ledger: &ReceiptLedger) -> Self {
        let rows = ledger
            .rows()
            .iter()
            .enumerate()
            .map(|(index, row)| ReceiptRowView {
                index,
                product_id: row.product_id(),
                variant_id: row.variant_id(),
                sku: row.sku().to_string(),
                color: row.color().to_string(),
                size: row.size().to_string(),
                quantity: row.quantity().to_string(),
                unit_cost: row.unit_cost().to_string(),
                subtotal: row.subtotal(),
                variant_choices: ledger.options_for_row(index).into_iter().cloned().collect(),
            })
            .collect();

        ReceiptDraftView {
            supplier_id: ledger.supplier_id,
            received_date: ledger.received_date,
            note: ledger.note.clone(),
            rows,
            total: ledger.total(),
            errors: ledger.submission_errors(),
            submittable: ledger.is_submittable(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptHeader {
    pub supplier_id: Option<i64>,
    pub received_date: Option<NaiveDate>,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptDetail {
    pub note: ReceiptNote,
    pub lines: Vec<ReceiptLineRecord>,
}

// =============================================================================
// Draft Commands
// =============================================================================

/// Opens a fresh draft with one blank row, loaded with the current variants.
pub async fn new_receipt_draft(db: &DbState, ledger: &LedgerState) -> ApiResult<ReceiptDraftView> {
    let snapshot = db.inner().catalog().snapshot().await?;
    let mut draft = ReceiptLedger::with_variants(snapshot.variant_options());
    draft.add_row();

    let view = ReceiptDraftView::of(&draft);
    ledger.replace(draft);
    Ok(view)
}

pub fn receipt_draft(ledger: &LedgerState) -> ApiResult<ReceiptDraftView> {
    ledger.with_draft(ReceiptDraftView::of)
}

pub fn set_receipt_header(ledger: &LedgerState, header: ReceiptHeader) -> ApiResult<ReceiptDraftView> {
    edit(ledger, |draft| {
        draft.supplier_id = header.supplier_id;
        draft.received_date = header.received_date;
        draft.note = header.note;
        Ok(())
    })
}

pub fn add_receipt_row(ledger: &LedgerState) -> ApiResult<ReceiptDraftView> {
    edit(ledger, |draft| {
        draft.add_row();
        Ok(())
    })
}

pub fn remove_receipt_row(ledger: &LedgerState, index: usize) -> ApiResult<ReceiptDraftView> {
    edit(ledger, |draft| {
        draft.remove_row(index)?;
        Ok(())
    })
}

/// Picks the row's product. Only products with an active variant qualify.
pub fn select_receipt_product(
    ledger: &LedgerState,
    index: usize,
    product_id: i64,
) -> ApiResult<ReceiptDraftView> {
    edit(ledger, |draft| {
        if variants_for_product(draft.options(), product_id).is_empty() {
            return Err(ApiError::not_found("Product", product_id));
        }
        draft.select_product(index, product_id)?;
        Ok(())
    })
}

/// Picks the row's variant. A SKU already on another row is a conflict.
pub fn select_receipt_variant(
    ledger: &LedgerState,
    index: usize,
    variant_id: i64,
) -> ApiResult<ReceiptDraftView> {
    edit(ledger, |draft| {
        draft.select_variant(index, variant_id)?;
        Ok(())
    })
}

pub fn update_receipt_field(
    ledger: &LedgerState,
    index: usize,
    field: LineField,
    value: &str,
) -> ApiResult<ReceiptDraftView> {
    edit(ledger, |draft| {
        draft.update_field(index, field, value)?;
        Ok(())
    })
}

fn edit<F>(ledger: &LedgerState, f: F) -> ApiResult<ReceiptDraftView>
where
    F: FnOnce(&mut ReceiptLedger) -> ApiResult<()>,
{
    ledger.with_draft_mut(|draft| {
        f(draft)?;
        Ok(ReceiptDraftView::of(draft))
    })
}

// =============================================================================
// Stored Receipts
// =============================================================================

/// Stores the draft as a `PENDING` note and closes it.
///
/// An incomplete draft is refused with per-row field errors and stays open.
pub async fn submit_receipt(db: &DbState, ledger: &LedgerState) -> ApiResult<ReceiptNote> {
    let draft = ledger.with_draft(ReceiptLedger::clone)?;
    let note = draft.submit(&db.inner().receipts()).await?;
    ledger.discard();
    Ok(note)
}

pub async fn approve_receipt(db: &DbState, receipt_id: i64) -> ApiResult<ReceiptNote> {
    let note = db.inner().receipts().approve(receipt_id).await?;
    info!(receipt_id, "Receipt approved");
    Ok(note)
}

pub async fn cancel_receipt(db: &DbState, receipt_id: i64) -> ApiResult<ReceiptNote> {
    let note = db.inner().receipts().cancel(receipt_id).await?;
    info!(receipt_id, "Receipt cancelled");
    Ok(note)
}

pub async fn receipt_lines(db: &DbState, receipt_id: i64) -> ApiResult<ReceiptDetail> {
    let receipts = db.inner().receipts();
    let note = receipts
        .get(receipt_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Receipt", receipt_id))?;
    Ok(ReceiptDetail {
        lines: receipts.lines(receipt_id).await?,
        note,
    })
}

pub async fn list_receipts(db: &DbState, status: Option<ReceiptStatus>) -> ApiResult<Vec<ReceiptNote>> {
    Ok(db.inner().receipts().list(status).await?)
}

/// Suppliers for the draft header dropdown.
pub async fn list_suppliers(db: &DbState) -> ApiResult<Vec<Supplier>> {
    Ok(db.inner().suppliers().list_active().await?)
}
