//! # Receipt Ledger
//!
//! The editable list of line items behind a draft goods-receipt note (GRN).
//!
//! ## Row Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    One Ledger Row                                       │
//! │                                                                         │
//! │  add_row()          { product: -, variant: -, qty: "", cost: "" }       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  select_product()   product set; variant/sku/color/size/cost cleared    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  select_variant()   sku/color/size/cost filled from the variant         │
//! │       │             ✗ sku already on another row → DuplicateSku,        │
//! │       │               row untouched, existing row reported              │
//! │       ▼                                                                 │
//! │  update_field()     raw quantity / unit cost text stored                │
//! │                                                                         │
//! │  subtotal = max(0, int(qty)) × max(0, int(cost))   (derived, never set) │
//! │  total    = Σ subtotal                             (computed per read)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Readiness
//! - [`ReceiptLedger::validate`]: supplier, received date, at least one row
//! - [`ReceiptLedger::is_submittable`]: the above plus every row complete
//! - [`ReceiptLedger::submit`]: builds the [`NewReceipt`] payload and hands it
//!   to a [`ReceiptGateway`]. Gateway failures come back untouched.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};
use ts_rs::TS;

use crate::error::{FieldErrors, LedgerError};
use crate::money::Money;
use crate::types::{Color, Product, ReceiptNote, ReceiptStatus, Size, Variant};
use crate::UNKNOWN_LABEL;

// =============================================================================
// Integer Parsing
// =============================================================================

/// Parses the leading integer of `input` the way a browser form does.
///
/// Leading whitespace is skipped, one optional sign is accepted, then the
/// longest run of digits is read. `0x`/`0X` switches to hexadecimal. Anything
/// after the digits is ignored. No digits at all yields `None`.
///
/// ```rust
/// use uniclub_core::ledger::parse_int;
///
/// assert_eq!(parse_int("12"), Some(12));
/// assert_eq!(parse_int("  7 units"), Some(7));
/// assert_eq!(parse_int("12.9"), Some(12));
/// assert_eq!(parse_int("-3"), Some(-3));
/// assert_eq!(parse_int("abc"), None);
/// ```
pub fn parse_int(input: &str) -> Option<i64> {
    let s = input.trim_start();
    let (negative, s) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let (radix, digits) = match s.get(..2) {
        Some("0x") | Some("0X") => (16, &s[2..]),
        _ => (10, s),
    };

    let mut value: i64 = 0;
    let mut seen = false;
    for ch in digits.chars() {
        let Some(d) = ch.to_digit(radix) else { break };
        value = value.saturating_mul(radix as i64).saturating_add(d as i64);
        seen = true;
    }

    if !seen {
        return None;
    }
    Some(if negative { -value } else { value })
}

/// `max(0, parse_int(input))`, unparseable input counting as zero.
#[inline]
pub fn non_negative_int(input: &str) -> i64 {
    parse_int(input).unwrap_or(0).max(0)
}

// =============================================================================
// Variant Options
// =============================================================================

/// A variant as the row pickers show it, with color and size resolved to names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct VariantOption {
    pub variant_id: i64,
    pub sku: String,
    pub product_id: i64,
    pub product_name: String,
    pub color: String,
    pub size: String,
    pub price: Option<Money>,
}

/// Enriches variants with product, color and size names.
///
/// Lookups that miss fall back to [`UNKNOWN_LABEL`] ("Unknown" for a missing
/// product). Inactive variants are not offered.
pub fn variant_options(
    products: &[Product],
    variants: &[Variant],
    colors: &[Color],
    sizes: &[Size],
) -> Vec<VariantOption> {
    variants
        .iter()
        .filter(|v| v.is_active)
        .map(|v| {
            let name_of = |facets: &[crate::types::Facet], id: i64| {
                facets
                    .iter()
                    .find(|f| f.id == id)
                    .map(|f| f.name.clone())
                    .unwrap_or_else(|| UNKNOWN_LABEL.to_string())
            };
            VariantOption {
                variant_id: v.id,
                sku: v.sku.clone(),
                product_id: v.product_id,
                product_name: products
                    .iter()
                    .find(|p| p.id == v.product_id)
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| "Unknown".to_string()),
                color: name_of(colors, v.color_id),
                size: name_of(sizes, v.size_id),
                price: v.price,
            }
        })
        .collect()
}

/// Options belonging to one product, in input order.
pub fn variants_for_product(options: &[VariantOption], product_id: i64) -> Vec<&VariantOption> {
    options
        .iter()
        .filter(|o| o.product_id == product_id)
        .collect()
}

// =============================================================================
// Receipt Line
// =============================================================================

/// Editable field of a ledger row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum LineField {
    Quantity,
    UnitCost,
}

/// One row of the ledger.
///
/// Quantity and unit cost keep the raw text the user typed. The subtotal is
/// always derived from them and has no setter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ReceiptLine {
    product_id: Option<i64>,
    variant_id: Option<i64>,
    sku: String,
    color: String,
    size: String,
    quantity: String,
    unit_cost: String,
}

impl ReceiptLine {
    pub fn product_id(&self) -> Option<i64> {
        self.product_id
    }

    pub fn variant_id(&self) -> Option<i64> {
        self.variant_id
    }

    /// Empty until a variant is chosen.
    pub fn sku(&self) -> &str {
        &self.sku
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn size(&self) -> &str {
        &self.size
    }

    /// Raw quantity text.
    pub fn quantity(&self) -> &str {
        &self.quantity
    }

    /// Raw unit cost text.
    pub fn unit_cost(&self) -> &str {
        &self.unit_cost
    }

    /// `max(0, int(quantity)) × max(0, int(unit_cost))`.
    pub fn subtotal(&self) -> Money {
        Money::from_dong(non_negative_int(&self.unit_cost))
            .multiply_quantity(non_negative_int(&self.quantity))
    }

    /// Product, variant, positive quantity and positive unit cost all present.
    pub fn is_complete(&self) -> bool {
        self.product_id.is_some()
            && self.variant_id.is_some()
            && parse_int(&self.quantity).is_some_and(|q| q > 0)
            && parse_int(&self.unit_cost).is_some_and(|c| c > 0)
    }

    fn clear_variant(&mut self) {
        self.variant_id = None;
        self.sku.clear();
        self.color.clear();
        self.size.clear();
        self.unit_cost.clear();
    }
}

// =============================================================================
// Payload
// =============================================================================

/// One line of a receipt handed to the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewReceiptLine {
    pub variant_id: i64,
    pub sku: String,
    pub quantity: i64,
    pub unit_cost: Money,
    pub subtotal: Money,
}

/// A complete receipt ready to be stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewReceipt {
    pub supplier_id: i64,
    #[ts(as = "String")]
    pub received_date: NaiveDate,
    pub note: Option<String>,
    pub total_cost: Money,
    /// Always [`ReceiptStatus::Pending`] on creation.
    pub status: ReceiptStatus,
    pub lines: Vec<NewReceiptLine>,
}

// =============================================================================
// Gateway Port
// =============================================================================

/// The "create receipt" collaborator.
///
/// Implemented by the receipt repository. The ledger calls it once per
/// submission and never retries.
#[allow(async_fn_in_trait)]
pub trait ReceiptGateway {
    type Error: std::error::Error + 'static;

    async fn create_receipt(&self, receipt: NewReceipt) -> Result<ReceiptNote, Self::Error>;
}

/// Why a submission did not produce a stored receipt.
#[derive(Debug, Error)]
pub enum SubmitError<E: std::error::Error + 'static> {
    /// The ledger is not ready; nothing was sent.
    #[error("Receipt is incomplete: {0}")]
    Invalid(FieldErrors),

    /// The gateway refused or failed.
    #[error("Receipt gateway failed: {0}")]
    Gateway(#[source] E),
}

// =============================================================================
// Ledger
// =============================================================================

/// Draft goods-receipt note: header fields plus the editable rows.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ReceiptLedger {
    pub supplier_id: Option<i64>,
    #[ts(as = "Option<String>")]
    pub received_date: Option<NaiveDate>,
    pub note: String,
    lines: Vec<ReceiptLine>,
    #[serde(skip)]
    #[ts(skip)]
    options: Vec<VariantOption>,
}

impl ReceiptLedger {
    /// Empty ledger with no variants to pick from.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty ledger whose rows pick from `options`.
    pub fn with_variants(options: Vec<VariantOption>) -> Self {
        ReceiptLedger {
            options,
            ..Self::default()
        }
    }

    pub fn rows(&self) -> &[ReceiptLine] {
        &self.lines
    }

    /// Variants the rows pick from.
    pub fn options(&self) -> &[VariantOption] {
        &self.options
    }

    pub fn row(&self, index: usize) -> Option<&ReceiptLine> {
        self.lines.get(index)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Variants the picker of row `index` offers.
    pub fn options_for_row(&self, index: usize) -> Vec<&VariantOption> {
        match self.lines.get(index).and_then(|l| l.product_id) {
            Some(product_id) => variants_for_product(&self.options, product_id),
            None => Vec::new(),
        }
    }

    // -------------------------------------------------------------------------
    // Row operations
    // -------------------------------------------------------------------------

    /// Appends a blank row and returns its index.
    pub fn add_row(&mut self) -> usize {
        self.lines.push(ReceiptLine::default());
        self.lines.len() - 1
    }

    /// Removes and returns the row at `index`.
    pub fn remove_row(&mut self, index: usize) -> Result<ReceiptLine, LedgerError> {
        self.check_index(index)?;
        Ok(self.lines.remove(index))
    }

    /// Sets the row's product and forgets any variant chosen for the old one.
    pub fn select_product(&mut self, index: usize, product_id: i64) -> Result<(), LedgerError> {
        let line = self.line_mut(index)?;
        line.product_id = Some(product_id);
        line.clear_variant();
        Ok(())
    }

    /// Fills the row from one of its product's variants.
    ///
    /// ## Errors
    /// - [`LedgerError::UnknownVariant`] if the row's product has no such variant
    /// - [`LedgerError::DuplicateSku`] if another row already carries the SKU;
    ///   `existing_row` is that other row
    ///
    /// The row is unchanged on error.
    pub fn select_variant(&mut self, index: usize, variant_id: i64) -> Result<(), LedgerError> {
        self.check_index(index)?;

        let product_id = self.lines[index].product_id;
        let option = self
            .options
            .iter()
            .find(|o| o.variant_id == variant_id && Some(o.product_id) == product_id)
            .cloned()
            .ok_or(LedgerError::UnknownVariant { variant_id })?;

        if let Some(existing_row) = self
            .lines
            .iter()
            .enumerate()
            .position(|(i, l)| i != index && !l.sku.is_empty() && l.sku == option.sku)
        {
            debug!(sku = %option.sku, existing_row, "Duplicate SKU rejected");
            return Err(LedgerError::DuplicateSku {
                sku: option.sku,
                existing_row,
            });
        }

        let line = &mut self.lines[index];
        line.variant_id = Some(option.variant_id);
        line.sku = option.sku;
        line.color = option.color;
        line.size = option.size;
        line.unit_cost = option
            .price
            .map(|p| p.amount().to_string())
            .unwrap_or_default();
        Ok(())
    }

    /// Stores the raw text typed into a quantity or unit cost cell.
    pub fn update_field(
        &mut self,
        index: usize,
        field: LineField,
        value: &str,
    ) -> Result<(), LedgerError> {
        let line = self.line_mut(index)?;
        match field {
            LineField::Quantity => line.quantity = value.to_string(),
            LineField::UnitCost => line.unit_cost = value.to_string(),
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Derived values
    // -------------------------------------------------------------------------

    /// Sum of all row subtotals.
    pub fn total(&self) -> Money {
        self.lines.iter().map(ReceiptLine::subtotal).sum()
    }

    /// Header-level form errors. An empty map means the form may be sent.
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.supplier_id.is_none() {
            errors.insert("supplier_id", "Supplier is required");
        }
        if self.received_date.is_none() {
            errors.insert("received_date", "Received date is required");
        }
        if self.lines.is_empty() {
            errors.insert("details", "At least one line is required");
        }
        errors
    }

    /// Whether the submit control should be enabled.
    pub fn is_submittable(&self) -> bool {
        self.validate().is_empty() && self.lines.iter().all(ReceiptLine::is_complete)
    }

    /// [`Self::validate`] plus one entry per incomplete row.
    pub fn submission_errors(&self) -> FieldErrors {
        let mut errors = self.validate();
        for (i, line) in self.lines.iter().enumerate() {
            if line.product_id.is_none() {
                errors.insert(format!("details[{i}].product_id"), "Product is required");
            }
            if line.variant_id.is_none() {
                errors.insert(format!("details[{i}].variant_id"), "Variant is required");
            }
            if !parse_int(&line.quantity).is_some_and(|q| q > 0) {
                errors.insert(
                    format!("details[{i}].quantity"),
                    "Quantity must be a positive integer",
                );
            }
            if !parse_int(&line.unit_cost).is_some_and(|c| c > 0) {
                errors.insert(
                    format!("details[{i}].unit_cost"),
                    "Unit cost must be a positive integer",
                );
            }
        }
        errors
    }

    /// Builds the payload, or the reasons it cannot be built.
    pub fn payload(&self) -> Result<NewReceipt, FieldErrors> {
        let errors = self.submission_errors();
        let (Some(supplier_id), Some(received_date)) = (self.supplier_id, self.received_date)
        else {
            return Err(errors);
        };
        errors.into_result()?;

        let mut lines = Vec::with_capacity(self.lines.len());
        for line in &self.lines {
            let Some(variant_id) = line.variant_id else {
                continue;
            };
            lines.push(NewReceiptLine {
                variant_id,
                sku: line.sku.clone(),
                quantity: non_negative_int(&line.quantity),
                unit_cost: Money::from_dong(non_negative_int(&line.unit_cost)),
                subtotal: line.subtotal(),
            });
        }

        let note = self.note.trim();
        Ok(NewReceipt {
            supplier_id,
            received_date,
            note: (!note.is_empty()).then(|| note.to_string()),
            total_cost: self.total(),
            status: ReceiptStatus::Pending,
            lines,
        })
    }

    /// Sends the receipt through `gateway` exactly once.
    ///
    /// Gated on [`ReceiptLedger::submission_errors`], not only on
    /// [`ReceiptLedger::validate`]: every row must carry a variant, a
    /// positive quantity and a positive unit cost before anything is sent.
    pub async fn submit<G: ReceiptGateway>(
        &self,
        gateway: &G,
    ) -> Result<ReceiptNote, SubmitError<G::Error>> {
        let payload = self.payload().map_err(SubmitError::Invalid)?;
        let line_count = payload.lines.len();
        let total = payload.total_cost;

        let receipt = gateway
            .create_receipt(payload)
            .await
            .map_err(SubmitError::Gateway)?;

        info!(receipt_id = receipt.id, lines = line_count, total = %total, "Receipt submitted");
        Ok(receipt)
    }

    // -------------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------------

    fn check_index(&self, index: usize) -> Result<(), LedgerError> {
        if index >= self.lines.len() {
            return Err(LedgerError::RowOutOfRange {
                index,
                len: self.lines.len(),
            });
        }
        Ok(())
    }

    fn line_mut(&mut self, index: usize) -> Result<&mut ReceiptLine, LedgerError> {
        let len = self.lines.len();
        self.lines
            .get_mut(index)
            .ok_or(LedgerError::RowOutOfRange { index, len })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
