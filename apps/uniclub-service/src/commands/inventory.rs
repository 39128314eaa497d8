//! # Inventory Commands

use serde::{Deserialize, Serialize};
use tracing::info;

use uniclub_core::Variant;

use crate::error::ApiResult;
use crate::state::DbState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockDirection {
    Increase,
    Decrease,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockAdjustment {
    pub variant_id: i64,
    pub direction: StockDirection,
    /// Must be positive.
    pub amount: i64,
}

/// Manual stock correction. A decrease never takes stock below zero.
pub async fn adjust_stock(db: &DbState, adjustment: StockAdjustment) -> ApiResult<Variant> {
    let catalog = db.inner().catalog();
    let variant = match adjustment.direction {
        StockDirection::Increase => {
            catalog
                .increase_stock(adjustment.variant_id, adjustment.amount)
                .await?
        }
        StockDirection::Decrease => {
            catalog
                .decrease_stock(adjustment.variant_id, adjustment.amount)
                .await?
        }
    };

    info!(
        variant_id = variant.id,
        direction = ?adjustment.direction,
        amount = adjustment.amount,
        "Stock adjusted"
    );
    Ok(variant)
}
