//! # Review Commands

use serde::Deserialize;

use uniclub_core::Review;

use crate::error::ApiResult;
use crate::state::{DbState, SessionState};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    pub product_id: i64,
    pub stars: i64,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Posts a rating as the signed-in shopper.
pub async fn submit_review(
    db: &DbState,
    session: &SessionState,
    request: ReviewRequest,
) -> ApiResult<Review> {
    let user = session.require_user()?;
    Ok(db
        .inner()
        .catalog()
        .insert_review(
            request.product_id,
            user.id,
            request.stars,
            request.comment.as_deref(),
        )
        .await?)
}
