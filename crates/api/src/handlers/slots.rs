use axum::{
    extract::{Query, State},
    Json,
};
use clinicbook_core::models::time_slot::SlotListing;
use serde::Deserialize;
use std::sync::Arc;

use crate::{middleware::error_handling::AppError, ApiState};

#[derive(Debug, Deserialize)]
pub struct SlotsQuery {
    /// Free-text day, e.g. "tomorrow" or "2025-11-15"
    pub date: Option<String>,
}

/// Lists free slots of the clinic provider for one day.
///
/// ```text
/// GET /api/slots?date=tomorrow
/// ```
#[axum::debug_handler]
pub async fn list_slots(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<SlotListing>, AppError> {
    let date_text = query.date.unwrap_or_default();
    let listing = state.engine.list_slots(&date_text).await?;

    Ok(Json(listing))
}
