use axum::{
    extract::{Query, State},
    Json,
};
use clinicbook_core::models::time_slot::NormalizedDateTime;
use serde::Deserialize;
use std::sync::Arc;

use crate::{middleware::error_handling::AppError, ApiState};

#[derive(Debug, Deserialize)]
pub struct NormalizeQuery {
    pub text: Option<String>,
}

#[axum::debug_handler]
pub async fn normalize(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<NormalizeQuery>,
) -> Result<Json<NormalizedDateTime>, AppError> {
    let text = query.text.unwrap_or_default();
    Ok(Json(state.engine.normalize(&text)?))
}
