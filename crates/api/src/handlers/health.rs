use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use crate::ApiState;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub db: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VersionResponse {
    pub version: String,
}

/// Always answers `ok`; `db` reports whether storage answered a ping.
pub async fn health_check(State(state): State<Arc<ApiState>>) -> Json<HealthResponse> {
    let db = match state.engine.store().ping().await {
        Ok(()) => true,
        Err(e) => {
            warn!("Health check could not reach storage: {}", e);
            false
        }
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        db,
    })
}

pub async fn version() -> Json<VersionResponse> {
    Json(VersionResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
