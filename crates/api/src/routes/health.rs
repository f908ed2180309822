use axum::{routing::get, Router};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/version", get(handlers::health::version))
}
