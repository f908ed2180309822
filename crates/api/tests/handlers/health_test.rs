use std::sync::Arc;

use axum::http::StatusCode;
use clinicbook_core::{errors::ScheduleError, store::memory::MemoryStore};
use clinicbook_db::mock::store::MockAppointmentStore;
use eyre::eyre;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::test_utils::{app, get, send};

#[tokio::test]
async fn test_health_reports_reachable_storage() {
    let (status, body) = send(app(Arc::new(MemoryStore::new())), get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok", "db": true }));
}

#[tokio::test]
async fn test_health_reports_unreachable_storage() {
    let mut store = MockAppointmentStore::new();
    store
        .expect_ping()
        .returning(|| Err(ScheduleError::Storage(eyre!("connection refused"))));

    let (status, body) = send(app(Arc::new(store)), get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok", "db": false }));
}

#[tokio::test]
async fn test_version() {
    let (status, body) = send(app(Arc::new(MemoryStore::new())), get("/version")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}
