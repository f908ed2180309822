use std::sync::Arc;

use axum::http::StatusCode;
use clinicbook_core::store::memory::MemoryStore;
use pretty_assertions::assert_eq;

use crate::test_utils::{app, get, send};

#[tokio::test]
async fn test_normalize_free_text() {
    let (status, body) = send(
        app(Arc::new(MemoryStore::new())),
        get("/api/normalize?text=next%20friday%20at%2010%3A30am"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["input"], "next friday at 10:30am");
    assert_eq!(body["normalized"], "2025-11-14T10:30:00+04:00");
}

#[tokio::test]
async fn test_normalize_rejects_nonsense() {
    let (status, body) = send(app(Arc::new(MemoryStore::new())), get("/api/normalize?text=blue")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Could not understand date 'blue'"));
}
