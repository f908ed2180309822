use std::sync::Arc;

use axum::http::StatusCode;
use clinicbook_core::{errors::ScheduleError, models::appointment::AppointmentStatus, store::memory::MemoryStore};
use clinicbook_db::mock::store::MockAppointmentStore;
use eyre::eyre;
use pretty_assertions::assert_eq;

use crate::test_utils::{app, appointment, dubai, get, send};

#[test_log::test(tokio::test)]
async fn test_list_slots_for_tomorrow() {
    let (status, body) = send(app(Arc::new(MemoryStore::new())), get("/api/slots?date=tomorrow")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["date"], "2025-11-11");

    let slots = body["slots"].as_array().unwrap();
    assert_eq!(slots.len(), 10);
    assert_eq!(slots[0]["start"], "2025-11-11T09:00:00+04:00");
    assert_eq!(slots[0]["end"], "2025-11-11T09:30:00+04:00");
    assert_eq!(slots[9]["start"], "2025-11-11T13:30:00+04:00");
}

#[tokio::test]
async fn test_booked_slot_is_not_listed() {
    let store = MemoryStore::new();
    store
        .seed(appointment(dubai(2025, 11, 11, 9, 0), 30, AppointmentStatus::Confirmed))
        .await;
    store
        .seed(appointment(dubai(2025, 11, 11, 10, 0), 30, AppointmentStatus::Cancelled))
        .await;

    let (status, body) = send(app(Arc::new(store)), get("/api/slots?date=2025-11-11")).await;

    assert_eq!(status, StatusCode::OK);
    let starts: Vec<&str> = body["slots"]
        .as_array()
        .unwrap()
        .iter()
        .map(|slot| slot["start"].as_str().unwrap())
        .collect();
    assert_eq!(starts[0], "2025-11-11T09:30:00+04:00");
    assert!(starts.contains(&"2025-11-11T10:00:00+04:00"));
    assert!(!starts.contains(&"2025-11-11T09:00:00+04:00"));
}

#[tokio::test]
async fn test_unparseable_date_is_bad_request() {
    let (status, body) = send(app(Arc::new(MemoryStore::new())), get("/api/slots?date=someday%20maybe")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Could not understand date 'someday maybe'"));
}

#[tokio::test]
async fn test_missing_date_is_bad_request() {
    let (status, body) = send(app(Arc::new(MemoryStore::new())), get("/api/slots")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_storage_failure_is_internal_error() {
    let mut store = MockAppointmentStore::new();
    store
        .expect_active_appointments()
        .times(1)
        .returning(|_, _| Err(ScheduleError::Storage(eyre!("connection refused"))));

    let (status, body) = send(app(Arc::new(store)), get("/api/slots?date=tomorrow")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Storage error: connection refused");
}
