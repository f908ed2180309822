use std::sync::Arc;

use axum::http::StatusCode;
use clinicbook_core::{errors::ScheduleError, models::appointment::AppointmentStatus, store::memory::MemoryStore};
use clinicbook_db::mock::store::MockAppointmentStore;
use eyre::eyre;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;

use crate::test_utils::{app, appointment, dubai, get, post_json, send, LOCATION, PROVIDER};

#[test_log::test(tokio::test)]
async fn test_book_appointment() {
    let store = MemoryStore::new();
    let request = post_json(
        "/api/appointments",
        json!({ "user_id": "patient-42", "start": "tomorrow 09:30" }),
    );

    let (status, body) = send(app(Arc::new(store.clone())), request).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["start"], "2025-11-11T09:30:00+04:00");
    assert_eq!(body["end"], "2025-11-11T10:00:00+04:00");
    assert_eq!(body["provider"], PROVIDER);
    assert_eq!(body["location"], LOCATION);
    assert_eq!(body["status"], "pending");

    let stored = store.all().await;
    assert_eq!(stored.len(), 1);
    assert_eq!(body["appointment_id"], stored[0].id.to_string());
    assert_eq!(stored[0].user_id, "patient-42");
}

#[tokio::test]
async fn test_book_with_custom_duration() {
    let request = post_json(
        "/api/appointments",
        json!({ "user_id": "patient-42", "start": "2025-11-12 14:00", "duration_minutes": 45 }),
    );

    let (status, body) = send(app(Arc::new(MemoryStore::new())), request).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["end"], "2025-11-12T14:45:00+04:00");
}

#[tokio::test]
async fn test_booked_slot_disappears_from_listing() {
    let store = Arc::new(MemoryStore::new());
    let request = post_json(
        "/api/appointments",
        json!({ "user_id": "patient-42", "start": "tomorrow 09:00" }),
    );
    let (status, _) = send(app(store.clone()), request).await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = send(app(store), get("/api/slots?date=tomorrow")).await;
    assert_eq!(body["slots"][0]["start"], "2025-11-11T09:30:00+04:00");
}

#[tokio::test]
async fn test_overlapping_booking_is_conflict() {
    let store = MemoryStore::new();
    store
        .seed(appointment(dubai(2025, 11, 11, 9, 0), 60, AppointmentStatus::Confirmed))
        .await;

    let request = post_json(
        "/api/appointments",
        json!({ "user_id": "patient-42", "start": "tomorrow 09:30" }),
    );
    let (status, body) = send(app(Arc::new(store.clone())), request).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("already booked"));
    assert_eq!(store.all().await.len(), 1);
}

#[rstest]
#[case(json!({ "user_id": "", "start": "tomorrow 09:30" }))]
#[case(json!({ "user_id": "patient-42", "start": "" }))]
#[case(json!({ "user_id": "patient-42", "start": "tomorrow 09:30", "duration_minutes": 0 }))]
#[case(json!({ "user_id": "patient-42", "start": "when the moon is full" }))]
#[tokio::test]
async fn test_rejected_bookings_are_bad_request(#[case] payload: serde_json::Value) {
    let store = MemoryStore::new();

    let (status, body) = send(app(Arc::new(store.clone())), post_json("/api/appointments", payload)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
    assert!(store.all().await.is_empty());
}

#[tokio::test]
async fn test_storage_failure_while_booking() {
    let mut store = MockAppointmentStore::new();
    store
        .expect_begin_booking()
        .times(1)
        .returning(|_, _| Err(ScheduleError::Storage(eyre!("pool timed out"))));

    let request = post_json(
        "/api/appointments",
        json!({ "user_id": "patient-42", "start": "tomorrow 09:30" }),
    );
    let (status, body) = send(app(Arc::new(store)), request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Storage error: pool timed out");
}
