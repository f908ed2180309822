use axum::{body::to_bytes, http::StatusCode, response::IntoResponse};
use chrono::{TimeZone, Utc};
use clinicbook_api::middleware::error_handling::AppError;
use clinicbook_core::errors::ScheduleError;
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
#[case(ScheduleError::date_parse("soonish", vec!["natural: no date found".to_string()]), StatusCode::BAD_REQUEST)]
#[case(ScheduleError::InvalidDuration(-5), StatusCode::BAD_REQUEST)]
#[case(ScheduleError::Validation("user id is required".to_string()), StatusCode::BAD_REQUEST)]
#[case(
    ScheduleError::Conflict {
        provider: "Dr. Bob Dentist".to_string(),
        start: Utc.with_ymd_and_hms(2025, 11, 11, 5, 30, 0).unwrap(),
        end: Utc.with_ymd_and_hms(2025, 11, 11, 6, 0, 0).unwrap(),
    },
    StatusCode::CONFLICT
)]
#[case(ScheduleError::Config("bad hours".to_string()), StatusCode::INTERNAL_SERVER_ERROR)]
#[case(ScheduleError::Storage(eyre::eyre!("disk full")), StatusCode::INTERNAL_SERVER_ERROR)]
fn test_error_status_mapping(#[case] error: ScheduleError, #[case] expected: StatusCode) {
    assert_eq!(AppError(error).into_response().status(), expected);
}

#[tokio::test]
async fn test_error_body_carries_message() {
    let response = AppError(ScheduleError::InvalidDuration(0)).into_response();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(body, serde_json::json!({ "error": "Invalid appointment duration: 0 minutes" }));
}

#[test]
fn test_eyre_report_becomes_storage_error() {
    let error = AppError::from(eyre::eyre!("socket closed"));

    assert!(matches!(error.0, ScheduleError::Storage(_)));
    assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
