use std::error::Error;

use chrono::{TimeZone, Utc};
use clinicbook_core::errors::{ScheduleError, ScheduleResult};

#[test]
fn test_schedule_error_display() {
    let parse = ScheduleError::date_parse(
        "someday",
        vec!["natural: unrecognized".to_string(), "strict: no layout".to_string()],
    );
    let duration = ScheduleError::InvalidDuration(-5);
    let conflict = ScheduleError::Conflict {
        provider: "Dr. Bob Dentist".to_string(),
        start: Utc.with_ymd_and_hms(2025, 11, 15, 6, 0, 0).unwrap(),
        end: Utc.with_ymd_and_hms(2025, 11, 15, 6, 30, 0).unwrap(),
    };
    let validation = ScheduleError::Validation("user id is required".to_string());
    let storage = ScheduleError::Storage(eyre::eyre!("Database connection failed"));

    assert_eq!(
        parse.to_string(),
        "Could not understand date 'someday': natural: unrecognized; strict: no layout"
    );
    assert_eq!(duration.to_string(), "Invalid appointment duration: -5 minutes");
    assert!(conflict.to_string().contains("already booked for Dr. Bob Dentist"));
    assert_eq!(validation.to_string(), "Validation error: user id is required");
    assert!(storage.to_string().contains("Storage error:"));
}

#[test]
fn test_eyre_report_converts_to_storage_error() {
    fn failing() -> ScheduleResult<()> {
        let insert: eyre::Result<()> = Err(eyre::eyre!("insert failed"));
        insert?;
        Ok(())
    }

    let err = failing().unwrap_err();
    assert!(matches!(err, ScheduleError::Storage(_)));
    assert!(err.to_string().contains("insert failed"));
}

#[test]
fn test_storage_error_keeps_source_chain() {
    let io_error = std::io::Error::new(std::io::ErrorKind::Other, "socket closed");
    let err = ScheduleError::Storage(eyre::Report::new(io_error));

    assert!(err.source().is_some());
}

#[test]
fn test_schedule_result() {
    let result: ScheduleResult<i32> = Ok(42);
    assert_eq!(result.unwrap(), 42);

    let result: ScheduleResult<i32> = Err(ScheduleError::InvalidDuration(0));
    assert!(result.is_err());
}
