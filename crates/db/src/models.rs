use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;
use clinicbook_core::models::appointment::{Appointment, AppointmentStatus};
use clinicbook_core::temporal::localize;
use eyre::{eyre, Result};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// How `appointments.start_time` and `end_time` are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampKind {
    /// `timestamp with time zone`
    Aware,
    /// `timestamp without time zone`, holding clinic wall-clock values.
    Naive,
}

impl TimestampKind {
    pub fn from_data_type(data_type: &str) -> Self {
        if data_type.eq_ignore_ascii_case("timestamp without time zone") {
            TimestampKind::Naive
        } else {
            TimestampKind::Aware
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbAppointment {
    pub id: Uuid,
    pub user_id: String,
    pub chat_session_id: Option<Uuid>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: String,
    pub notes: Option<String>,
    pub provider_name: String,
    pub location: String,
}

/// Row read from a table whose timestamps carry no zone.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbNaiveAppointment {
    pub id: Uuid,
    pub user_id: String,
    pub chat_session_id: Option<Uuid>,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub status: String,
    pub notes: Option<String>,
    pub provider_name: String,
    pub location: String,
}

impl DbAppointment {
    pub fn into_appointment(self) -> Result<Appointment> {
        let status = parse_status(&self.status)?;
        Ok(Appointment {
            id: self.id,
            user_id: self.user_id,
            chat_session_id: self.chat_session_id,
            start: self.start_time,
            end: self.end_time,
            status,
            provider: self.provider_name,
            location: self.location,
            notes: self.notes,
        })
    }
}

impl DbNaiveAppointment {
    /// Reads the stored wall-clock values as clinic-local time.
    pub fn into_appointment(self, tz: &Tz) -> Result<Appointment> {
        let status = parse_status(&self.status)?;
        let start = localize(tz, self.start_time)
            .ok_or_else(|| eyre!("start_time {} does not exist in {}", self.start_time, tz))?;
        let end = localize(tz, self.end_time)
            .ok_or_else(|| eyre!("end_time {} does not exist in {}", self.end_time, tz))?;

        Ok(Appointment {
            id: self.id,
            user_id: self.user_id,
            chat_session_id: self.chat_session_id,
            start: start.with_timezone(&Utc),
            end: end.with_timezone(&Utc),
            status,
            provider: self.provider_name,
            location: self.location,
            notes: self.notes,
        })
    }
}

fn parse_status(raw: &str) -> Result<AppointmentStatus> {
    raw.parse::<AppointmentStatus>().map_err(|e| eyre!(e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use chrono_tz::Asia::Dubai;
    use pretty_assertions::assert_eq;

    fn naive_row(status: &str) -> DbNaiveAppointment {
        let day = NaiveDate::from_ymd_opt(2025, 11, 15).unwrap();
        DbNaiveAppointment {
            id: Uuid::new_v4(),
            user_id: "user-1".to_string(),
            chat_session_id: None,
            start_time: day.and_hms_opt(10, 0, 0).unwrap(),
            end_time: day.and_hms_opt(10, 30, 0).unwrap(),
            status: status.to_string(),
            notes: Some("Created via chatbot".to_string()),
            provider_name: "Dr. Bob Dentist".to_string(),
            location: "Downtown Dental Clinic".to_string(),
        }
    }

    #[test]
    fn test_naive_row_is_read_as_clinic_wall_clock() {
        let appointment = naive_row("confirmed").into_appointment(&Dubai).unwrap();

        assert_eq!(appointment.start, Utc.with_ymd_and_hms(2025, 11, 15, 6, 0, 0).unwrap());
        assert_eq!(appointment.end, Utc.with_ymd_and_hms(2025, 11, 15, 6, 30, 0).unwrap());
        assert_eq!(appointment.status, AppointmentStatus::Confirmed);
    }

    #[test]
    fn test_unknown_status_is_an_error() {
        assert!(naive_row("archived").into_appointment(&Dubai).is_err());
    }

    #[test]
    fn test_aware_row_keeps_instants() {
        let row = DbAppointment {
            id: Uuid::new_v4(),
            user_id: "user-2".to_string(),
            chat_session_id: None,
            start_time: Utc.with_ymd_and_hms(2025, 11, 15, 6, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2025, 11, 15, 6, 30, 0).unwrap(),
            status: "pending".to_string(),
            notes: None,
            provider_name: "Dr. Bob Dentist".to_string(),
            location: "Downtown Dental Clinic".to_string(),
        };
        let start = row.start_time;

        let appointment = row.into_appointment().unwrap();
        assert_eq!(appointment.start, start);
        assert_eq!(appointment.status, AppointmentStatus::Pending);
    }

    #[test]
    fn test_timestamp_kind_from_information_schema() {
        assert_eq!(TimestampKind::from_data_type("timestamp without time zone"), TimestampKind::Naive);
        assert_eq!(TimestampKind::from_data_type("timestamp with time zone"), TimestampKind::Aware);
    }
}
