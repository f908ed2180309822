use chrono::{DateTime, NaiveDate, NaiveTime};
use chrono_tz::Tz;

use crate::errors::{ScheduleError, ScheduleResult};
use crate::temporal::localize;

/// Static description of the clinic's calendar.
///
/// Built once at startup and shared read-only by the normalizer and the
/// engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClinicCalendar {
    pub provider: String,
    pub location: String,
    pub business_start: NaiveTime,
    pub business_end: NaiveTime,
    pub default_duration_minutes: i64,
    pub timezone: Tz,
}

impl ClinicCalendar {
    pub fn new(
        provider: impl Into<String>,
        location: impl Into<String>,
        business_start: NaiveTime,
        business_end: NaiveTime,
        default_duration_minutes: i64,
        timezone: Tz,
    ) -> ScheduleResult<Self> {
        if business_start >= business_end {
            return Err(ScheduleError::Config(format!(
                "business hours start {} must be before end {}",
                business_start.format("%H:%M"),
                business_end.format("%H:%M")
            )));
        }
        if default_duration_minutes <= 0 {
            return Err(ScheduleError::InvalidDuration(default_duration_minutes));
        }

        Ok(Self {
            provider: provider.into(),
            location: location.into(),
            business_start,
            business_end,
            default_duration_minutes,
            timezone,
        })
    }

    /// Business-hour bounds for `date`, as clinic-timezone instants.
    pub fn business_bounds(&self, date: NaiveDate) -> ScheduleResult<(DateTime<Tz>, DateTime<Tz>)> {
        let start = localize(&self.timezone, date.and_time(self.business_start));
        let end = localize(&self.timezone, date.and_time(self.business_end));

        match (start, end) {
            (Some(start), Some(end)) => Ok((start, end)),
            _ => Err(ScheduleError::Validation(format!(
                "business hours cannot be placed on {} in {}",
                date, self.timezone
            ))),
        }
    }
}

/// Parses a wall-clock `HH:MM` value as used by `BUSINESS_START`/`BUSINESS_END`.
pub fn parse_wall_clock(value: &str) -> ScheduleResult<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|e| ScheduleError::Config(format!("invalid HH:MM time '{}': {}", value, e)))
}
