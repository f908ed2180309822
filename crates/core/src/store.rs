//! Storage seam for the engine.
//!
//! The engine reads appointments through [`AppointmentStore`] and books them
//! through a [`BookingScope`]. A scope serializes bookings for one provider
//! on every clinic day the booking touches: while it is open no other scope
//! sharing one of those days can read or insert, so the overlap check and
//! the insert act as one unit.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime};
use chrono_tz::Tz;

use crate::errors::{ScheduleError, ScheduleResult};
use crate::models::appointment::{Appointment, NewAppointment};
use crate::temporal::localize;

/// One clinic-local calendar day, `[midnight, next midnight)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub date: NaiveDate,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl DayWindow {
    pub fn for_date(tz: &Tz, date: NaiveDate) -> ScheduleResult<Self> {
        let start = localize(tz, date.and_time(NaiveTime::MIN));
        let end = date
            .succ_opt()
            .and_then(|next| localize(tz, next.and_time(NaiveTime::MIN)));

        match (start, end) {
            (Some(start), Some(end)) => Ok(Self { date, start, end }),
            _ => Err(ScheduleError::Validation(format!("{} has no bounds in {}", date, tz))),
        }
    }

    /// Stretches the window so an appointment running past midnight is
    /// still covered.
    pub fn extend_to(mut self, end: DateTime<Tz>) -> Self {
        if end > self.end {
            self.end = end;
        }
        self
    }

    pub fn timezone(&self) -> Tz {
        self.start.timezone()
    }

    /// Clinic days covered by the window, ascending. More than one once
    /// [`DayWindow::extend_to`] pushed the end past midnight.
    pub fn days(&self) -> Vec<NaiveDate> {
        let last = (self.end - Duration::nanoseconds(1)).date_naive().max(self.date);
        self.date.iter_days().take_while(|day| *day <= last).collect()
    }

    /// Keys used to serialize bookings, one per covered day, e.g.
    /// `Dr. Bob|2025-11-15`. Taking them in this order keeps two scopes
    /// from waiting on each other.
    pub fn lock_keys(&self, provider: &str) -> Vec<String> {
        self.days()
            .into_iter()
            .map(|day| format!("{}|{}", provider, day))
            .collect()
    }
}

#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// Pending and confirmed appointments of `provider` that intersect `window`.
    async fn active_appointments(&self, provider: &str, window: &DayWindow) -> ScheduleResult<Vec<Appointment>>;

    /// Opens a serialized booking unit for `provider` on `window`'s day.
    async fn begin_booking(&self, provider: &str, window: &DayWindow) -> ScheduleResult<Box<dyn BookingScope>>;

    /// Cheap connectivity probe.
    async fn ping(&self) -> ScheduleResult<()>;
}

/// Exclusive read-then-insert unit. Dropping it without calling
/// [`BookingScope::insert`] discards it with no write.
#[async_trait]
pub trait BookingScope: Send {
    async fn active_appointments(&mut self) -> ScheduleResult<Vec<Appointment>>;

    async fn insert(self: Box<Self>, appointment: NewAppointment) -> ScheduleResult<Appointment>;
}
