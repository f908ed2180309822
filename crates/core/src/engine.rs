//! # Slot & Booking Engine
//!
//! Lists free slots inside business hours and books appointments without
//! double-booking a provider.
//!
//! Listing is a plain read: the day's grid minus every slot that overlaps a
//! pending or confirmed appointment. Booking re-reads the provider's day
//! inside a [`BookingScope`](crate::store::BookingScope) and only inserts
//! when nothing overlaps, so two callers that saw the same free slot cannot
//! both get it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::{info, warn};

use crate::clock::Clock;
use crate::errors::{ScheduleError, ScheduleResult};
use crate::models::appointment::{Appointment, BookingConfirmation, NewAppointment, DEFAULT_NOTES};
use crate::models::clinic::ClinicCalendar;
use crate::models::time_slot::{NormalizedDateTime, SlotListing, TimeSlotResponse};
use crate::slots::{validate_duration, AvailableSlots, BusyInterval, SlotGrid};
use crate::store::{AppointmentStore, DayWindow};
use crate::temporal::TemporalNormalizer;

/// Slots returned by [`SchedulingEngine::list_slots`] unless configured.
pub const DEFAULT_SLOT_LIMIT: usize = 10;

#[derive(Clone)]
pub struct SchedulingEngine {
    clinic: Arc<ClinicCalendar>,
    normalizer: TemporalNormalizer,
    store: Arc<dyn AppointmentStore>,
    slot_limit: usize,
}

impl SchedulingEngine {
    pub fn new(clinic: Arc<ClinicCalendar>, store: Arc<dyn AppointmentStore>, clock: Arc<dyn Clock>) -> Self {
        let normalizer = TemporalNormalizer::new(clinic.timezone, clock);
        Self {
            clinic,
            normalizer,
            store,
            slot_limit: DEFAULT_SLOT_LIMIT,
        }
    }

    pub fn with_slot_limit(mut self, slot_limit: usize) -> Self {
        self.slot_limit = slot_limit;
        self
    }

    pub fn clinic(&self) -> &ClinicCalendar {
        &self.clinic
    }

    pub fn normalizer(&self) -> &TemporalNormalizer {
        &self.normalizer
    }

    pub fn store(&self) -> &Arc<dyn AppointmentStore> {
        &self.store
    }

    /// Free slots of `provider` on the clinic-local day containing `date`.
    ///
    /// # Errors
    ///
    /// * `ScheduleError::InvalidDuration` - `duration_minutes` is not positive or exceeds a day
    /// * `ScheduleError::Storage` - existing appointments could not be read
    pub async fn list_available_slots(
        &self,
        date: &DateTime<Tz>,
        provider: &str,
        duration_minutes: i64,
        limit: usize,
    ) -> ScheduleResult<AvailableSlots> {
        let step = validate_duration(duration_minutes)?;
        let tz = self.clinic.timezone;
        let day = date.with_timezone(&tz).date_naive();

        let (open, close) = self.clinic.business_bounds(day)?;
        let window = DayWindow::for_date(&tz, day)?;

        let busy: Vec<BusyInterval> = self
            .store
            .active_appointments(provider, &window)
            .await?
            .iter()
            .filter(|appointment| appointment.status.is_active())
            .map(BusyInterval::from)
            .collect();

        let slots = AvailableSlots::new(SlotGrid::new(open, close, step), busy, limit);
        info!(
            %provider,
            date = %day,
            duration_minutes,
            busy = slots.busy().len(),
            "listed available slots"
        );
        Ok(slots)
    }

    /// Books a pending appointment `[start, start + duration)`.
    ///
    /// # Errors
    ///
    /// * `ScheduleError::Validation` - empty user id or a start in the past
    /// * `ScheduleError::InvalidDuration` - bad duration
    /// * `ScheduleError::Conflict` - the provider already has an overlapping appointment
    /// * `ScheduleError::Storage` - the read or the insert failed; nothing was written
    pub async fn create_appointment(
        &self,
        user_id: &str,
        start: &DateTime<Tz>,
        duration_minutes: i64,
        provider: &str,
        location: &str,
    ) -> ScheduleResult<Appointment> {
        if user_id.trim().is_empty() {
            return Err(ScheduleError::Validation("user id is required".to_string()));
        }
        let length = validate_duration(duration_minutes)?;

        let tz = self.clinic.timezone;
        let start = start.with_timezone(&tz);
        if start < self.normalizer.now() {
            return Err(ScheduleError::Validation(format!(
                "cannot book in the past ({})",
                start.to_rfc3339()
            )));
        }
        let end = start + length;
        let (start_utc, end_utc) = (start.with_timezone(&Utc), end.with_timezone(&Utc));

        let window = DayWindow::for_date(&tz, start.date_naive())?.extend_to(end);
        let mut scope = self.store.begin_booking(provider, &window).await?;

        let existing = scope.active_appointments().await?;
        if let Some(taken) = existing.iter().find(|a| a.blocks(provider, start_utc, end_utc)) {
            warn!(
                %provider,
                requested = %start.to_rfc3339(),
                existing_id = %taken.id,
                "booking rejected, slot already taken"
            );
            return Err(ScheduleError::Conflict {
                provider: provider.to_string(),
                start: start_utc,
                end: end_utc,
            });
        }

        let appointment = scope
            .insert(NewAppointment {
                user_id: user_id.to_string(),
                start: start_utc,
                end: end_utc,
                provider: provider.to_string(),
                location: location.to_string(),
                notes: Some(DEFAULT_NOTES.to_string()),
            })
            .await?;

        info!(
            id = %appointment.id,
            %user_id,
            start = %start.to_rfc3339(),
            end = %end.to_rfc3339(),
            "created appointment"
        );
        Ok(appointment)
    }

    /// `list_slots(dateText)` contract: parse the day, list the clinic
    /// provider's free default-length slots.
    pub async fn list_slots(&self, date_text: &str) -> ScheduleResult<SlotListing> {
        let date = self.normalizer.parse_date(date_text)?;
        let slots = self
            .list_available_slots(
                &date,
                &self.clinic.provider,
                self.clinic.default_duration_minutes,
                self.slot_limit,
            )
            .await?;

        Ok(SlotListing {
            slots: slots.iter().map(|slot| TimeSlotResponse::from(&slot)).collect(),
            date: date.date_naive(),
        })
    }

    /// `book_appointment(userId, startText, durationMinutes?)` contract.
    pub async fn book_appointment(
        &self,
        user_id: &str,
        start_text: &str,
        duration_minutes: Option<i64>,
    ) -> ScheduleResult<BookingConfirmation> {
        if start_text.trim().is_empty() {
            return Err(ScheduleError::Validation(
                "missing start time (e.g. 'tomorrow 09:30')".to_string(),
            ));
        }
        let start = self.normalizer.parse_datetime(start_text)?;
        let duration = duration_minutes.unwrap_or(self.clinic.default_duration_minutes);

        let appointment = self
            .create_appointment(user_id, &start, duration, &self.clinic.provider, &self.clinic.location)
            .await?;

        let tz = self.clinic.timezone;
        Ok(BookingConfirmation {
            appointment_id: appointment.id,
            start: appointment.start.with_timezone(&tz).fixed_offset(),
            end: appointment.end.with_timezone(&tz).fixed_offset(),
            provider: appointment.provider,
            location: appointment.location,
            status: appointment.status,
        })
    }

    pub fn normalize(&self, text: &str) -> ScheduleResult<NormalizedDateTime> {
        let normalized = self.normalizer.parse_datetime(text)?;
        Ok(NormalizedDateTime {
            input: text.to_string(),
            normalized: normalized.fixed_offset(),
        })
    }
}
