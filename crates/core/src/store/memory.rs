use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use super::{AppointmentStore, BookingScope, DayWindow};
use crate::errors::ScheduleResult;
use crate::models::appointment::{Appointment, AppointmentStatus, NewAppointment};

/// Process-local store. Bookings hold the single table lock for the whole
/// scope.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    appointments: Arc<Mutex<Vec<Appointment>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `appointment` as is, bypassing the booking scope.
    pub async fn seed(&self, appointment: Appointment) {
        self.appointments.lock().await.push(appointment);
    }

    pub async fn all(&self) -> Vec<Appointment> {
        self.appointments.lock().await.clone()
    }
}

fn active_in(rows: &[Appointment], provider: &str, window: &DayWindow) -> Vec<Appointment> {
    let start = window.start.with_timezone(&Utc);
    let end = window.end.with_timezone(&Utc);
    let mut found: Vec<Appointment> = rows
        .iter()
        .filter(|a| a.blocks(provider, start, end))
        .cloned()
        .collect();
    found.sort_by_key(|a| a.start);
    found
}

#[async_trait]
impl AppointmentStore for MemoryStore {
    async fn active_appointments(&self, provider: &str, window: &DayWindow) -> ScheduleResult<Vec<Appointment>> {
        let rows = self.appointments.lock().await;
        Ok(active_in(&rows, provider, window))
    }

    async fn begin_booking(&self, provider: &str, window: &DayWindow) -> ScheduleResult<Box<dyn BookingScope>> {
        let guard = self.appointments.clone().lock_owned().await;
        Ok(Box::new(MemoryBooking {
            guard,
            provider: provider.to_string(),
            window: *window,
        }))
    }

    async fn ping(&self) -> ScheduleResult<()> {
        Ok(())
    }
}

struct MemoryBooking {
    guard: OwnedMutexGuard<Vec<Appointment>>,
    provider: String,
    window: DayWindow,
}

#[async_trait]
impl BookingScope for MemoryBooking {
    async fn active_appointments(&mut self) -> ScheduleResult<Vec<Appointment>> {
        Ok(active_in(&self.guard, &self.provider, &self.window))
    }

    async fn insert(mut self: Box<Self>, appointment: NewAppointment) -> ScheduleResult<Appointment> {
        let stored = Appointment {
            id: Uuid::new_v4(),
            user_id: appointment.user_id,
            chat_session_id: None,
            start: appointment.start,
            end: appointment.end,
            status: AppointmentStatus::Pending,
            provider: appointment.provider,
            location: appointment.location,
            notes: appointment.notes,
        };
        self.guard.push(stored.clone());
        Ok(stored)
    }
}
