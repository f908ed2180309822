//! Postgres-backed [`AppointmentStore`].
//!
//! Every booking runs in its own transaction holding transaction-scoped
//! advisory locks keyed on provider and each clinic day it touches, taken
//! in date order. On zone-aware tables the exclusion constraint backs that
//! up for writers that bypass the locks.

use std::sync::Arc;

use async_trait::async_trait;
use clinicbook_core::errors::{ScheduleError, ScheduleResult};
use clinicbook_core::models::appointment::{Appointment, NewAppointment};
use clinicbook_core::store::{AppointmentStore, BookingScope, DayWindow};
use sqlx::{Postgres, Transaction};
use tokio::sync::OnceCell;

use crate::models::TimestampKind;
use crate::repositories::appointment::{
    get_active_appointments, insert_appointment, lock_booking_key, timestamp_kind,
};
use crate::DbPool;

/// SQLSTATE `exclusion_violation`.
const EXCLUSION_VIOLATION: &str = "23P01";

#[derive(Debug, Clone)]
pub struct PgAppointmentStore {
    pool: DbPool,
    kind: Arc<OnceCell<TimestampKind>>,
}

impl PgAppointmentStore {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            kind: Arc::new(OnceCell::new()),
        }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    async fn timestamp_kind(&self) -> ScheduleResult<TimestampKind> {
        let kind = self
            .kind
            .get_or_try_init(|| async { timestamp_kind(&self.pool).await })
            .await?;
        Ok(*kind)
    }
}

fn storage(err: sqlx::Error) -> ScheduleError {
    ScheduleError::Storage(err.into())
}

#[async_trait]
impl AppointmentStore for PgAppointmentStore {
    async fn active_appointments(&self, provider: &str, window: &DayWindow) -> ScheduleResult<Vec<Appointment>> {
        let kind = self.timestamp_kind().await?;
        let mut conn = self.pool.acquire().await.map_err(storage)?;
        let appointments = get_active_appointments(&mut conn, provider, window, kind).await?;
        Ok(appointments)
    }

    async fn begin_booking(&self, provider: &str, window: &DayWindow) -> ScheduleResult<Box<dyn BookingScope>> {
        let kind = self.timestamp_kind().await?;
        let mut tx = self.pool.begin().await.map_err(storage)?;
        for key in window.lock_keys(provider) {
            lock_booking_key(&mut tx, &key).await?;
        }

        Ok(Box::new(PgBooking {
            tx,
            provider: provider.to_string(),
            window: *window,
            kind,
        }))
    }

    async fn ping(&self) -> ScheduleResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(storage)?;
        Ok(())
    }
}

/// Open booking transaction. Dropping it rolls back.
pub struct PgBooking {
    tx: Transaction<'static, Postgres>,
    provider: String,
    window: DayWindow,
    kind: TimestampKind,
}

#[async_trait]
impl BookingScope for PgBooking {
    async fn active_appointments(&mut self) -> ScheduleResult<Vec<Appointment>> {
        let appointments = get_active_appointments(&mut self.tx, &self.provider, &self.window, self.kind).await?;
        Ok(appointments)
    }

    async fn insert(self: Box<Self>, appointment: NewAppointment) -> ScheduleResult<Appointment> {
        let PgBooking { mut tx, window, kind, .. } = *self;
        let tz = window.timezone();

        let stored = insert_appointment(&mut tx, &appointment, &tz, kind)
            .await
            .map_err(|report| {
                let excluded = report
                    .downcast_ref::<sqlx::Error>()
                    .and_then(|e| e.as_database_error())
                    .and_then(|e| e.code())
                    .is_some_and(|code| code == EXCLUSION_VIOLATION);
                if excluded {
                    ScheduleError::Conflict {
                        provider: appointment.provider.clone(),
                        start: appointment.start,
                        end: appointment.end,
                    }
                } else {
                    ScheduleError::Storage(report)
                }
            })?;

        tx.commit().await.map_err(storage)?;
        Ok(stored)
    }
}
