use chrono::Utc;
use chrono_tz::Tz;
use clinicbook_core::models::appointment::{Appointment, NewAppointment};
use clinicbook_core::store::DayWindow;
use eyre::Result;
use sqlx::{PgConnection, PgExecutor};

use crate::models::{DbAppointment, DbNaiveAppointment, TimestampKind};

const COLUMNS: &str =
    "id, user_id, chat_session_id, start_time, end_time, status, notes, provider_name, location";

/// Reports whether `appointments` stores zoned or naive timestamps.
pub async fn timestamp_kind<'e, E: PgExecutor<'e>>(executor: E) -> Result<TimestampKind> {
    let data_type = sqlx::query_scalar::<_, String>(
        r#"
        SELECT data_type::text
        FROM information_schema.columns
        WHERE table_name = 'appointments' AND column_name = 'start_time'
        "#,
    )
    .fetch_optional(executor)
    .await?;

    Ok(data_type
        .as_deref()
        .map(TimestampKind::from_data_type)
        .unwrap_or(TimestampKind::Aware))
}

/// Pending and confirmed appointments of `provider` intersecting `window`,
/// ordered by start.
pub async fn get_active_appointments(
    conn: &mut PgConnection,
    provider: &str,
    window: &DayWindow,
    kind: TimestampKind,
) -> Result<Vec<Appointment>> {
    tracing::debug!(
        "Getting active appointments: provider={}, from={}, to={}",
        provider, window.start, window.end
    );

    let sql = format!(
        r#"
        SELECT {COLUMNS}
        FROM appointments
        WHERE provider_name = $1
          AND status IN ('pending', 'confirmed')
          AND start_time < $3
          AND end_time > $2
        ORDER BY start_time ASC
        "#
    );

    match kind {
        TimestampKind::Aware => {
            let rows = sqlx::query_as::<_, DbAppointment>(&sql)
                .bind(provider)
                .bind(window.start.with_timezone(&Utc))
                .bind(window.end.with_timezone(&Utc))
                .fetch_all(&mut *conn)
                .await?;
            rows.into_iter().map(DbAppointment::into_appointment).collect()
        }
        TimestampKind::Naive => {
            let tz = window.timezone();
            let rows = sqlx::query_as::<_, DbNaiveAppointment>(&sql)
                .bind(provider)
                .bind(window.start.naive_local())
                .bind(window.end.naive_local())
                .fetch_all(&mut *conn)
                .await?;
            rows.into_iter().map(|row| row.into_appointment(&tz)).collect()
        }
    }
}

/// Serializes bookings sharing `key` until the surrounding transaction ends.
pub async fn lock_booking_key(conn: &mut PgConnection, key: &str) -> Result<()> {
    tracing::debug!("Taking booking lock: {}", key);

    sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
        .bind(key)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

pub async fn insert_appointment(
    conn: &mut PgConnection,
    appointment: &NewAppointment,
    tz: &Tz,
    kind: TimestampKind,
) -> Result<Appointment> {
    let sql = format!(
        r#"
        INSERT INTO appointments (user_id, start_time, end_time, status, notes, provider_name, location)
        VALUES ($1, $2, $3, 'pending', $4, $5, $6)
        RETURNING {COLUMNS}
        "#
    );

    let stored = match kind {
        TimestampKind::Aware => sqlx::query_as::<_, DbAppointment>(&sql)
            .bind(&appointment.user_id)
            .bind(appointment.start)
            .bind(appointment.end)
            .bind(&appointment.notes)
            .bind(&appointment.provider)
            .bind(&appointment.location)
            .fetch_one(&mut *conn)
            .await?
            .into_appointment()?,
        TimestampKind::Naive => {
            tracing::debug!("Legacy schema without time zone - storing clinic wall-clock values");
            sqlx::query_as::<_, DbNaiveAppointment>(&sql)
                .bind(&appointment.user_id)
                .bind(appointment.start.with_timezone(tz).naive_local())
                .bind(appointment.end.with_timezone(tz).naive_local())
                .bind(&appointment.notes)
                .bind(&appointment.provider)
                .bind(&appointment.location)
                .fetch_one(&mut *conn)
                .await?
                .into_appointment(tz)?
        }
    };

    tracing::debug!("Appointment created successfully: id={}", stored.id);
    Ok(stored)
}
