use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::{info, warn};

use crate::models::TimestampKind;
use crate::repositories::appointment::timestamp_kind;

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // Needed for the provider/time-range exclusion constraint.
    let gist_available = match sqlx::query("CREATE EXTENSION IF NOT EXISTS btree_gist")
        .execute(pool)
        .await
    {
        Ok(_) => true,
        Err(e) => {
            warn!("btree_gist unavailable, overlap constraint skipped: {}", e);
            false
        }
    };

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS appointments (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            user_id VARCHAR(255) NOT NULL,
            chat_session_id UUID NULL,
            start_time TIMESTAMP WITH TIME ZONE NOT NULL,
            end_time TIMESTAMP WITH TIME ZONE NOT NULL,
            status VARCHAR(16) NOT NULL DEFAULT 'pending',
            notes TEXT NULL,
            provider_name VARCHAR(255) NOT NULL,
            location VARCHAR(255) NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_time_range CHECK (end_time > start_time),
            CONSTRAINT valid_status CHECK (status IN ('pending', 'confirmed', 'cancelled'))
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_appointments_provider_start ON appointments(provider_name, start_time)",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_appointments_status ON appointments(status)")
        .execute(pool)
        .await?;

    let kind = timestamp_kind(pool).await?;
    if kind == TimestampKind::Naive {
        warn!("appointments uses timestamps without time zone; values are read as clinic-local time");
    } else if gist_available {
        sqlx::query(
            r#"
            DO $$
            BEGIN
                IF NOT EXISTS (
                    SELECT 1 FROM pg_constraint WHERE conname = 'no_overlapping_active_appointments'
                ) THEN
                    ALTER TABLE appointments ADD CONSTRAINT no_overlapping_active_appointments
                        EXCLUDE USING gist (
                            provider_name WITH =,
                            tstzrange(start_time, end_time, '[)') WITH &&
                        )
                        WHERE (status IN ('pending', 'confirmed'));
                END IF;
            END
            $$;
            "#,
        )
        .execute(pool)
        .await?;
    }

    info!("Database schema initialized successfully.");
    Ok(())
}
