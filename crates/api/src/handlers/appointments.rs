use axum::{extract::State, http::StatusCode, Json};
use clinicbook_core::models::appointment::{BookAppointmentRequest, BookingConfirmation};
use std::sync::Arc;

use crate::{middleware::error_handling::AppError, ApiState};

/// Books the clinic provider for the requested start.
///
/// ```text
/// POST /api/appointments
/// { "user_id": "u-1", "start": "tomorrow 09:30", "duration_minutes": 30 }
/// ```
#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<BookAppointmentRequest>,
) -> Result<(StatusCode, Json<BookingConfirmation>), AppError> {
    let confirmation = state
        .engine
        .book_appointment(&payload.user_id, &payload.start, payload.duration_minutes)
        .await?;

    Ok((StatusCode::CREATED, Json(confirmation)))
}
