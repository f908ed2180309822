//! # Error Handling Middleware
//!
//! Maps [`ScheduleError`] to HTTP status codes and a JSON body of the form
//! `{ "error": message }`, so every endpoint reports failures the same way.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use clinicbook_core::errors::ScheduleError;
use serde_json::json;
use tracing::error;

/// Application error wrapper that provides HTTP status code mapping
///
/// # Example
///
/// ```
/// use axum::Json;
/// use clinicbook_api::middleware::error_handling::AppError;
/// use clinicbook_core::errors::ScheduleError;
///
/// async fn handler(user_id: String) -> Result<Json<String>, AppError> {
///     if user_id.is_empty() {
///         return Err(AppError(ScheduleError::Validation("user id is required".to_string())));
///     }
///     Ok(Json(user_id))
/// }
/// # fn main() {}
/// ```
#[derive(Debug)]
pub struct AppError(pub ScheduleError);

impl AppError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ScheduleError::DateParse { .. } => StatusCode::BAD_REQUEST,
            ScheduleError::InvalidDuration(_) => StatusCode::BAD_REQUEST,
            ScheduleError::Validation(_) => StatusCode::BAD_REQUEST,
            ScheduleError::Conflict { .. } => StatusCode::CONFLICT,
            ScheduleError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ScheduleError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {:?}", self.0);
        }

        let message = self.0.to_string();
        let body = Json(json!({ "error": message }));

        (status, body).into_response()
    }
}

/// Lets handlers use `?` on `ScheduleResult<T>`.
impl From<ScheduleError> for AppError {
    fn from(err: ScheduleError) -> Self {
        AppError(err)
    }
}

/// Any bare `eyre::Report` reaching a handler is a storage failure.
impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(ScheduleError::Storage(err))
    }
}
