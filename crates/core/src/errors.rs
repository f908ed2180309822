use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Could not understand date '{input}': {}", reasons.join("; "))]
    DateParse { input: String, reasons: Vec<String> },

    #[error("Invalid appointment duration: {0} minutes")]
    InvalidDuration(i64),

    #[error("Slot {start} - {end} is already booked for {provider}")]
    Conflict {
        provider: String,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(#[from] eyre::Report),
}

impl ScheduleError {
    pub fn date_parse(input: &str, reasons: Vec<String>) -> Self {
        ScheduleError::DateParse {
            input: input.to_string(),
            reasons,
        }
    }
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
