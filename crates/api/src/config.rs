//! # API Configuration Module
//!
//! This module loads configuration for the clinicbook API server. Values are
//! read once from environment variables at startup, with defaults where
//! appropriate; `.env` files are honored by the binaries through `dotenv`.
//!
//! ## Environment Variables
//!
//! - `API_HOST`: The host address to bind the server to (default: "0.0.0.0")
//! - `API_PORT`: The port to listen on (default: 3000)
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `LOG_LEVEL`: Logging level (default: "info")
//! - `API_CORS_ORIGINS`: Comma-separated list of allowed CORS origins
//! - `API_REQUEST_TIMEOUT_SECONDS`: Per-request timeout (default: 30)
//! - `TZ_NAME`: IANA timezone of the clinic (default: "Asia/Dubai")
//! - `DEFAULT_PROVIDER`: Provider booked by the chat contracts (default: "Dr. Bob Dentist")
//! - `DEFAULT_LOCATION`: Clinic location (default: "Downtown Dental Clinic")
//! - `DEFAULT_APPT_MINUTES`: Default appointment length (default: 30)
//! - `BUSINESS_START` / `BUSINESS_END`: Opening hours as HH:MM (default: 09:00 / 17:00)
//! - `SLOT_LIMIT`: Maximum slots returned per listing (default: 10)

use chrono_tz::Tz;
use clinicbook_core::engine::DEFAULT_SLOT_LIMIT;
use clinicbook_core::models::clinic::{parse_wall_clock, ClinicCalendar};
use eyre::{Result, WrapErr};
use std::env;
use tracing::{warn, Level};

pub const DEFAULT_TIMEZONE: &str = "Asia/Dubai";
pub const DEFAULT_PROVIDER: &str = "Dr. Bob Dentist";
pub const DEFAULT_LOCATION: &str = "Downtown Dental Clinic";

/// Configuration for the clinicbook API server
///
/// # Example
///
/// ```no_run
/// use eyre::Result;
/// use clinicbook_api::config::ApiConfig;
///
/// fn example() -> Result<()> {
///     let config = ApiConfig::from_env()?;
///     println!("Starting server on {}:{}", config.host, config.port);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host address for the API server (e.g., "127.0.0.1", "0.0.0.0")
    pub host: String,

    /// Port for the API server to listen on
    pub port: u16,

    /// PostgreSQL database connection string
    pub database_url: String,

    /// Log level for the application
    pub log_level: Level,

    /// CORS allowed origins (optional)
    pub cors_origins: Option<Vec<String>>,

    /// Request timeout in seconds
    pub request_timeout: u64,

    /// Provider, location, opening hours and timezone of the clinic
    pub clinic: ClinicCalendar,

    /// Maximum number of slots returned by a listing
    pub slot_limit: usize,
}

impl ApiConfig {
    /// Creates a new ApiConfig from environment variables
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The DATABASE_URL environment variable is not set
    /// - The API_PORT value cannot be parsed as a u16
    /// - BUSINESS_START / BUSINESS_END are not HH:MM or do not form a range
    /// - DEFAULT_APPT_MINUTES or SLOT_LIMIT is not a number
    pub fn from_env() -> Result<Self> {
        // Network settings
        let host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("API_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .wrap_err("Invalid API_PORT value")?;

        // Database settings
        let database_url = env::var("DATABASE_URL")
            .wrap_err("DATABASE_URL environment variable must be set")?;

        let log_level = parse_log_level(&env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()));

        // CORS settings
        let cors_origins = env::var("API_CORS_ORIGINS").ok().map(|origins| {
            origins.split(',').map(|s| s.trim().to_string()).collect()
        });

        let request_timeout = env::var("API_REQUEST_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .unwrap_or(30);

        // Clinic settings
        let timezone = parse_timezone(env::var("TZ_NAME").ok().as_deref());
        let provider = env::var("DEFAULT_PROVIDER").unwrap_or_else(|_| DEFAULT_PROVIDER.to_string());
        let location = env::var("DEFAULT_LOCATION").unwrap_or_else(|_| DEFAULT_LOCATION.to_string());
        let default_minutes: i64 = env::var("DEFAULT_APPT_MINUTES")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .wrap_err("Invalid DEFAULT_APPT_MINUTES value")?;
        let business_start = parse_wall_clock(&env::var("BUSINESS_START").unwrap_or_else(|_| "09:00".to_string()))
            .wrap_err("Invalid BUSINESS_START value")?;
        let business_end = parse_wall_clock(&env::var("BUSINESS_END").unwrap_or_else(|_| "17:00".to_string()))
            .wrap_err("Invalid BUSINESS_END value")?;
        let slot_limit = env::var("SLOT_LIMIT")
            .ok()
            .map(|raw| raw.parse::<usize>())
            .transpose()
            .wrap_err("Invalid SLOT_LIMIT value")?
            .unwrap_or(DEFAULT_SLOT_LIMIT);

        let clinic = ClinicCalendar::new(
            provider,
            location,
            business_start,
            business_end,
            default_minutes,
            timezone,
        )?;

        Ok(Self {
            host,
            port,
            database_url,
            log_level,
            cors_origins,
            request_timeout,
            clinic,
            slot_limit,
        })
    }

    /// Returns the server address as a string (e.g., "127.0.0.1:8080")
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Resolves `TZ_NAME`. Unknown names fall back to UTC with a warning.
pub fn parse_timezone(name: Option<&str>) -> Tz {
    let name = name.map(str::trim).filter(|n| !n.is_empty()).unwrap_or(DEFAULT_TIMEZONE);
    match name.parse::<Tz>() {
        Ok(tz) => tz,
        Err(e) => {
            warn!("Unknown TZ_NAME '{}' ({}), falling back to UTC", name, e);
            Tz::UTC
        }
    }
}

pub fn parse_log_level(raw: &str) -> Level {
    match raw.trim().to_ascii_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}
