//! # Clinicbook Core
//!
//! Scheduling engine for a single-provider dental clinic.
//!
//! - [`temporal`] turns free-form date text into clinic-timezone instants
//! - [`slots`] builds the business-hours slot grid and filters it
//! - [`engine`] lists free slots and books appointments against an
//!   [`store::AppointmentStore`]

pub mod clock;
pub mod engine;
pub mod errors;
pub mod models;
pub mod slots;
pub mod store;
pub mod temporal;

pub use engine::SchedulingEngine;
pub use errors::{ScheduleError, ScheduleResult};
