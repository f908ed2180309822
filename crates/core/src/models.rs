pub mod appointment;
pub mod clinic;
pub mod time_slot;
