/// Appointment booking
pub mod appointments;
/// Health and version probes
pub mod health;
/// Free-text date normalization
pub mod normalize;
/// Slot listing
pub mod slots;
