pub mod appointments;
pub mod health;
pub mod normalize;
pub mod slots;
