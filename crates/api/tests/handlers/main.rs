#[path = "../test_utils.rs"]
mod test_utils;

mod appointments_test;
mod health_test;
mod middleware_test;
mod normalize_test;
mod slots_test;
