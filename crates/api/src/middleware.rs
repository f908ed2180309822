/// Maps scheduling errors to HTTP responses
pub mod error_handling;
