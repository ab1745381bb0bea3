//! Activity data model: request/response wire types and response validation.

mod sample;
mod types;
mod validate;

pub use sample::sample_response;
pub use types::*;
pub use validate::{validate_response, FieldViolation};
