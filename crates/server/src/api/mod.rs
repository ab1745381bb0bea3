pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod suggest;

pub use error::{ApiError, ErrorResponse};
pub use routes::create_router;
