//! JSON API over the lookup and wishlist services.

pub mod dto;
pub mod error;
pub mod routes;

pub use error::{ApiResult, ErrorResponse};
pub use routes::create_router;
