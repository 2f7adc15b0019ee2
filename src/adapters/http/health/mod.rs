//! Health endpoint.
//!
//! Reports process liveness and how many clients the hub currently holds.

mod dto;
mod handlers;
mod routes;

pub use dto::HealthResponse;
pub use handlers::health;
pub use routes::health_router;
