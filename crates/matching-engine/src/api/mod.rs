//! HTTP API for the matching engine

pub mod handlers;
pub mod models;
pub mod routes;

pub use handlers::MatchingApiState;
pub use routes::create_router;
