//! HTTP API for the negotiation channel

pub mod handlers;
pub mod models;
pub mod routes;

pub use handlers::NegotiationApiState;
pub use routes::create_router;
