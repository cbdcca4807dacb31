//! HTTP API for escrow payments

pub mod handlers;
pub mod models;
pub mod routes;

pub use handlers::EscrowApiState;
pub use routes::create_router;
