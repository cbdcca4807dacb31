//! HTTP API for the contract lifecycle

pub mod handlers;
pub mod models;
pub mod routes;

pub use handlers::ContractApiState;
pub use routes::create_router;
