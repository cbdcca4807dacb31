//! External service clients

pub mod gateway;
pub mod shipment;

pub use gateway::{MockPaymentGatewayClient, PaymentGatewayClient};
pub use shipment::{MockShipmentClient, ShipmentClient, ShipmentStatus};
