//! Common types used across WasteX
//!
//! This module provides the fundamental domain types used throughout
//! the deal lifecycle engine.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new random identifier
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Create an identifier from an existing UUID
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Get the underlying UUID
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

entity_id! {
    /// Unique identifier for platform users (buyers, sellers, admins)
    UserId
}

entity_id! {
    /// Unique identifier for waste listings
    ListingId
}

entity_id! {
    /// Unique identifier for material requests
    RequestId
}

entity_id! {
    /// Unique identifier for negotiations
    NegotiationId
}

entity_id! {
    /// Unique identifier for contracts
    ContractId
}

entity_id! {
    /// Unique identifier for escrow payments
    PaymentId
}

/// Role a party holds within a negotiation or contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartyRole {
    /// The party supplying the material
    Seller,
    /// The party paying for the material
    Buyer,
}

impl PartyRole {
    /// Returns the opposite role
    pub fn opposite(&self) -> Self {
        match self {
            PartyRole::Seller => PartyRole::Buyer,
            PartyRole::Buyer => PartyRole::Seller,
        }
    }

    /// Returns true if this is the seller role
    pub fn is_seller(&self) -> bool {
        matches!(self, PartyRole::Seller)
    }

    /// Returns true if this is the buyer role
    pub fn is_buyer(&self) -> bool {
        matches!(self, PartyRole::Buyer)
    }
}

impl std::fmt::Display for PartyRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PartyRole::Seller => write!(f, "seller"),
            PartyRole::Buyer => write!(f, "buyer"),
        }
    }
}

/// The acting user of an operation
///
/// Authentication itself is an external concern; by the time a request
/// reaches the engine it carries a resolved `Actor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// The user performing the operation
    pub user_id: UserId,
    /// Whether the user holds platform-admin privileges
    #[serde(default)]
    pub admin: bool,
}

impl Actor {
    /// Create a regular (non-admin) actor
    pub fn user(user_id: UserId) -> Self {
        Self {
            user_id,
            admin: false,
        }
    }

    /// Create an admin actor
    pub fn admin(user_id: UserId) -> Self {
        Self {
            user_id,
            admin: true,
        }
    }
}
