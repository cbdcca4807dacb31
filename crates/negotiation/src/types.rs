//! Negotiation domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use common::{ListingId, NegotiationId, PartyRole, RequestId, UserId};

/// Negotiation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NegotiationStatus {
    /// Conversation is open
    Active,
    /// An offer is on the table awaiting a response
    Pending,
    /// Parties agreed; a contract can be created from this negotiation
    Completed,
    /// Abandoned by either party
    Cancelled,
}

impl NegotiationStatus {
    /// Whether the negotiation accepts further messages
    pub fn is_open(&self) -> bool {
        matches!(self, NegotiationStatus::Active | NegotiationStatus::Pending)
    }
}

impl std::fmt::Display for NegotiationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NegotiationStatus::Active => write!(f, "active"),
            NegotiationStatus::Pending => write!(f, "pending"),
            NegotiationStatus::Completed => write!(f, "completed"),
            NegotiationStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// The entity a negotiation was opened from
///
/// The origin fixes the participant roles: opening from a listing makes
/// the counterparty (the listing's owner) the seller; opening from a
/// request makes the counterparty the buyer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum NegotiationOrigin {
    Listing(ListingId),
    Request(RequestId),
}

/// Message type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MessageType {
    Text,
    File,
    Offer,
    PriceDiscussion,
    TermsDiscussion,
}

/// Structured payload of an offer message
///
/// Stored for reference only; contract terms are entered independently
/// and never derived from this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferPayload {
    /// Offered price for the full quantity
    pub price: f64,
    /// Offered quantity in kilograms
    pub quantity_kg: f64,
    /// Proposed delivery date
    #[serde(default)]
    pub delivery_date: Option<DateTime<Utc>>,
    /// Free-form notes
    #[serde(default)]
    pub notes: Option<String>,
}

/// A single message in the negotiation log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique message identifier
    pub message_id: Uuid,
    /// Participant who sent the message
    pub sender_id: UserId,
    /// Message body
    pub content: String,
    /// Message type
    pub message_type: MessageType,
    /// Structured offer, present only for offer messages
    #[serde(default)]
    pub offer: Option<OfferPayload>,
    /// When the message was sent
    pub sent_at: DateTime<Utc>,
}

impl Message {
    pub fn new(
        sender_id: UserId,
        content: impl Into<String>,
        message_type: MessageType,
        offer: Option<OfferPayload>,
    ) -> Self {
        Self {
            message_id: Uuid::new_v4(),
            sender_id,
            content: content.into(),
            message_type,
            offer,
            sent_at: Utc::now(),
        }
    }
}

/// A bilateral negotiation between a fixed seller and buyer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Negotiation {
    /// Unique negotiation identifier
    pub negotiation_id: NegotiationId,
    /// Display title
    pub title: String,
    /// The listing or request this negotiation started from
    pub origin: NegotiationOrigin,
    /// Fixed seller participant
    pub seller_id: UserId,
    /// Fixed buyer participant
    pub buyer_id: UserId,
    /// Current status
    pub status: NegotiationStatus,
    /// Append-only ordered message log
    pub messages: Vec<Message>,
    /// Latest offer payload, advisory only
    #[serde(default)]
    pub current_offer: Option<OfferPayload>,
    /// Per-participant last-read timestamps
    #[serde(default)]
    pub last_read: HashMap<UserId, DateTime<Utc>>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Timestamp of the latest message or status change
    pub last_activity: DateTime<Utc>,
}

impl Negotiation {
    pub fn new(
        title: impl Into<String>,
        origin: NegotiationOrigin,
        seller_id: UserId,
        buyer_id: UserId,
    ) -> Self {
        let now = Utc::now();
        Self {
            negotiation_id: NegotiationId::new(),
            title: title.into(),
            origin,
            seller_id,
            buyer_id,
            status: NegotiationStatus::Active,
            messages: Vec::new(),
            current_offer: None,
            last_read: HashMap::new(),
            created_at: now,
            last_activity: now,
        }
    }

    /// Whether a user is one of the two participants
    pub fn is_participant(&self, user_id: UserId) -> bool {
        self.seller_id == user_id || self.buyer_id == user_id
    }

    /// The role a user holds in this negotiation, if any
    pub fn role_of(&self, user_id: UserId) -> Option<PartyRole> {
        if self.seller_id == user_id {
            Some(PartyRole::Seller)
        } else if self.buyer_id == user_id {
            Some(PartyRole::Buyer)
        } else {
            None
        }
    }

    /// The participant holding a given role
    pub fn participant(&self, role: PartyRole) -> UserId {
        match role {
            PartyRole::Seller => self.seller_id,
            PartyRole::Buyer => self.buyer_id,
        }
    }

    /// Messages a participant has not read yet (their own excluded)
    pub fn unread_count(&self, user_id: UserId) -> usize {
        let last_read = self.last_read.get(&user_id).copied();
        self.messages
            .iter()
            .filter(|m| m.sender_id != user_id)
            .filter(|m| match last_read {
                Some(t) => m.sent_at > t,
                None => true,
            })
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn negotiation() -> Negotiation {
        Negotiation::new(
            "PET flakes",
            NegotiationOrigin::Listing(ListingId::new()),
            UserId::new(),
            UserId::new(),
        )
    }

    #[test]
    fn test_roles() {
        let n = negotiation();
        assert_eq!(n.role_of(n.seller_id), Some(PartyRole::Seller));
        assert_eq!(n.role_of(n.buyer_id), Some(PartyRole::Buyer));
        assert_eq!(n.role_of(UserId::new()), None);
        assert!(n.is_participant(n.seller_id));
        assert_eq!(n.participant(PartyRole::Buyer), n.buyer_id);
    }

    #[test]
    fn test_status_is_open() {
        assert!(NegotiationStatus::Active.is_open());
        assert!(NegotiationStatus::Pending.is_open());
        assert!(!NegotiationStatus::Completed.is_open());
        assert!(!NegotiationStatus::Cancelled.is_open());
    }

    #[test]
    fn test_unread_count() {
        let mut n = negotiation();
        let seller = n.seller_id;
        let buyer = n.buyer_id;

        n.messages
            .push(Message::new(seller, "hello", MessageType::Text, None));
        n.messages
            .push(Message::new(buyer, "hi", MessageType::Text, None));

        // Own messages never count as unread
        assert_eq!(n.unread_count(seller), 1);
        assert_eq!(n.unread_count(buyer), 1);

        n.last_read.insert(buyer, Utc::now());
        assert_eq!(n.unread_count(buyer), 0);
    }
}
