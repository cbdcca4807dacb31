//! Negotiation service - core business logic for the channel

use std::sync::Arc;

use chrono::Utc;

use common::{Actor, NegotiationId, PartyDirectory, UserId};

use crate::error::{NegotiationError, Result};
use crate::store::traits::NegotiationStore;
use crate::types::{
    Message, MessageType, Negotiation, NegotiationOrigin, NegotiationStatus, OfferPayload,
};

/// Negotiation service - handles the channel lifecycle
pub struct NegotiationService {
    store: Arc<dyn NegotiationStore>,
    directory: Arc<dyn PartyDirectory>,
}

impl NegotiationService {
    /// Create a new negotiation service
    pub fn new(store: Arc<dyn NegotiationStore>, directory: Arc<dyn PartyDirectory>) -> Self {
        Self { store, directory }
    }

    /// Open a negotiation with a counterparty.
    ///
    /// Roles are fixed at creation from the originating entity: a listing
    /// origin makes the counterparty the seller, a request origin makes
    /// the counterparty the buyer.
    pub async fn create(
        &self,
        actor: Actor,
        title: String,
        counterparty_id: UserId,
        origin: NegotiationOrigin,
    ) -> Result<Negotiation> {
        if title.trim().is_empty() {
            return Err(NegotiationError::Validation("Title is required".to_string()));
        }
        if counterparty_id == actor.user_id {
            return Err(NegotiationError::Validation(
                "Cannot negotiate with yourself".to_string(),
            ));
        }
        if !self.directory.exists(counterparty_id) {
            return Err(NegotiationError::NotFound(format!(
                "counterparty {}",
                counterparty_id
            )));
        }

        let (seller_id, buyer_id) = match origin {
            NegotiationOrigin::Listing(_) => (counterparty_id, actor.user_id),
            NegotiationOrigin::Request(_) => (actor.user_id, counterparty_id),
        };

        let negotiation = Negotiation::new(title, origin, seller_id, buyer_id);

        tracing::info!(
            negotiation_id = %negotiation.negotiation_id,
            seller = %seller_id,
            buyer = %buyer_id,
            "Opening negotiation"
        );

        self.store.create(negotiation).await
    }

    /// Post a message to the negotiation log.
    ///
    /// Only the two participants may post. An offer message must carry a
    /// structured payload, which becomes the advisory `current_offer` and
    /// moves the negotiation to pending.
    pub async fn post_message(
        &self,
        actor: Actor,
        negotiation_id: NegotiationId,
        content: String,
        message_type: MessageType,
        offer: Option<OfferPayload>,
    ) -> Result<Negotiation> {
        let mut negotiation = self.get_required(negotiation_id).await?;

        if !negotiation.is_participant(actor.user_id) {
            return Err(NegotiationError::Unauthorized(format!(
                "user {} is not a participant",
                actor.user_id
            )));
        }

        if !negotiation.status.is_open() {
            return Err(NegotiationError::InvalidState(format!(
                "cannot post to a {} negotiation",
                negotiation.status
            )));
        }

        if message_type == MessageType::Offer && offer.is_none() {
            return Err(NegotiationError::Validation(
                "Offer messages require an offer payload".to_string(),
            ));
        }
        if message_type != MessageType::Offer && offer.is_some() {
            return Err(NegotiationError::Validation(
                "Only offer messages may carry an offer payload".to_string(),
            ));
        }

        let message = Message::new(actor.user_id, content, message_type, offer.clone());

        // The payload is stored for reference only; contract terms are
        // entered independently and never read from here.
        if let Some(offer) = offer {
            negotiation.current_offer = Some(offer);
            negotiation.status = NegotiationStatus::Pending;
        }

        negotiation.last_activity = message.sent_at;
        negotiation.messages.push(message);
        self.store.update(&negotiation).await?;

        tracing::debug!(
            negotiation_id = %negotiation_id,
            messages = negotiation.messages.len(),
            "Message posted"
        );

        Ok(negotiation)
    }

    /// Record that a participant has read the conversation. Idempotent.
    pub async fn mark_read(&self, actor: Actor, negotiation_id: NegotiationId) -> Result<()> {
        let mut negotiation = self.get_required(negotiation_id).await?;

        if !negotiation.is_participant(actor.user_id) {
            return Err(NegotiationError::Unauthorized(format!(
                "user {} is not a participant",
                actor.user_id
            )));
        }

        negotiation.last_read.insert(actor.user_id, Utc::now());
        self.store.update(&negotiation).await
    }

    /// Close the negotiation as agreed. A contract can be created from a
    /// completed negotiation.
    pub async fn complete(&self, actor: Actor, negotiation_id: NegotiationId) -> Result<Negotiation> {
        self.close(actor, negotiation_id, NegotiationStatus::Completed)
            .await
    }

    /// Abandon the negotiation.
    pub async fn cancel(&self, actor: Actor, negotiation_id: NegotiationId) -> Result<Negotiation> {
        self.close(actor, negotiation_id, NegotiationStatus::Cancelled)
            .await
    }

    async fn close(
        &self,
        actor: Actor,
        negotiation_id: NegotiationId,
        target: NegotiationStatus,
    ) -> Result<Negotiation> {
        let mut negotiation = self.get_required(negotiation_id).await?;

        if !negotiation.is_participant(actor.user_id) {
            return Err(NegotiationError::Unauthorized(format!(
                "user {} is not a participant",
                actor.user_id
            )));
        }

        if !negotiation.status.is_open() {
            return Err(NegotiationError::InvalidState(format!(
                "negotiation is already {}",
                negotiation.status
            )));
        }

        negotiation.status = target;
        negotiation.last_activity = Utc::now();
        self.store.update(&negotiation).await?;

        tracing::info!(negotiation_id = %negotiation_id, status = %target, "Negotiation closed");

        Ok(negotiation)
    }

    /// Get a negotiation by ID
    pub async fn get(&self, negotiation_id: NegotiationId) -> Result<Option<Negotiation>> {
        self.store.get(negotiation_id).await
    }

    /// List negotiations a user participates in
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Negotiation>> {
        self.store.list_for_user(user_id).await
    }

    async fn get_required(&self, negotiation_id: NegotiationId) -> Result<Negotiation> {
        self.store
            .get(negotiation_id)
            .await?
            .ok_or_else(|| NegotiationError::NotFound(format!("negotiation {}", negotiation_id)))
    }
}
