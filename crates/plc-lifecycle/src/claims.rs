//! # Claim Progress
//!
//! Records claim steps as domain events. Claim adjudication itself lives
//! outside this stack; this service only announces its outcomes so the
//! claimant is notified and the audit trail keeps them.

use std::sync::Arc;

use plc_core::{ClaimId, HolderId, PolicyId};
use plc_events::{ClaimEvent, DomainEvent, EventDispatcher};

use crate::error::LifecycleError;
use crate::store::PolicyStore;

/// Publishes claim events.
pub struct ClaimService {
    store: Arc<dyn PolicyStore>,
    dispatcher: Arc<EventDispatcher>,
}

impl ClaimService {
    pub fn new(store: Arc<dyn PolicyStore>, dispatcher: Arc<EventDispatcher>) -> Self {
        Self { store, dispatcher }
    }

    /// Submit a claim against a stored policy. The claimant is the policy's
    /// holder.
    pub fn submit_claim(
        &self,
        claim_id: ClaimId,
        policy_id: PolicyId,
    ) -> Result<ClaimEvent, LifecycleError> {
        let policy = self.store.load(&policy_id)?;
        Ok(self.publish(ClaimEvent::Submitted {
            claim_id,
            user_id: policy.holder_id,
            policy_id,
        }))
    }

    pub fn approve_claim(&self, claim_id: ClaimId, user_id: HolderId) -> ClaimEvent {
        self.publish(ClaimEvent::Approved { claim_id, user_id })
    }

    pub fn reject_claim(&self, claim_id: ClaimId, user_id: HolderId, reason: &str) -> ClaimEvent {
        self.publish(ClaimEvent::Rejected {
            claim_id,
            user_id,
            reason: reason.trim().to_string(),
        })
    }

    /// Settle a claim for `amount_minor` minor units.
    pub fn settle_claim(&self, claim_id: ClaimId, user_id: HolderId, amount_minor: u64) -> ClaimEvent {
        self.publish(ClaimEvent::Settled {
            claim_id,
            user_id,
            amount_minor,
        })
    }

    fn publish(&self, claim: ClaimEvent) -> ClaimEvent {
        let event = DomainEvent::new(claim.clone());
        tracing::info!(claim = %claim.claim_id(), user = %claim.user_id(), event = %event.name(), "claim event");
        self.dispatcher.publish(&event);
        claim
    }
}

impl std::fmt::Debug for ClaimService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClaimService")
            .field("dispatcher", &self.dispatcher)
            .finish()
    }
}
