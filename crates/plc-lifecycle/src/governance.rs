//! # Governance Proposals
//!
//! Announces proposal creation and the end of voting. Vote counting is not
//! part of this stack; the caller supplies the outcome.

use std::sync::Arc;

use plc_core::{HolderId, ProposalId};
use plc_events::{DomainEvent, EventDispatcher, ProposalEvent};

/// Publishes governance proposal events.
#[derive(Debug)]
pub struct ProposalService {
    dispatcher: Arc<EventDispatcher>,
}

impl ProposalService {
    pub fn new(dispatcher: Arc<EventDispatcher>) -> Self {
        Self { dispatcher }
    }

    pub fn create_proposal(
        &self,
        proposal_id: ProposalId,
        creator_id: HolderId,
        title: impl Into<String>,
    ) -> ProposalEvent {
        self.publish(ProposalEvent::Created {
            proposal_id,
            creator_id,
            title: title.into(),
        })
    }

    /// Close voting on a proposal with the given outcome.
    pub fn finalize_proposal(
        &self,
        proposal_id: ProposalId,
        creator_id: HolderId,
        passed: bool,
    ) -> ProposalEvent {
        self.publish(ProposalEvent::Finalized {
            proposal_id,
            creator_id,
            passed,
        })
    }

    fn publish(&self, proposal: ProposalEvent) -> ProposalEvent {
        let event = DomainEvent::new(proposal.clone());
        tracing::info!(
            proposal = %proposal.proposal_id(),
            creator = %proposal.creator_id(),
            event = %event.name(),
            "proposal event"
        );
        self.dispatcher.publish(&event);
        proposal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use plc_events::{listener_fn, EventName};

    #[test]
    fn proposal_events_reach_subscribers() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut dispatcher = EventDispatcher::new();
        let seen = Arc::clone(&log);
        dispatcher.subscribe_all(
            &EventName::PROPOSAL,
            listener_fn("proposal-log", move |e| {
                seen.lock().push(e.name());
                Ok(())
            }),
        );
        let service = ProposalService::new(Arc::new(dispatcher));
        let creator = HolderId::new("user-789");

        service.create_proposal(ProposalId::new("p-1"), creator.clone(), "Raise limits");
        let finalized = service.finalize_proposal(ProposalId::new("p-1"), creator, true);

        assert!(matches!(finalized, ProposalEvent::Finalized { passed: true, .. }));
        assert_eq!(
            *log.lock(),
            vec![EventName::DaoProposalCreated, EventName::DaoProposalFinalized]
        );
    }
}
