//! # Domain Events
//!
//! Three families of events share one dispatcher: claim progress, policy
//! lifecycle transitions, and governance proposals. Each [`DomainEvent`]
//! carries its [`EventName`] and a typed [`EventPayload`]; the name is
//! always derived from the payload, so the two cannot disagree.
//!
//! Policy event names come from the applied action. Transition tables
//! reject rules whose target differs from the action's canonical target,
//! so the action alone determines the event.

use serde::{Deserialize, Serialize};

use plc_core::{ClaimId, CoreError, HolderId, PolicyId, ProposalId, Role, Timestamp};
use plc_state::{PolicyAction, PolicyState, TransitionResult};

// ─── Event Name ──────────────────────────────────────────────────────

/// Name under which listeners subscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventName {
    /// `claim.submitted`
    #[serde(rename = "claim.submitted")]
    ClaimSubmitted,
    /// `claim.approved`
    #[serde(rename = "claim.approved")]
    ClaimApproved,
    /// `claim.rejected`
    #[serde(rename = "claim.rejected")]
    ClaimRejected,
    /// `claim.settled`
    #[serde(rename = "claim.settled")]
    ClaimSettled,
    /// `policy.issued`
    #[serde(rename = "policy.issued")]
    PolicyIssued,
    /// `policy.renewed`
    #[serde(rename = "policy.renewed")]
    PolicyRenewed,
    /// `policy.expired`
    #[serde(rename = "policy.expired")]
    PolicyExpired,
    /// `policy.cancelled`
    #[serde(rename = "policy.cancelled")]
    PolicyCancelled,
    /// `dao.proposal.created`
    #[serde(rename = "dao.proposal.created")]
    DaoProposalCreated,
    /// `dao.proposal.finalized`
    #[serde(rename = "dao.proposal.finalized")]
    DaoProposalFinalized,
}

impl EventName {
    /// Every event name in declaration order.
    pub const ALL: [EventName; 10] = [
        EventName::ClaimSubmitted,
        EventName::ClaimApproved,
        EventName::ClaimRejected,
        EventName::ClaimSettled,
        EventName::PolicyIssued,
        EventName::PolicyRenewed,
        EventName::PolicyExpired,
        EventName::PolicyCancelled,
        EventName::DaoProposalCreated,
        EventName::DaoProposalFinalized,
    ];

    /// Claim event names.
    pub const CLAIM: [EventName; 4] = [
        EventName::ClaimSubmitted,
        EventName::ClaimApproved,
        EventName::ClaimRejected,
        EventName::ClaimSettled,
    ];

    /// Policy lifecycle event names.
    pub const POLICY: [EventName; 4] = [
        EventName::PolicyIssued,
        EventName::PolicyRenewed,
        EventName::PolicyExpired,
        EventName::PolicyCancelled,
    ];

    /// Governance proposal event names.
    pub const PROPOSAL: [EventName; 2] =
        [EventName::DaoProposalCreated, EventName::DaoProposalFinalized];

    /// The dotted wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClaimSubmitted => "claim.submitted",
            Self::ClaimApproved => "claim.approved",
            Self::ClaimRejected => "claim.rejected",
            Self::ClaimSettled => "claim.settled",
            Self::PolicyIssued => "policy.issued",
            Self::PolicyRenewed => "policy.renewed",
            Self::PolicyExpired => "policy.expired",
            Self::PolicyCancelled => "policy.cancelled",
            Self::DaoProposalCreated => "dao.proposal.created",
            Self::DaoProposalFinalized => "dao.proposal.finalized",
        }
    }

    /// The event published when `action` succeeds.
    pub fn for_action(action: PolicyAction) -> Self {
        match action {
            PolicyAction::Issue => Self::PolicyIssued,
            PolicyAction::Renew => Self::PolicyRenewed,
            PolicyAction::Expire => Self::PolicyExpired,
            PolicyAction::Cancel => Self::PolicyCancelled,
        }
    }
}

impl std::fmt::Display for EventName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EventName {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventName::ALL
            .into_iter()
            .find(|n| n.as_str() == s)
            .ok_or_else(|| CoreError::UnknownEvent(s.to_string()))
    }
}

// ─── Policy Payload ──────────────────────────────────────────────────

/// What happened to a policy, as seen by listeners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyLifecycleEvent {
    /// The policy that transitioned.
    pub policy_id: PolicyId,
    /// Holder of the policy.
    pub holder_id: HolderId,
    /// State before.
    pub from: PolicyState,
    /// State after.
    pub to: PolicyState,
    /// Applied action.
    pub action: PolicyAction,
    /// Role under which the action was authorized.
    pub actor_role: Role,
    /// Reason, when supplied.
    pub reason: Option<String>,
    /// Record version after the save.
    pub version: u64,
    /// When the transition was evaluated.
    pub occurred_at: Timestamp,
}

impl PolicyLifecycleEvent {
    /// Build the payload for a saved transition.
    pub fn from_transition(
        policy_id: PolicyId,
        holder_id: HolderId,
        result: &TransitionResult,
        version: u64,
    ) -> Self {
        Self {
            policy_id,
            holder_id,
            from: result.from,
            to: result.to,
            action: result.action,
            actor_role: result.actor_role,
            reason: result.reason.clone(),
            version,
            occurred_at: result.timestamp,
        }
    }
}

// ─── Claim Payload ───────────────────────────────────────────────────

/// Progress of an insurance claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClaimEvent {
    Submitted {
        claim_id: ClaimId,
        user_id: HolderId,
        policy_id: PolicyId,
    },
    Approved {
        claim_id: ClaimId,
        user_id: HolderId,
    },
    Rejected {
        claim_id: ClaimId,
        user_id: HolderId,
        reason: String,
    },
    Settled {
        claim_id: ClaimId,
        user_id: HolderId,
        /// Settled amount in minor units.
        amount_minor: u64,
    },
}

impl ClaimEvent {
    pub fn claim_id(&self) -> &ClaimId {
        match self {
            Self::Submitted { claim_id, .. }
            | Self::Approved { claim_id, .. }
            | Self::Rejected { claim_id, .. }
            | Self::Settled { claim_id, .. } => claim_id,
        }
    }

    /// The claimant.
    pub fn user_id(&self) -> &HolderId {
        match self {
            Self::Submitted { user_id, .. }
            | Self::Approved { user_id, .. }
            | Self::Rejected { user_id, .. }
            | Self::Settled { user_id, .. } => user_id,
        }
    }

    pub fn name(&self) -> EventName {
        match self {
            Self::Submitted { .. } => EventName::ClaimSubmitted,
            Self::Approved { .. } => EventName::ClaimApproved,
            Self::Rejected { .. } => EventName::ClaimRejected,
            Self::Settled { .. } => EventName::ClaimSettled,
        }
    }
}

// ─── Proposal Payload ────────────────────────────────────────────────

/// Progress of a governance proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProposalEvent {
    Created {
        proposal_id: ProposalId,
        creator_id: HolderId,
        title: String,
    },
    Finalized {
        proposal_id: ProposalId,
        creator_id: HolderId,
        passed: bool,
    },
}

impl ProposalEvent {
    pub fn proposal_id(&self) -> &ProposalId {
        match self {
            Self::Created { proposal_id, .. } | Self::Finalized { proposal_id, .. } => proposal_id,
        }
    }

    pub fn creator_id(&self) -> &HolderId {
        match self {
            Self::Created { creator_id, .. } | Self::Finalized { creator_id, .. } => creator_id,
        }
    }

    pub fn name(&self) -> EventName {
        match self {
            Self::Created { .. } => EventName::DaoProposalCreated,
            Self::Finalized { .. } => EventName::DaoProposalFinalized,
        }
    }
}

// ─── Payload ─────────────────────────────────────────────────────────

/// The event-specific body of a [`DomainEvent`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventPayload {
    Claim(ClaimEvent),
    Policy(PolicyLifecycleEvent),
    Proposal(ProposalEvent),
}

impl EventPayload {
    /// The name this payload is published under.
    pub fn name(&self) -> EventName {
        match self {
            Self::Claim(c) => c.name(),
            Self::Policy(p) => EventName::for_action(p.action),
            Self::Proposal(p) => p.name(),
        }
    }

    /// The user the event concerns.
    pub fn recipient(&self) -> &HolderId {
        match self {
            Self::Claim(c) => c.user_id(),
            Self::Policy(p) => &p.holder_id,
            Self::Proposal(p) => p.creator_id(),
        }
    }

    /// The policy the event refers to, if any.
    pub fn policy_id(&self) -> Option<PolicyId> {
        match self {
            Self::Policy(p) => Some(p.policy_id),
            Self::Claim(ClaimEvent::Submitted { policy_id, .. }) => Some(*policy_id),
            Self::Claim(_) | Self::Proposal(_) => None,
        }
    }

    pub fn as_policy(&self) -> Option<&PolicyLifecycleEvent> {
        match self {
            Self::Policy(p) => Some(p),
            _ => None,
        }
    }
}

impl From<PolicyLifecycleEvent> for EventPayload {
    fn from(event: PolicyLifecycleEvent) -> Self {
        Self::Policy(event)
    }
}

impl From<ClaimEvent> for EventPayload {
    fn from(event: ClaimEvent) -> Self {
        Self::Claim(event)
    }
}

impl From<ProposalEvent> for EventPayload {
    fn from(event: ProposalEvent) -> Self {
        Self::Proposal(event)
    }
}

// ─── Domain Event ────────────────────────────────────────────────────

/// A named, immutable domain event.
///
/// Listeners only ever receive `&DomainEvent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainEvent {
    name: EventName,
    payload: EventPayload,
}

impl DomainEvent {
    /// Wrap a payload under the name it publishes.
    pub fn new(payload: impl Into<EventPayload>) -> Self {
        let payload = payload.into();
        Self {
            name: payload.name(),
            payload,
        }
    }

    /// The event name.
    pub fn name(&self) -> EventName {
        self.name
    }

    /// The event payload.
    pub fn payload(&self) -> &EventPayload {
        &self.payload
    }
}
