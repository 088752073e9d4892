//! # Holder Notifications
//!
//! In-app notifications for users, and the listener that creates one per
//! domain event.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use plc_core::{HolderId, Timestamp};
use plc_state::PolicyAction;

use crate::dispatcher::{Listener, ListenerError};
use crate::event::{ClaimEvent, DomainEvent, EventPayload, PolicyLifecycleEvent, ProposalEvent};

// ─── Notification ────────────────────────────────────────────────────

/// Category of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    /// Claim updates.
    Claim,
    /// Policy lifecycle updates.
    Policy,
    /// Governance updates.
    Dao,
}

impl NotificationType {
    /// Lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Claim => "claim",
            Self::Policy => "policy",
            Self::Dao => "dao",
        }
    }
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message addressed to one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: HolderId,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub created_at: Timestamp,
}

// ─── Store ───────────────────────────────────────────────────────────

/// Shared in-memory notification store.
///
/// Cloning yields another handle to the same notifications.
#[derive(Debug, Clone, Default)]
pub struct NotificationStore {
    items: Arc<RwLock<Vec<Notification>>>,
}

impl NotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an unread notification and return it.
    pub fn create(
        &self,
        user_id: HolderId,
        kind: NotificationType,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Notification {
        let notification = Notification {
            id: Uuid::new_v4(),
            user_id,
            kind,
            title: title.into(),
            message: message.into(),
            read: false,
            created_at: Timestamp::now(),
        };
        self.items.write().push(notification.clone());
        notification
    }

    /// Notifications for `user_id`, oldest first.
    pub fn for_user(&self, user_id: &HolderId) -> Vec<Notification> {
        self.items
            .read()
            .iter()
            .filter(|n| &n.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Every notification, oldest first.
    pub fn all(&self) -> Vec<Notification> {
        self.items.read().clone()
    }

    /// Remove every notification.
    pub fn clear(&self) {
        self.items.write().clear();
    }

    /// Mark a notification read. Returns `false` if it does not exist.
    pub fn mark_read(&self, id: Uuid) -> bool {
        match self.items.write().iter_mut().find(|n| n.id == id) {
            Some(n) => {
                n.read = true;
                true
            }
            None => false,
        }
    }

    pub fn unread_count(&self, user_id: &HolderId) -> usize {
        self.items
            .read()
            .iter()
            .filter(|n| &n.user_id == user_id && !n.read)
            .count()
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}

// ─── Listener ────────────────────────────────────────────────────────

/// Notifies the user each event concerns: the claimant, the policy holder
/// or the proposal creator.
#[derive(Debug, Clone)]
pub struct NotificationListener {
    store: NotificationStore,
}

impl NotificationListener {
    pub fn new(store: NotificationStore) -> Self {
        Self { store }
    }

    /// Category, title and message for `event`.
    pub fn render(event: &DomainEvent) -> (NotificationType, &'static str, String) {
        match event.payload() {
            EventPayload::Claim(claim) => {
                let (title, message) = render_claim(claim);
                (NotificationType::Claim, title, message)
            }
            EventPayload::Policy(policy) => {
                let (title, message) = render_policy(policy);
                (NotificationType::Policy, title, message)
            }
            EventPayload::Proposal(proposal) => {
                let (title, message) = render_proposal(proposal);
                (NotificationType::Dao, title, message)
            }
        }
    }
}

fn render_claim(claim: &ClaimEvent) -> (&'static str, String) {
    let id = claim.claim_id();
    match claim {
        ClaimEvent::Submitted { .. } => (
            "Claim Submitted",
            format!("Your claim (ID: {id}) has been submitted and is under review."),
        ),
        ClaimEvent::Approved { .. } => (
            "Claim Approved",
            format!("Great news! Your claim (ID: {id}) has been approved."),
        ),
        ClaimEvent::Rejected { reason, .. } => (
            "Claim Rejected",
            format!("Your claim (ID: {id}) has been rejected. Reason: {reason}"),
        ),
        ClaimEvent::Settled { amount_minor, .. } => (
            "Claim Settled",
            format!(
                "Your claim (ID: {id}) has been settled. Amount: ${}.{:02}",
                amount_minor / 100,
                amount_minor % 100
            ),
        ),
    }
}

fn render_policy(p: &PolicyLifecycleEvent) -> (&'static str, String) {
    let id = p.policy_id.as_uuid();
    match p.action {
        PolicyAction::Issue => (
            "Policy Issued",
            format!("Your policy (ID: {id}) has been issued and is now active."),
        ),
        PolicyAction::Renew => (
            "Policy Renewed",
            format!("Your policy (ID: {id}) has been renewed."),
        ),
        PolicyAction::Expire => (
            "Policy Expired",
            format!("Your policy (ID: {id}) has expired. Please renew to keep your coverage."),
        ),
        PolicyAction::Cancel => (
            "Policy Cancelled",
            format!(
                "Your policy (ID: {id}) has been cancelled. Reason: {}",
                p.reason.as_deref().unwrap_or("not provided")
            ),
        ),
    }
}

fn render_proposal(proposal: &ProposalEvent) -> (&'static str, String) {
    match proposal {
        ProposalEvent::Created { title, .. } => (
            "Proposal Created",
            format!("Your proposal \"{title}\" has been created and is open for voting."),
        ),
        ProposalEvent::Finalized {
            proposal_id,
            passed,
            ..
        } => (
            "Proposal Voting Ended",
            format!(
                "Voting on your proposal (ID: {proposal_id}) has ended. The proposal {}.",
                if *passed { "passed" } else { "did not pass" }
            ),
        ),
    }
}

impl Listener for NotificationListener {
    fn name(&self) -> &str {
        "notifications"
    }

    fn handle(&self, event: &DomainEvent) -> Result<(), ListenerError> {
        let (kind, title, message) = Self::render(event);
        let created = self
            .store
            .create(event.payload().recipient().clone(), kind, title, message);
        tracing::debug!(
            notification = %created.id,
            user = %created.user_id,
            event = %event.name(),
            "notification created"
        );
        Ok(())
    }
}
