//! # Policy Record

use serde::{Deserialize, Serialize};

use plc_core::{HolderId, PolicyId, Timestamp};
use plc_state::{PolicyState, TransitionResult};

/// A persisted insurance policy.
///
/// `state` changes only through [`PolicyRecord::apply`], called by the
/// lifecycle service with a result the engine produced for this record's
/// current state. `version` is owned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRecord {
    pub id: PolicyId,
    pub holder_id: HolderId,
    /// Premium in minor currency units.
    pub premium_minor: u64,
    pub state: PolicyState,
    pub version: u64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    /// Every applied transition, oldest first.
    pub transitions: Vec<TransitionResult>,
}

impl PolicyRecord {
    /// A new record in `Draft` at version 0.
    pub fn draft(holder_id: HolderId, premium_minor: u64, at: Timestamp) -> Self {
        Self {
            id: PolicyId::new(),
            holder_id,
            premium_minor,
            state: PolicyState::Draft,
            version: 0,
            created_at: at,
            updated_at: at,
            transitions: Vec::new(),
        }
    }

    /// Move to the result's target state and log the transition.
    pub fn apply(&mut self, result: &TransitionResult) {
        debug_assert_eq!(self.state, result.from);
        self.state = result.to;
        self.updated_at = result.timestamp;
        self.transitions.push(result.clone());
    }

    /// Whether the policy currently provides coverage.
    pub fn is_in_force(&self) -> bool {
        self.state.is_in_force()
    }
}
