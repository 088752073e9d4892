//! # Transition Table
//!
//! Static declaration of the legal `(state, action) → state` mappings.
//! The table is a partial function: at most one rule per `(from, action)`
//! pair. Declaration order is preserved and is the order in which
//! available actions are reported.

use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;

use plc_core::{Role, RoleSet};

use crate::policy::{PolicyAction, PolicyState};

// ─── Transition Rule ─────────────────────────────────────────────────

/// One legal transition and its guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TransitionRule {
    /// Source state.
    pub from: PolicyState,
    /// Requested action.
    pub action: PolicyAction,
    /// Resulting state.
    pub to: PolicyState,
    /// Roles permitted to invoke the action from `from`.
    pub allowed_roles: RoleSet,
    /// Whether a non-blank reason must accompany the request.
    pub reason_required: bool,
}

impl TransitionRule {
    /// Declare a rule.
    pub const fn new(
        from: PolicyState,
        action: PolicyAction,
        to: PolicyState,
        allowed_roles: RoleSet,
        reason_required: bool,
    ) -> Self {
        Self {
            from,
            action,
            to,
            allowed_roles,
            reason_required,
        }
    }
}

const ISSUERS: RoleSet = RoleSet::of(&[Role::Agent, Role::Underwriter, Role::Admin]);
const RENEWERS: RoleSet = RoleSet::of(&[Role::Agent, Role::Customer, Role::Admin]);
const REINSTATERS: RoleSet = RoleSet::of(&[Role::Agent, Role::Admin]);
const EXPIRERS: RoleSet = RoleSet::of(&[Role::System, Role::Admin]);
const CANCELLERS: RoleSet = RoleSet::of(&[Role::Agent, Role::Admin]);

/// The standard policy lifecycle, in declaration order.
pub const STANDARD_POLICY_RULES: [TransitionRule; 9] = {
    use PolicyAction::*;
    use PolicyState::*;
    [
        TransitionRule::new(Draft, Issue, Active, ISSUERS, false),
        TransitionRule::new(Draft, Cancel, Cancelled, CANCELLERS, true),
        TransitionRule::new(Active, Renew, Renewed, RENEWERS, false),
        TransitionRule::new(Active, Expire, Expired, EXPIRERS, false),
        TransitionRule::new(Active, Cancel, Cancelled, CANCELLERS, true),
        TransitionRule::new(Renewed, Renew, Renewed, RENEWERS, false),
        TransitionRule::new(Renewed, Expire, Expired, EXPIRERS, false),
        TransitionRule::new(Renewed, Cancel, Cancelled, CANCELLERS, true),
        TransitionRule::new(Expired, Renew, Renewed, REINSTATERS, false),
    ]
};

// ─── Errors ──────────────────────────────────────────────────────────

/// A transition table that cannot be built.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TableError {
    /// Two rules share a `(from, action)` pair.
    #[error("duplicate transition rule for {action} from {from}")]
    DuplicateRule {
        /// Source state of the duplicated pair.
        from: PolicyState,
        /// Action of the duplicated pair.
        action: PolicyAction,
    },

    /// A rule nobody may invoke.
    #[error("transition rule {action} from {from} allows no roles")]
    NoAllowedRoles {
        /// Source state.
        from: PolicyState,
        /// Action.
        action: PolicyAction,
    },

    /// A rule whose target disagrees with the action's canonical target.
    #[error("transition rule {action} from {from} targets {to}, expected {expected}")]
    TargetMismatch {
        /// Source state.
        from: PolicyState,
        /// Action.
        action: PolicyAction,
        /// Declared target.
        to: PolicyState,
        /// The action's canonical target.
        expected: PolicyState,
    },
}

// ─── Table ───────────────────────────────────────────────────────────

/// A validated, ordered set of transition rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionTable {
    rules: Vec<TransitionRule>,
}

impl TransitionTable {
    /// Build a table, rejecting duplicates, empty role sets and targets
    /// inconsistent with their action.
    pub fn new(rules: Vec<TransitionRule>) -> Result<Self, TableError> {
        let mut seen = HashSet::with_capacity(rules.len());
        for rule in &rules {
            if !seen.insert((rule.from, rule.action)) {
                return Err(TableError::DuplicateRule {
                    from: rule.from,
                    action: rule.action,
                });
            }
            if rule.allowed_roles.is_empty() {
                return Err(TableError::NoAllowedRoles {
                    from: rule.from,
                    action: rule.action,
                });
            }
            let expected = rule.action.target();
            if rule.to != expected {
                return Err(TableError::TargetMismatch {
                    from: rule.from,
                    action: rule.action,
                    to: rule.to,
                    expected,
                });
            }
        }
        Ok(Self { rules })
    }

    /// The standard policy lifecycle table.
    ///
    /// Built from [`STANDARD_POLICY_RULES`], whose validity is covered by
    /// this module's tests.
    pub fn standard() -> Self {
        Self {
            rules: STANDARD_POLICY_RULES.to_vec(),
        }
    }

    /// The unique rule for `(from, action)`, if any.
    pub fn lookup(&self, from: PolicyState, action: PolicyAction) -> Option<&TransitionRule> {
        self.rules
            .iter()
            .find(|r| r.from == from && r.action == action)
    }

    /// Rules leaving `from`, in declaration order.
    pub fn rules_from(&self, from: PolicyState) -> impl Iterator<Item = &TransitionRule> + '_ {
        self.rules.iter().filter(move |r| r.from == from)
    }

    /// All rules in declaration order.
    pub fn rules(&self) -> &[TransitionRule] {
        &self.rules
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the table has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for TransitionTable {
    fn default() -> Self {
        Self::standard()
    }
}
