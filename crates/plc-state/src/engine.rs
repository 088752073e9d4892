//! # Transition Engine
//!
//! Decides whether a requested action is legal for a policy in a given
//! state, for a given actor, and produces the [`TransitionResult`].
//!
//! Guards are evaluated in a fixed order:
//!
//! 1. A rule must exist for `(current, action)`, else `IllegalTransition`.
//!    Unknown or mistyped actions never reach this point because they fail
//!    to parse into [`PolicyAction`].
//! 2. If the rule requires a reason, a non-blank reason must be supplied,
//!    else `MissingReason`.
//! 3. The actor's roles must intersect the rule's allowed roles, else
//!    `Unauthorized`.
//!
//! The engine owns no records and performs no I/O.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use plc_core::{Role, RoleSet, Timestamp};

use crate::policy::{PolicyAction, PolicyState};
use crate::table::TransitionTable;

// ─── Result ──────────────────────────────────────────────────────────

/// The outcome of a legal transition.
///
/// Immutable once produced. It is both the engine's return value and the
/// basis for the lifecycle event published after the record is saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionResult {
    /// State before the transition.
    pub from: PolicyState,
    /// State after the transition.
    pub to: PolicyState,
    /// The action applied.
    pub action: PolicyAction,
    /// The role under which the actor was authorized.
    pub actor_role: Role,
    /// Trimmed reason, when one was supplied.
    pub reason: Option<String>,
    /// When the transition was evaluated.
    pub timestamp: Timestamp,
}

// ─── Errors ──────────────────────────────────────────────────────────

/// Rejection of a requested transition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// No rule exists for the action from the current state.
    #[error("action {action} is not defined from state {from}")]
    IllegalTransition {
        /// Current state.
        from: PolicyState,
        /// Requested action.
        action: PolicyAction,
    },

    /// The rule requires a reason and none was supplied.
    #[error("action {action} from state {from} requires a reason")]
    MissingReason {
        /// Current state.
        from: PolicyState,
        /// Requested action.
        action: PolicyAction,
    },

    /// None of the actor's roles is allowed to invoke the action.
    #[error("roles {roles} may not {action} a policy in state {from}; allowed: {allowed}")]
    Unauthorized {
        /// Current state.
        from: PolicyState,
        /// Requested action.
        action: PolicyAction,
        /// The actor's roles.
        roles: RoleSet,
        /// Roles the rule allows.
        allowed: RoleSet,
    },
}

// ─── Engine ──────────────────────────────────────────────────────────

/// Table-driven transition evaluator.
#[derive(Debug, Clone, Default)]
pub struct TransitionEngine {
    table: TransitionTable,
}

impl TransitionEngine {
    /// An engine over the given table.
    pub fn new(table: TransitionTable) -> Self {
        Self { table }
    }

    /// An engine over the standard policy lifecycle.
    pub fn standard() -> Self {
        Self::new(TransitionTable::standard())
    }

    /// The table this engine evaluates.
    pub fn table(&self) -> &TransitionTable {
        &self.table
    }

    /// Evaluate `action` against a policy in `current` for an actor holding
    /// `actor_roles`.
    ///
    /// `at` is the instant recorded on the result. Identical inputs always
    /// yield identical outputs.
    pub fn evaluate(
        &self,
        current: PolicyState,
        action: PolicyAction,
        actor_roles: RoleSet,
        reason: Option<&str>,
        at: Timestamp,
    ) -> Result<TransitionResult, TransitionError> {
        let rule = self
            .table
            .lookup(current, action)
            .ok_or(TransitionError::IllegalTransition {
                from: current,
                action,
            })?;

        let reason = reason.map(str::trim).filter(|r| !r.is_empty());
        if rule.reason_required && reason.is_none() {
            return Err(TransitionError::MissingReason {
                from: current,
                action,
            });
        }

        let actor_role = actor_roles
            .intersection(rule.allowed_roles)
            .iter()
            .next()
            .ok_or(TransitionError::Unauthorized {
                from: current,
                action,
                roles: actor_roles,
                allowed: rule.allowed_roles,
            })?;

        Ok(TransitionResult {
            from: current,
            to: rule.to,
            action,
            actor_role,
            reason: reason.map(str::to_string),
            timestamp: at,
        })
    }

    /// Actions `actor_roles` may invoke from `current`, in table order.
    ///
    /// Guards other than roles (such as a required reason) are not applied:
    /// an action that needs a reason is still offered.
    pub fn available_actions(&self, current: PolicyState, actor_roles: RoleSet) -> Vec<PolicyAction> {
        self.table
            .rules_from(current)
            .filter(|r| r.allowed_roles.intersects(actor_roles))
            .map(|r| r.action)
            .collect()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn arb_state() -> impl Strategy<Value = PolicyState> {
        proptest::sample::select(PolicyState::ALL.to_vec())
    }

    fn arb_action() -> impl Strategy<Value = PolicyAction> {
        proptest::sample::select(PolicyAction::ALL.to_vec())
    }

    fn arb_roles() -> impl Strategy<Value = RoleSet> {
        proptest::collection::vec(proptest::sample::select(Role::ALL.to_vec()), 0..5)
            .prop_map(|roles| roles.into_iter().collect())
    }

    fn arb_reason() -> impl Strategy<Value = Option<String>> {
        proptest::option::of("[ a-zA-Z]{0,12}")
    }

    proptest! {
        /// Same inputs, same output.
        #[test]
        fn evaluation_is_deterministic(
            state in arb_state(),
            action in arb_action(),
            roles in arb_roles(),
            reason in arb_reason(),
            secs in 0i64..4_000_000_000,
        ) {
            let engine = TransitionEngine::standard();
            let at = Timestamp::from_epoch_secs(secs).unwrap();
            let a = engine.evaluate(state, action, roles, reason.as_deref(), at);
            let b = engine.evaluate(state, action, roles, reason.as_deref(), at);
            prop_assert_eq!(a, b);
        }

        /// A successful result always lands in the action's target, with an
        /// acting role the actor holds and the rule allows.
        #[test]
        fn success_respects_guards(
            state in arb_state(),
            action in arb_action(),
            roles in arb_roles(),
            reason in arb_reason(),
        ) {
            let engine = TransitionEngine::standard();
            let at = Timestamp::from_epoch_secs(1_700_000_000).unwrap();
            if let Ok(result) = engine.evaluate(state, action, roles, reason.as_deref(), at) {
                let rule = engine.table().lookup(state, action).unwrap();
                prop_assert_eq!(result.to, action.target());
                prop_assert!(roles.contains(result.actor_role));
                prop_assert!(rule.allowed_roles.contains(result.actor_role));
                if rule.reason_required {
                    prop_assert!(result.reason.as_deref().is_some_and(|r| !r.is_empty()));
                }
            }
        }

        /// Every action offered by `available_actions` succeeds once a
        /// reason is supplied.
        #[test]
        fn offered_actions_are_applicable(state in arb_state(), roles in arb_roles()) {
            let engine = TransitionEngine::standard();
            let at = Timestamp::from_epoch_secs(1_700_000_000).unwrap();
            for action in engine.available_actions(state, roles) {
                prop_assert!(engine.evaluate(state, action, roles, Some("requested"), at).is_ok());
            }
        }
    }
}
