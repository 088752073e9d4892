//! # Policy States and Actions
//!
//! Closed enums for the lifecycle position of a policy and the commands
//! that can be requested against it. There are no string-typed states:
//! strings are parsed once at the boundary and rejected if unknown.

use serde::{Deserialize, Serialize};

use plc_core::CoreError;

// ─── Policy State ────────────────────────────────────────────────────

/// The lifecycle state of a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PolicyState {
    /// Created but not yet issued.
    Draft,
    /// Issued and providing coverage.
    Active,
    /// Renewed for a further term.
    Renewed,
    /// Coverage term ended without renewal.
    Expired,
    /// Cancelled (terminal).
    Cancelled,
}

impl PolicyState {
    /// All states in declaration order.
    pub const ALL: [PolicyState; 5] = [
        PolicyState::Draft,
        PolicyState::Active,
        PolicyState::Renewed,
        PolicyState::Expired,
        PolicyState::Cancelled,
    ];

    /// Whether this state is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Whether the policy provides coverage in this state.
    pub fn is_in_force(&self) -> bool {
        matches!(self, Self::Active | Self::Renewed)
    }

    /// The canonical state name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Active => "ACTIVE",
            Self::Renewed => "RENEWED",
            Self::Expired => "EXPIRED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for PolicyState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PolicyState {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        PolicyState::ALL
            .into_iter()
            .find(|st| st.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CoreError::UnknownState(s.to_string()))
    }
}

// ─── Policy Action ───────────────────────────────────────────────────

/// A command requested against a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PolicyAction {
    /// Put a drafted policy into force.
    Issue,
    /// Extend coverage for a further term.
    Renew,
    /// End coverage at the close of its term.
    Expire,
    /// Terminate the policy.
    Cancel,
}

impl PolicyAction {
    /// All actions in declaration order.
    pub const ALL: [PolicyAction; 4] = [
        PolicyAction::Issue,
        PolicyAction::Renew,
        PolicyAction::Expire,
        PolicyAction::Cancel,
    ];

    /// The state every successful application of this action lands in.
    pub fn target(&self) -> PolicyState {
        match self {
            Self::Issue => PolicyState::Active,
            Self::Renew => PolicyState::Renewed,
            Self::Expire => PolicyState::Expired,
            Self::Cancel => PolicyState::Cancelled,
        }
    }

    /// The canonical action name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Issue => "ISSUE",
            Self::Renew => "RENEW",
            Self::Expire => "EXPIRE",
            Self::Cancel => "CANCEL",
        }
    }
}

impl std::fmt::Display for PolicyAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PolicyAction {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        PolicyAction::ALL
            .into_iter()
            .find(|a| a.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CoreError::UnknownAction(s.to_string()))
    }
}
