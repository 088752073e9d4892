//! # Identity Newtypes
//!
//! You cannot pass a `HolderId` where a `PolicyId` is expected, or a
//! `ClaimId` where a `ProposalId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an insurance policy record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyId(pub Uuid);

/// Identifier of the user who holds a policy and receives its notifications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HolderId(pub String);

/// Identifier of an insurance claim, assigned by the claims intake.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimId(pub String);

/// Identifier of a governance proposal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProposalId(pub String);

impl PolicyId {
    /// Generate a new random policy identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PolicyId {
    fn default() -> Self {
        Self::new()
    }
}

impl HolderId {
    /// Wrap a holder identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ClaimId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ProposalId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PolicyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "policy:{}", self.0)
    }
}

impl std::fmt::Display for HolderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for ClaimId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for ProposalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for PolicyId {
    type Err = crate::CoreError;

    /// Accepts either a bare UUID or the `policy:<uuid>` display form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.strip_prefix("policy:").unwrap_or(s);
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|e| crate::CoreError::Validation(format!("invalid policy id {s:?}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_ids_are_unique() {
        assert_ne!(PolicyId::new(), PolicyId::new());
    }

    #[test]
    fn policy_id_display_round_trips() {
        let id = PolicyId::new();
        let parsed: PolicyId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        let bare: PolicyId = id.as_uuid().to_string().parse().unwrap();
        assert_eq!(bare, id);
    }

    #[test]
    fn policy_id_rejects_garbage() {
        assert!("policy:not-a-uuid".parse::<PolicyId>().is_err());
    }

    #[test]
    fn string_ids_serialize_transparently() {
        assert_eq!(serde_json::to_string(&ClaimId::new("claim-456")).unwrap(), "\"claim-456\"");
        assert_eq!(ProposalId::new("proposal-001").to_string(), "proposal-001");
    }

    #[test]
    fn policy_id_serializes_as_bare_uuid() {
        let id = PolicyId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.as_uuid()));
    }
}
