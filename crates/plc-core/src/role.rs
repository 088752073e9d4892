//! # Actor Roles
//!
//! `Role` is the closed vocabulary of actor roles; `RoleSet` is a `Copy`
//! bitset of roles. Guards test role-set intersection, never equality,
//! because an actor may hold several roles at once.
//!
//! `RoleSet` is constructible in `const` context so transition tables can
//! be declared as static data.

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// An actor role.
///
/// Declaration order is significant: when an actor holds several roles
/// that a rule allows, the first in this order is recorded as the acting
/// role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum Role {
    /// Back-office administrator.
    Admin = 0,
    /// Sales agent handling the policy.
    Agent = 1,
    /// Underwriter approving risk.
    Underwriter = 2,
    /// The policy holder acting on their own policy.
    Customer = 3,
    /// Automated system actor (schedulers, expiry sweeps).
    System = 4,
}

impl Role {
    /// All roles in declaration order.
    pub const ALL: [Role; 5] = [
        Role::Admin,
        Role::Agent,
        Role::Underwriter,
        Role::Customer,
        Role::System,
    ];

    /// The canonical role name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Agent => "AGENT",
            Self::Underwriter => "UNDERWRITER",
            Self::Customer => "CUSTOMER",
            Self::System => "SYSTEM",
        }
    }

    const fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Role::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CoreError::UnknownRole(s.to_string()))
    }
}

/// A set of roles.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RoleSet(u8);

impl RoleSet {
    /// The empty set.
    pub const EMPTY: RoleSet = RoleSet(0);

    /// Build a set from a slice of roles. Usable in `const` items.
    pub const fn of(roles: &[Role]) -> Self {
        let mut bits = 0u8;
        let mut i = 0;
        while i < roles.len() {
            bits |= roles[i].bit();
            i += 1;
        }
        RoleSet(bits)
    }

    /// A set containing exactly one role.
    pub const fn single(role: Role) -> Self {
        RoleSet(role.bit())
    }

    /// Whether `role` is a member.
    pub const fn contains(&self, role: Role) -> bool {
        self.0 & role.bit() != 0
    }

    /// Whether the two sets share at least one role.
    pub const fn intersects(&self, other: RoleSet) -> bool {
        self.0 & other.0 != 0
    }

    /// The roles present in both sets.
    pub const fn intersection(&self, other: RoleSet) -> RoleSet {
        RoleSet(self.0 & other.0)
    }

    /// Add a role to the set.
    pub fn insert(&mut self, role: Role) {
        self.0 |= role.bit();
    }

    /// Whether the set is empty.
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Number of roles in the set.
    pub const fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterate members in [`Role`] declaration order.
    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        Role::ALL.into_iter().filter(move |r| self.contains(*r))
    }

    /// Parse a comma-separated role list such as `"agent,admin"`.
    ///
    /// Empty segments are ignored; unknown names are rejected.
    pub fn parse_list(s: &str) -> Result<Self, CoreError> {
        s.split(',')
            .map(str::trim)
            .filter(|seg| !seg.is_empty())
            .map(str::parse::<Role>)
            .collect()
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        let mut set = RoleSet::EMPTY;
        for role in iter {
            set.insert(role);
        }
        set
    }
}

impl From<Role> for RoleSet {
    fn from(role: Role) -> Self {
        RoleSet::single(role)
    }
}

impl std::fmt::Debug for RoleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl std::fmt::Display for RoleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("{")?;
        for (i, role) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(role.as_str())?;
        }
        f.write_str("}")
    }
}

impl Serialize for RoleSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for RoleSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let roles = Vec::<Role>::deserialize(deserializer)?;
        Ok(roles.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const UNDERWRITING: RoleSet = RoleSet::of(&[Role::Underwriter, Role::Admin]);

    #[test]
    fn const_construction() {
        assert!(UNDERWRITING.contains(Role::Admin));
        assert!(UNDERWRITING.contains(Role::Underwriter));
        assert!(!UNDERWRITING.contains(Role::Agent));
        assert_eq!(UNDERWRITING.len(), 2);
    }

    #[test]
    fn iteration_follows_declaration_order() {
        let set = RoleSet::of(&[Role::System, Role::Agent, Role::Admin]);
        let roles: Vec<Role> = set.iter().collect();
        assert_eq!(roles, vec![Role::Admin, Role::Agent, Role::System]);
    }

    #[test]
    fn intersection_not_equality() {
        let actor = RoleSet::of(&[Role::Customer, Role::Agent]);
        let allowed = RoleSet::of(&[Role::Agent, Role::Admin]);
        assert!(actor.intersects(allowed));
        assert_eq!(actor.intersection(allowed), RoleSet::single(Role::Agent));
        assert!(!RoleSet::EMPTY.intersects(allowed));
    }

    #[test]
    fn parse_list_is_case_insensitive() {
        let set = RoleSet::parse_list("agent, ADMIN,,").unwrap();
        assert_eq!(set, RoleSet::of(&[Role::Agent, Role::Admin]));
    }

    #[test]
    fn parse_list_rejects_unknown() {
        let err = RoleSet::parse_list("agent,broker").unwrap_err();
        assert!(matches!(err, CoreError::UnknownRole(ref r) if r == "broker"));
    }

    #[test]
    fn display_lists_members() {
        let set = RoleSet::of(&[Role::Agent, Role::Admin]);
        assert_eq!(set.to_string(), "{ADMIN, AGENT}");
        assert_eq!(RoleSet::EMPTY.to_string(), "{}");
    }

    #[test]
    fn serializes_as_role_list() {
        let set = RoleSet::of(&[Role::Agent, Role::System]);
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["AGENT","SYSTEM"]"#);
        let back: RoleSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }

    fn arb_role_set() -> impl Strategy<Value = RoleSet> {
        proptest::collection::vec(proptest::sample::select(Role::ALL.to_vec()), 0..5)
            .prop_map(|roles| roles.into_iter().collect())
    }

    proptest! {
        #[test]
        fn intersects_is_symmetric(a in arb_role_set(), b in arb_role_set()) {
            prop_assert_eq!(a.intersects(b), b.intersects(a));
        }

        #[test]
        fn intersects_iff_intersection_nonempty(a in arb_role_set(), b in arb_role_set()) {
            prop_assert_eq!(a.intersects(b), !a.intersection(b).is_empty());
        }
    }
}
