//! # Portfolio Rollups
//!
//! Aggregates over the record set. "Active" means in force: `ACTIVE` or
//! `RENEWED`. Premium totals saturate rather than overflow.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use plc_core::HolderId;
use plc_state::PolicyState;

use crate::record::PolicyRecord;

/// Portfolio-wide dashboard figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_policies: u64,
    /// Count per state; every state is present.
    pub by_state: BTreeMap<PolicyState, u64>,
    pub active_policies: u64,
    /// Sum of in-force premiums, minor units.
    pub total_active_premium_minor: u64,
}

impl DashboardStats {
    pub fn compute(records: &[PolicyRecord]) -> Self {
        let mut by_state: BTreeMap<PolicyState, u64> =
            PolicyState::ALL.into_iter().map(|s| (s, 0)).collect();
        let mut active_policies = 0u64;
        let mut total_active_premium_minor = 0u64;

        for record in records {
            *by_state.entry(record.state).or_insert(0) += 1;
            if record.is_in_force() {
                active_policies += 1;
                total_active_premium_minor =
                    total_active_premium_minor.saturating_add(record.premium_minor);
            }
        }

        Self {
            total_policies: records.len() as u64,
            by_state,
            active_policies,
            total_active_premium_minor,
        }
    }
}

/// Figures for one policy holder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolderStats {
    pub holder_id: HolderId,
    pub active_policies: u64,
    pub total_active_premium_minor: u64,
}

impl HolderStats {
    pub fn compute(holder_id: &HolderId, records: &[PolicyRecord]) -> Self {
        let (active_policies, total_active_premium_minor) = records
            .iter()
            .filter(|r| &r.holder_id == holder_id && r.is_in_force())
            .fold((0u64, 0u64), |(n, sum), r| {
                (n + 1, sum.saturating_add(r.premium_minor))
            });
        Self {
            holder_id: holder_id.clone(),
            active_policies,
            total_active_premium_minor,
        }
    }
}
