//! # Run Subcommand
//!
//! Executes a YAML scenario against a fresh in-memory lifecycle stack and
//! reports every step plus the resulting records, notifications, audit
//! trail and dashboard as JSON.
//!
//! ```yaml
//! policies:
//!   - key: home
//!     holder: alice
//!     premium_minor: 120000
//! steps:
//!   - policy: home
//!     action: issue
//!     roles: [agent]
//!   - policy: home
//!     action: cancel
//!     roles: [agent]
//!     reason: Non-payment
//! ```
//!
//! A failing step is recorded with its error code and the run continues.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use serde::{Deserialize, Serialize};

use plc_core::{CoreError, HolderId, PolicyId, Role, RoleSet};
use plc_events::{AuditEntry, Notification};
use plc_lifecycle::{DashboardStats, LifecycleConfig, LifecycleStack, PolicyRecord, PolicyStore};
use plc_state::{PolicyAction, PolicyState};

/// Arguments for the run subcommand.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the scenario YAML file.
    pub scenario: PathBuf,
}

// ─── Scenario ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default)]
    pub policies: Vec<PolicySpec>,
    #[serde(default)]
    pub steps: Vec<StepSpec>,
}

/// A policy created before any step runs.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicySpec {
    /// Name steps use to refer to this policy.
    pub key: String,
    pub holder: String,
    pub premium_minor: u64,
}

/// One requested action. Action and role names are parsed per step so a
/// typo fails that step rather than the whole file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StepSpec {
    pub policy: String,
    pub action: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

// ─── Report ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct StepError {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub index: usize,
    pub policy: String,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<PolicyState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<StepError>,
}

impl StepOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub steps: Vec<StepOutcome>,
    pub policies: Vec<PolicyRecord>,
    pub notifications: Vec<Notification>,
    pub audit: Vec<AuditEntry>,
    pub audit_chain_valid: bool,
    pub dashboard: DashboardStats,
}

// ─── Execution ───────────────────────────────────────────────────────

/// Load, run and render the scenario at `args.scenario`.
pub fn run_file(args: &RunArgs) -> anyhow::Result<String> {
    let raw = std::fs::read_to_string(&args.scenario)
        .with_context(|| format!("reading scenario {}", args.scenario.display()))?;
    let scenario: Scenario = serde_yaml::from_str(&raw)
        .with_context(|| format!("parsing scenario {}", args.scenario.display()))?;
    let report = run_scenario(&scenario, &LifecycleConfig::from_env())?;
    Ok(serde_json::to_string_pretty(&report)?)
}

/// Run `scenario` against a fresh in-memory stack.
///
/// Only setup failures (duplicate policy keys) abort the run.
pub fn run_scenario(scenario: &Scenario, config: &LifecycleConfig) -> anyhow::Result<ScenarioReport> {
    let stack = LifecycleStack::in_memory(config);
    let mut ids: HashMap<&str, PolicyId> = HashMap::new();

    for spec in &scenario.policies {
        anyhow::ensure!(
            !ids.contains_key(spec.key.as_str()),
            "duplicate policy key {:?}",
            spec.key
        );
        let record = stack
            .service
            .create_policy(HolderId::new(spec.holder.clone()), spec.premium_minor)?;
        ids.insert(spec.key.as_str(), record.id);
    }

    let mut steps = Vec::with_capacity(scenario.steps.len());
    for (index, step) in scenario.steps.iter().enumerate() {
        let outcome = run_step(&stack, &ids, index, step);
        if let Some(err) = &outcome.error {
            tracing::warn!(step = index, policy = %step.policy, code = %err.code, "{}", err.message);
        }
        steps.push(outcome);
    }

    let audit = stack.audit.lock();
    Ok(ScenarioReport {
        steps,
        policies: stack.store.list(),
        notifications: stack.notifications.all(),
        audit: audit.entries().to_vec(),
        audit_chain_valid: audit.verify_chain().is_ok(),
        dashboard: stack.service.dashboard(),
    })
}

fn run_step(
    stack: &LifecycleStack,
    ids: &HashMap<&str, PolicyId>,
    index: usize,
    step: &StepSpec,
) -> StepOutcome {
    let mut outcome = StepOutcome {
        index,
        policy: step.policy.clone(),
        action: step.action.clone(),
        state: None,
        version: None,
        error: None,
    };

    let parsed = parse_step(ids, step);
    let (id, action, roles) = match parsed {
        Ok(p) => p,
        Err(err) => {
            outcome.error = Some(err);
            return outcome;
        }
    };

    match stack
        .service
        .apply_action(id, action, roles, step.reason.as_deref())
    {
        Ok(record) => {
            outcome.state = Some(record.state);
            outcome.version = Some(record.version);
        }
        Err(e) => {
            outcome.error = Some(StepError {
                code: e.code().to_string(),
                message: e.to_string(),
            });
        }
    }
    outcome
}

fn parse_step(
    ids: &HashMap<&str, PolicyId>,
    step: &StepSpec,
) -> Result<(PolicyId, PolicyAction, RoleSet), StepError> {
    let id = *ids.get(step.policy.as_str()).ok_or_else(|| StepError {
        code: "NOT_FOUND".into(),
        message: format!("unknown policy key {:?}", step.policy),
    })?;
    let action: PolicyAction = step.action.parse().map_err(|e: CoreError| StepError {
        code: "VALIDATION_ERROR".into(),
        message: e.to_string(),
    })?;
    let roles = step
        .roles
        .iter()
        .map(|r| r.parse::<Role>())
        .collect::<Result<RoleSet, _>>()
        .map_err(|e| StepError {
            code: "VALIDATION_ERROR".into(),
            message: e.to_string(),
        })?;
    Ok((id, action, roles))
}
