//! # Policy Lifecycle Service

use std::sync::Arc;

use plc_core::{HolderId, PolicyId, RoleSet, Timestamp};
use plc_events::{DomainEvent, EventDispatcher, PolicyLifecycleEvent};
use plc_state::{PolicyAction, TransitionEngine, TransitionResult};

use crate::analytics::{DashboardStats, HolderStats};
use crate::cache::Cache;
use crate::config::LifecycleConfig;
use crate::error::LifecycleError;
use crate::record::PolicyRecord;
use crate::store::PolicyStore;

/// Orchestrates transitions of stored policy records.
///
/// Holds no per-record state; safe to share across threads.
pub struct PolicyLifecycleService {
    engine: TransitionEngine,
    store: Arc<dyn PolicyStore>,
    cache: Arc<dyn Cache>,
    dispatcher: Arc<EventDispatcher>,
    dashboard_key: String,
}

impl PolicyLifecycleService {
    pub fn new(
        engine: TransitionEngine,
        store: Arc<dyn PolicyStore>,
        cache: Arc<dyn Cache>,
        dispatcher: Arc<EventDispatcher>,
        config: &LifecycleConfig,
    ) -> Self {
        Self {
            engine,
            store,
            cache,
            dispatcher,
            dashboard_key: config.dashboard_cache_key.clone(),
        }
    }

    /// Apply `action` to a stored policy on behalf of an actor holding
    /// `actor_roles`, returning the saved record.
    ///
    /// On success the dashboard cache is invalidated and the lifecycle event
    /// has been delivered to every listener. On failure the record is
    /// unchanged and nothing is published.
    pub fn apply_action(
        &self,
        policy_id: PolicyId,
        action: PolicyAction,
        actor_roles: RoleSet,
        reason: Option<&str>,
    ) -> Result<PolicyRecord, LifecycleError> {
        let mut record = self.store.load(&policy_id)?;

        let result = self
            .engine
            .evaluate(record.state, action, actor_roles, reason, Timestamp::now())
            .map_err(|e| {
                tracing::info!(policy = %policy_id, %action, roles = %actor_roles, error = %e, "transition rejected");
                e
            })?;

        record.apply(&result);
        let saved = self.store.save(record).map_err(|e| {
            tracing::warn!(policy = %policy_id, %action, error = %e, "transition not saved");
            e
        })?;

        self.cache.invalidate(&self.dashboard_key);

        tracing::info!(
            policy = %saved.id,
            from = %result.from,
            to = %result.to,
            %action,
            actor_role = %result.actor_role,
            version = saved.version,
            "policy transitioned"
        );

        let event = DomainEvent::new(PolicyLifecycleEvent::from_transition(
            saved.id,
            saved.holder_id.clone(),
            &result,
            saved.version,
        ));
        self.dispatcher.publish(&event);

        Ok(saved)
    }

    /// Actions the actor may request on this policy now.
    pub fn available_actions(
        &self,
        policy_id: PolicyId,
        actor_roles: RoleSet,
    ) -> Result<Vec<PolicyAction>, LifecycleError> {
        let record = self.store.load(&policy_id)?;
        Ok(self.engine.available_actions(record.state, actor_roles))
    }

    /// Create a policy in `DRAFT`. Creation is not a transition, so no
    /// event is published.
    pub fn create_policy(
        &self,
        holder_id: HolderId,
        premium_minor: u64,
    ) -> Result<PolicyRecord, LifecycleError> {
        let record = self
            .store
            .insert(PolicyRecord::draft(holder_id, premium_minor, Timestamp::now()))?;
        self.cache.invalidate(&self.dashboard_key);
        tracing::info!(policy = %record.id, holder = %record.holder_id, premium_minor, "policy created");
        Ok(record)
    }

    pub fn get_policy(&self, policy_id: PolicyId) -> Result<PolicyRecord, LifecycleError> {
        Ok(self.store.load(&policy_id)?)
    }

    /// Applied transitions, oldest first.
    pub fn transition_history(
        &self,
        policy_id: PolicyId,
    ) -> Result<Vec<TransitionResult>, LifecycleError> {
        Ok(self.store.load(&policy_id)?.transitions)
    }

    /// Portfolio rollup, served from cache until the next change.
    ///
    /// A rollup whose source changed while it was being computed is
    /// returned but not cached.
    pub fn dashboard(&self) -> DashboardStats {
        let generation = self.cache.generation(&self.dashboard_key);
        if let Some(cached) = self.cache.get(&self.dashboard_key) {
            match serde_json::from_value(cached) {
                Ok(stats) => return stats,
                Err(e) => {
                    tracing::warn!(key = %self.dashboard_key, error = %e, "discarding unreadable cached dashboard");
                }
            }
        }

        let stats = DashboardStats::compute(&self.store.list());
        match serde_json::to_value(&stats) {
            Ok(value) => {
                if !self.cache.put(&self.dashboard_key, value, generation) {
                    tracing::debug!(key = %self.dashboard_key, "dashboard invalidated during rollup; not cached");
                }
            }
            Err(e) => tracing::warn!(error = %e, "dashboard not cached"),
        }
        stats
    }

    pub fn holder_stats(&self, holder_id: &HolderId) -> HolderStats {
        HolderStats::compute(holder_id, &self.store.list())
    }

    pub fn engine(&self) -> &TransitionEngine {
        &self.engine
    }
}

impl std::fmt::Debug for PolicyLifecycleService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyLifecycleService")
            .field("rules", &self.engine.table().len())
            .field("dashboard_key", &self.dashboard_key)
            .field("dispatcher", &self.dispatcher)
            .finish()
    }
}
