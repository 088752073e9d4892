//! # Startup Wiring
//!
//! Registers the standard listeners and assembles the in-memory stack.
//! All registration happens here, before the dispatcher is wrapped in an
//! `Arc` and handed to the service.

use std::sync::Arc;

use parking_lot::Mutex;

use plc_events::{
    AuditListener, AuditTrail, EventDispatcher, EventName, NotificationListener, NotificationStore,
};
use plc_state::TransitionEngine;

use crate::cache::InMemoryCache;
use crate::claims::ClaimService;
use crate::config::LifecycleConfig;
use crate::governance::ProposalService;
use crate::service::PolicyLifecycleService;
use crate::store::InMemoryPolicyStore;

/// Register the notification listener, then the audit listener, for every
/// event name.
pub fn wire_standard_listeners(
    dispatcher: &mut EventDispatcher,
    notifications: &NotificationStore,
    audit: &Arc<Mutex<AuditTrail>>,
) {
    dispatcher.subscribe_all(
        &EventName::ALL,
        Arc::new(NotificationListener::new(notifications.clone())),
    );
    dispatcher.subscribe_all(&EventName::ALL, Arc::new(AuditListener::new(Arc::clone(audit))));
}

/// A fully wired in-memory lifecycle stack.
///
/// The store, cache, notifications and audit trail are exposed so callers
/// can inspect side effects.
pub struct LifecycleStack {
    pub service: PolicyLifecycleService,
    pub claims: ClaimService,
    pub proposals: ProposalService,
    pub store: InMemoryPolicyStore,
    pub cache: Arc<InMemoryCache>,
    pub notifications: NotificationStore,
    pub audit: Arc<Mutex<AuditTrail>>,
    pub dispatcher: Arc<EventDispatcher>,
}

impl LifecycleStack {
    /// Build the standard stack from `config`.
    pub fn in_memory(config: &LifecycleConfig) -> Self {
        let store = InMemoryPolicyStore::new();
        let cache = Arc::new(InMemoryCache::new());
        let notifications = NotificationStore::new();
        let audit = AuditTrail::shared(config.audit_capacity);

        let mut dispatcher = EventDispatcher::with_slow_threshold(config.slow_listener_threshold);
        wire_standard_listeners(&mut dispatcher, &notifications, &audit);
        let dispatcher = Arc::new(dispatcher);

        let engine = TransitionEngine::standard();
        tracing::info!(
            rules = engine.table().len(),
            events = dispatcher.registered_names().len(),
            dashboard_key = %config.dashboard_cache_key,
            audit_capacity = config.audit_capacity,
            slow_listener_ms = config.slow_listener_threshold.as_millis() as u64,
            "policy lifecycle stack ready"
        );

        let service = PolicyLifecycleService::new(
            engine,
            Arc::new(store.clone()),
            cache.clone(),
            Arc::clone(&dispatcher),
            config,
        );
        let claims = ClaimService::new(Arc::new(store.clone()), Arc::clone(&dispatcher));
        let proposals = ProposalService::new(Arc::clone(&dispatcher));

        Self {
            service,
            claims,
            proposals,
            store,
            cache,
            notifications,
            audit,
            dispatcher,
        }
    }
}

impl Default for LifecycleStack {
    fn default() -> Self {
        Self::in_memory(&LifecycleConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_listener_runs_first_on_every_event() {
        let mut dispatcher = EventDispatcher::new();
        wire_standard_listeners(
            &mut dispatcher,
            &NotificationStore::new(),
            &AuditTrail::shared(10),
        );
        for name in EventName::ALL {
            assert_eq!(
                dispatcher.listener_names(name),
                vec!["notifications", "audit-trail"],
                "{name}"
            );
        }
    }

    #[test]
    fn stack_uses_configured_values() {
        let config = LifecycleConfig {
            dashboard_cache_key: "dash".into(),
            audit_capacity: 5,
            slow_listener_threshold: std::time::Duration::from_millis(7),
        };
        let stack = LifecycleStack::in_memory(&config);
        assert_eq!(stack.dispatcher.slow_threshold(), config.slow_listener_threshold);
        assert_eq!(stack.dispatcher.registered_names(), EventName::ALL.to_vec());

        stack
            .service
            .create_policy(plc_core::HolderId::new("h"), 1)
            .unwrap();
        assert_eq!(stack.cache.invalidation_count("dash"), 1);
        assert_eq!(stack.store.len(), 1);
    }
}
