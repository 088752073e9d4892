//! # End-to-End Policy Lifecycle
//!
//! Drives the wired stack through the service boundary and checks every
//! side effect: stored record, dashboard cache, notifications, audit chain
//! and listener delivery.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};

use plc_core::{ClaimId, HolderId, PolicyId, ProposalId, Role, RoleSet};
use plc_events::{
    listener_fn, AuditTrail, EventDispatcher, EventName, ListenerError, NotificationStore,
    NotificationType,
};
use plc_lifecycle::{
    wire_standard_listeners, InMemoryCache, InMemoryPolicyStore, LifecycleConfig, LifecycleError,
    LifecycleStack, PolicyLifecycleService, PolicyRecord, PolicyStore, StoreError,
};
use plc_state::{PolicyAction, PolicyState, TransitionEngine, TransitionError};

const DASHBOARD: &str = "analytics_dashboard";

fn roles(list: &[Role]) -> RoleSet {
    RoleSet::of(list)
}

#[test]
fn issue_draft_as_agent() {
    let stack = LifecycleStack::default();
    let holder = HolderId::new("user-42");
    let id = stack.service.create_policy(holder.clone(), 15_000).unwrap().id;
    let invalidations_before = stack.cache.invalidation_count(DASHBOARD);

    let record = stack
        .service
        .apply_action(id, PolicyAction::Issue, roles(&[Role::Agent]), None)
        .unwrap();

    assert_eq!(record.state, PolicyState::Active);
    assert_eq!(record.version, 1);
    assert_eq!(stack.cache.invalidation_count(DASHBOARD), invalidations_before + 1);

    let notes = stack.notifications.for_user(&holder);
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].kind, NotificationType::Policy);
    assert_eq!(notes[0].title, "Policy Issued");
    assert!(notes[0].message.contains(&id.as_uuid().to_string()));

    let audit = stack.audit.lock();
    assert_eq!(audit.len(), 1);
    assert_eq!(audit.entries()[0].event, EventName::PolicyIssued);
    assert_eq!(audit.entries()[0].payload.as_policy().map(|p| p.version), Some(1));
    audit.verify_chain().unwrap();
}

#[test]
fn cancel_without_reason_changes_nothing() {
    let stack = LifecycleStack::default();
    let holder = HolderId::new("user-7");
    let id = stack.service.create_policy(holder.clone(), 5_000).unwrap().id;
    stack
        .service
        .apply_action(id, PolicyAction::Issue, roles(&[Role::Agent]), None)
        .unwrap();
    let notes_before = stack.notifications.for_user(&holder).len();
    let audit_before = stack.audit.lock().len();
    let invalidations_before = stack.cache.invalidation_count(DASHBOARD);

    let err = stack
        .service
        .apply_action(id, PolicyAction::Cancel, roles(&[Role::Agent]), None)
        .unwrap_err();

    assert_eq!(
        err,
        LifecycleError::Transition(TransitionError::MissingReason {
            from: PolicyState::Active,
            action: PolicyAction::Cancel,
        })
    );
    assert_eq!(err.code(), "MISSING_REASON");
    let record = stack.service.get_policy(id).unwrap();
    assert_eq!(record.state, PolicyState::Active);
    assert_eq!(record.version, 1);
    assert_eq!(stack.notifications.for_user(&holder).len(), notes_before);
    assert_eq!(stack.audit.lock().len(), audit_before);
    assert_eq!(stack.cache.invalidation_count(DASHBOARD), invalidations_before);
}

#[test]
fn full_lifecycle_notifies_each_step() {
    let stack = LifecycleStack::default();
    let holder = HolderId::new("user-9");
    let id = stack.service.create_policy(holder.clone(), 2_000).unwrap().id;
    let svc = &stack.service;

    svc.apply_action(id, PolicyAction::Issue, roles(&[Role::Underwriter]), None).unwrap();
    svc.apply_action(id, PolicyAction::Renew, roles(&[Role::Customer]), None).unwrap();
    svc.apply_action(id, PolicyAction::Expire, roles(&[Role::System]), None).unwrap();
    svc.apply_action(id, PolicyAction::Renew, roles(&[Role::Agent]), None).unwrap();
    let last = svc
        .apply_action(id, PolicyAction::Cancel, roles(&[Role::Admin]), Some("  Fraud detected "))
        .unwrap();

    assert_eq!(last.state, PolicyState::Cancelled);
    assert_eq!(last.version, 5);
    assert_eq!(last.transitions.len(), 5);

    let titles: Vec<_> = stack
        .notifications
        .for_user(&holder)
        .into_iter()
        .map(|n| n.title)
        .collect();
    assert_eq!(
        titles,
        vec![
            "Policy Issued",
            "Policy Renewed",
            "Policy Expired",
            "Policy Renewed",
            "Policy Cancelled"
        ]
    );
    let notes = stack.notifications.for_user(&holder);
    assert!(notes[2].message.contains("renew"));
    assert!(notes[4].message.contains("Reason: Fraud detected"));

    let audit = stack.audit.lock();
    let versions: Vec<_> = audit
        .entries_for_policy(&id)
        .iter()
        .filter_map(|e| e.payload.as_policy().map(|p| p.version))
        .collect();
    assert_eq!(versions, vec![1, 2, 3, 4, 5]);
    audit.verify_chain().unwrap();
    drop(audit);

    let err = svc
        .apply_action(id, PolicyAction::Renew, roles(&[Role::Admin]), None)
        .unwrap_err();
    assert_eq!(err.code(), "ILLEGAL_TRANSITION");
    assert!(svc.available_actions(id, roles(&[Role::Admin])).unwrap().is_empty());
}

#[test]
fn unauthorized_role_is_rejected_without_side_effects() {
    let stack = LifecycleStack::default();
    let id = stack.service.create_policy(HolderId::new("u"), 1).unwrap().id;
    stack
        .service
        .apply_action(id, PolicyAction::Issue, roles(&[Role::Agent]), None)
        .unwrap();

    let err = stack
        .service
        .apply_action(id, PolicyAction::Expire, roles(&[Role::Customer, Role::Agent]), None)
        .unwrap_err();

    assert_eq!(err.code(), "UNAUTHORIZED");
    assert!(!err.is_retryable());
    assert_eq!(stack.service.get_policy(id).unwrap().state, PolicyState::Active);
    assert_eq!(stack.audit.lock().len(), 1);
}

#[test]
fn dashboard_tracks_portfolio() {
    let stack = LifecycleStack::default();
    let a = stack.service.create_policy(HolderId::new("a"), 1_000).unwrap().id;
    let b = stack.service.create_policy(HolderId::new("b"), 3_000).unwrap().id;
    stack.service.create_policy(HolderId::new("c"), 9_000).unwrap();

    let agent = roles(&[Role::Agent]);
    stack.service.apply_action(a, PolicyAction::Issue, agent, None).unwrap();
    stack.service.apply_action(b, PolicyAction::Issue, agent, None).unwrap();
    stack.service.apply_action(b, PolicyAction::Renew, agent, None).unwrap();

    let stats = stack.service.dashboard();
    assert_eq!(stats.total_policies, 3);
    assert_eq!(stats.active_policies, 2);
    assert_eq!(stats.total_active_premium_minor, 4_000);
    assert_eq!(stats.by_state[&PolicyState::Draft], 1);
    assert_eq!(stats.by_state[&PolicyState::Renewed], 1);
    assert!(stack.cache.contains(DASHBOARD));

    stack
        .service
        .apply_action(a, PolicyAction::Expire, roles(&[Role::System]), None)
        .unwrap();
    assert!(!stack.cache.contains(DASHBOARD));
    assert_eq!(stack.service.dashboard().active_policies, 1);
}

#[test]
fn failing_listener_does_not_fail_the_transition() {
    let notifications = NotificationStore::new();
    let audit = AuditTrail::shared(100);
    let mut dispatcher = EventDispatcher::new();
    dispatcher.subscribe(
        EventName::PolicyIssued,
        listener_fn("flaky-mailer", |_| Err(ListenerError::Failed("smtp unavailable".into()))),
    );
    dispatcher.subscribe(
        EventName::PolicyIssued,
        listener_fn("buggy", |_| panic!("listener bug")),
    );
    wire_standard_listeners(&mut dispatcher, &notifications, &audit);

    let service = PolicyLifecycleService::new(
        TransitionEngine::standard(),
        Arc::new(InMemoryPolicyStore::new()),
        Arc::new(InMemoryCache::new()),
        Arc::new(dispatcher),
        &LifecycleConfig::default(),
    );
    let holder = HolderId::new("h");
    let id = service.create_policy(holder.clone(), 10).unwrap().id;

    let record = service
        .apply_action(id, PolicyAction::Issue, roles(&[Role::Agent]), None)
        .unwrap();

    assert_eq!(record.state, PolicyState::Active);
    assert_eq!(notifications.for_user(&holder).len(), 1);
    assert_eq!(audit.lock().len(), 1);
}

// ─── Concurrency ─────────────────────────────────────────────────────

/// Holds every armed `load` at a barrier so both writers read the same
/// version before either saves.
struct RendezvousStore {
    inner: InMemoryPolicyStore,
    armed: AtomicBool,
    barrier: Barrier,
}

impl PolicyStore for RendezvousStore {
    fn load(&self, id: &PolicyId) -> Result<PolicyRecord, StoreError> {
        let record = self.inner.load(id);
        if self.armed.load(Ordering::SeqCst) {
            self.barrier.wait();
        }
        record
    }

    fn save(&self, record: PolicyRecord) -> Result<PolicyRecord, StoreError> {
        self.inner.save(record)
    }

    fn insert(&self, record: PolicyRecord) -> Result<PolicyRecord, StoreError> {
        self.inner.insert(record)
    }

    fn list(&self) -> Vec<PolicyRecord> {
        self.inner.list()
    }
}

#[test]
fn concurrent_renewals_have_exactly_one_winner() {
    let store = Arc::new(RendezvousStore {
        inner: InMemoryPolicyStore::new(),
        armed: AtomicBool::new(false),
        barrier: Barrier::new(2),
    });
    let renewals = Arc::new(AtomicUsize::new(0));
    let notifications = NotificationStore::new();
    let audit = AuditTrail::shared(100);

    let mut dispatcher = EventDispatcher::new();
    wire_standard_listeners(&mut dispatcher, &notifications, &audit);
    let counter = Arc::clone(&renewals);
    dispatcher.subscribe(
        EventName::PolicyRenewed,
        listener_fn("renewal-counter", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }),
    );

    let service = PolicyLifecycleService::new(
        TransitionEngine::standard(),
        store.clone(),
        Arc::new(InMemoryCache::new()),
        Arc::new(dispatcher),
        &LifecycleConfig::default(),
    );
    let holder = HolderId::new("racer");
    let id = service.create_policy(holder.clone(), 700).unwrap().id;
    service
        .apply_action(id, PolicyAction::Issue, roles(&[Role::Agent]), None)
        .unwrap();

    store.armed.store(true, Ordering::SeqCst);
    let outcomes: Vec<Result<PolicyRecord, LifecycleError>> = std::thread::scope(|s| {
        let handles: Vec<_> = [Role::Customer, Role::Agent]
            .into_iter()
            .map(|role| {
                let service = &service;
                s.spawn(move || {
                    service.apply_action(id, PolicyAction::Renew, RoleSet::single(role), None)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("renewal thread panicked"))
            .collect()
    });
    store.armed.store(false, Ordering::SeqCst);

    let winners: Vec<_> = outcomes.iter().filter_map(|o| o.as_ref().ok()).collect();
    let losers: Vec<_> = outcomes.iter().filter_map(|o| o.as_ref().err()).collect();
    assert_eq!(winners.len(), 1);
    assert_eq!(losers.len(), 1);
    assert_eq!(
        losers[0],
        &LifecycleError::ConcurrentModification {
            id,
            expected: 1,
            found: 2,
        }
    );
    assert!(losers[0].is_retryable());
    assert_eq!(losers[0].code(), "CONFLICT");

    assert_eq!(winners[0].version, 2);
    assert_eq!(renewals.load(Ordering::SeqCst), 1);
    assert_eq!(
        notifications
            .for_user(&holder)
            .iter()
            .filter(|n| n.title == "Policy Renewed")
            .count(),
        1
    );
    let stored = service.get_policy(id).unwrap();
    assert_eq!(stored.state, PolicyState::Renewed);
    assert_eq!(stored.transitions.len(), 2);
}

#[test]
fn writers_on_different_policies_do_not_conflict() {
    let stack = LifecycleStack::default();
    let ids: Vec<PolicyId> = (0..8)
        .map(|i| {
            stack
                .service
                .create_policy(HolderId::new(format!("holder-{i}")), 100)
                .unwrap()
                .id
        })
        .collect();

    std::thread::scope(|s| {
        for id in &ids {
            let service = &stack.service;
            s.spawn(move || {
                service
                    .apply_action(*id, PolicyAction::Issue, RoleSet::single(Role::Agent), None)
                    .unwrap();
                service
                    .apply_action(*id, PolicyAction::Renew, RoleSet::single(Role::Customer), None)
                    .unwrap();
            });
        }
    });

    for id in &ids {
        assert_eq!(stack.service.get_policy(*id).unwrap().version, 2);
    }
    assert_eq!(stack.notifications.len(), 16);
    let audit = stack.audit.lock();
    assert_eq!(audit.len(), 16);
    audit.verify_chain().unwrap();
}

/// Parks the first armed `list` after it has taken its snapshot, so a
/// transition can land while the dashboard rollup is still in flight.
struct PausedListStore {
    inner: InMemoryPolicyStore,
    armed: AtomicBool,
    snapshot_taken: Barrier,
    resume: Barrier,
}

impl PolicyStore for PausedListStore {
    fn load(&self, id: &PolicyId) -> Result<PolicyRecord, StoreError> {
        self.inner.load(id)
    }

    fn save(&self, record: PolicyRecord) -> Result<PolicyRecord, StoreError> {
        self.inner.save(record)
    }

    fn insert(&self, record: PolicyRecord) -> Result<PolicyRecord, StoreError> {
        self.inner.insert(record)
    }

    fn list(&self) -> Vec<PolicyRecord> {
        let snapshot = self.inner.list();
        if self.armed.swap(false, Ordering::SeqCst) {
            self.snapshot_taken.wait();
            self.resume.wait();
        }
        snapshot
    }
}

#[test]
fn dashboard_rollup_racing_a_transition_is_not_cached() {
    let store = Arc::new(PausedListStore {
        inner: InMemoryPolicyStore::new(),
        armed: AtomicBool::new(false),
        snapshot_taken: Barrier::new(2),
        resume: Barrier::new(2),
    });
    let cache = Arc::new(InMemoryCache::new());
    let service = PolicyLifecycleService::new(
        TransitionEngine::standard(),
        store.clone(),
        cache.clone(),
        Arc::new(EventDispatcher::new()),
        &LifecycleConfig::default(),
    );
    let id = service.create_policy(HolderId::new("h"), 2_500).unwrap().id;

    store.armed.store(true, Ordering::SeqCst);
    let in_flight = std::thread::scope(|s| {
        let rollup = s.spawn(|| service.dashboard());

        store.snapshot_taken.wait();
        service
            .apply_action(id, PolicyAction::Issue, roles(&[Role::Agent]), None)
            .unwrap();
        store.resume.wait();

        rollup.join().expect("dashboard thread panicked")
    });

    assert_eq!(in_flight.active_policies, 0);
    assert!(!cache.contains(DASHBOARD));

    let after = service.dashboard();
    assert_eq!(after.active_policies, 1);
    assert_eq!(after.total_active_premium_minor, 2_500);
    assert!(cache.contains(DASHBOARD));
    assert_eq!(service.dashboard(), after);
}

// ─── Claims and Proposals ────────────────────────────────────────────

#[test]
fn claim_policy_and_proposal_events_reach_their_users() {
    let stack = LifecycleStack::default();
    let alice = HolderId::new("user-1");
    let bob = HolderId::new("user-2");
    let id = stack.service.create_policy(alice.clone(), 40_000).unwrap().id;
    stack
        .service
        .apply_action(id, PolicyAction::Issue, roles(&[Role::Agent]), None)
        .unwrap();

    let claim = ClaimId::new("claim-1");
    stack.claims.submit_claim(claim.clone(), id).unwrap();
    stack
        .claims
        .reject_claim(claim.clone(), alice.clone(), "Insufficient documentation");
    stack.claims.settle_claim(ClaimId::new("claim-2"), alice.clone(), 150_050);
    stack
        .proposals
        .create_proposal(ProposalId::new("proposal-001"), bob.clone(), "Increase Coverage Limit");
    stack
        .proposals
        .finalize_proposal(ProposalId::new("proposal-001"), bob.clone(), false);

    let alice_notes: Vec<_> = stack
        .notifications
        .for_user(&alice)
        .into_iter()
        .map(|n| (n.kind, n.title))
        .collect();
    assert_eq!(
        alice_notes,
        vec![
            (NotificationType::Policy, "Policy Issued".to_string()),
            (NotificationType::Claim, "Claim Submitted".to_string()),
            (NotificationType::Claim, "Claim Rejected".to_string()),
            (NotificationType::Claim, "Claim Settled".to_string()),
        ]
    );
    let bob_notes = stack.notifications.for_user(&bob);
    assert_eq!(bob_notes.len(), 2);
    assert!(bob_notes.iter().all(|n| n.kind == NotificationType::Dao));
    assert!(bob_notes[1].message.contains("did not pass"));

    let audit = stack.audit.lock();
    assert_eq!(audit.len(), 6);
    let for_policy: Vec<_> = audit.entries_for_policy(&id).iter().map(|e| e.event).collect();
    assert_eq!(for_policy, vec![EventName::PolicyIssued, EventName::ClaimSubmitted]);
    audit.verify_chain().unwrap();
    drop(audit);

    assert_eq!(stack.service.get_policy(id).unwrap().version, 1);
}
