//! # plc-events — Domain Events
//!
//! Decouples the side effects of a business action from the action itself.
//! The lifecycle service builds one immutable [`DomainEvent`] per
//! successful policy transition, and the claim and proposal services one
//! per step they record. Each goes to the [`EventDispatcher`], which
//! delivers it synchronously to every [`Listener`] registered for that
//! event's name.
//!
//! ## Delivery Guarantees
//!
//! - Exact-name matching only. There are no wildcard subscriptions.
//! - Registration order is delivery order.
//! - A listener that returns an error or panics is logged and skipped; the
//!   remaining listeners still run and the publisher never sees the failure.
//! - At most once per `publish`. No retry, no deduplication, no replay.
//!
//! Registration requires `&mut EventDispatcher`, so the listener set is
//! fixed once the dispatcher is shared behind an `Arc`.

pub mod dispatcher;
pub mod event;
pub mod listeners;

pub use dispatcher::{
    listener_fn, EventDispatcher, Listener, ListenerError, DEFAULT_SLOW_LISTENER_THRESHOLD,
};
pub use event::{
    ClaimEvent, DomainEvent, EventName, EventPayload, PolicyLifecycleEvent, ProposalEvent,
};
pub use listeners::audit::{
    AuditChainError, AuditEntry, AuditListener, AuditTrail, DEFAULT_AUDIT_CAPACITY,
};
pub use listeners::notification::{
    Notification, NotificationListener, NotificationStore, NotificationType,
};
