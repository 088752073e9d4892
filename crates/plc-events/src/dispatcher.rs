//! # Event Dispatcher
//!
//! Synchronous in-process publish/subscribe keyed by [`EventName`].
//! Each listener runs inside its own failure boundary: errors and panics are
//! logged with the event and listener names and then dropped.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;

use plc_core::CanonicalizationError;

use crate::event::{DomainEvent, EventName};

/// Default threshold above which a listener is reported as slow.
pub const DEFAULT_SLOW_LISTENER_THRESHOLD: Duration = Duration::from_millis(250);

// ─── Listener ────────────────────────────────────────────────────────

/// Failure of a single listener. Never reaches the publisher.
#[derive(Error, Debug)]
pub enum ListenerError {
    /// The listener could not perform its side effect.
    #[error("listener failed: {0}")]
    Failed(String),

    /// The event could not be canonicalized for digesting.
    #[error("canonicalization failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),
}

/// A consumer of domain events.
pub trait Listener: Send + Sync {
    /// Name used in diagnostics.
    fn name(&self) -> &str;

    /// Perform this listener's side effect for `event`.
    fn handle(&self, event: &DomainEvent) -> Result<(), ListenerError>;
}

/// A [`Listener`] backed by a closure.
struct FnListener<F> {
    name: String,
    f: F,
}

impl<F> Listener for FnListener<F>
where
    F: Fn(&DomainEvent) -> Result<(), ListenerError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn handle(&self, event: &DomainEvent) -> Result<(), ListenerError> {
        (self.f)(event)
    }
}

/// Adapt a closure into a named listener.
pub fn listener_fn<F>(name: impl Into<String>, f: F) -> Arc<dyn Listener>
where
    F: Fn(&DomainEvent) -> Result<(), ListenerError> + Send + Sync + 'static,
{
    Arc::new(FnListener {
        name: name.into(),
        f,
    })
}

// ─── Dispatcher ──────────────────────────────────────────────────────

/// Registry of listeners per event name.
pub struct EventDispatcher {
    listeners: HashMap<EventName, Vec<Arc<dyn Listener>>>,
    slow_threshold: Duration,
}

impl EventDispatcher {
    /// An empty dispatcher with the default slow-listener threshold.
    pub fn new() -> Self {
        Self::with_slow_threshold(DEFAULT_SLOW_LISTENER_THRESHOLD)
    }

    /// An empty dispatcher reporting listeners slower than `threshold`.
    pub fn with_slow_threshold(threshold: Duration) -> Self {
        Self {
            listeners: HashMap::new(),
            slow_threshold: threshold,
        }
    }

    /// Register `listener` for `name`. Delivery follows registration order.
    pub fn subscribe(&mut self, name: EventName, listener: Arc<dyn Listener>) {
        tracing::debug!(event = %name, listener = listener.name(), "listener registered");
        self.listeners.entry(name).or_default().push(listener);
    }

    /// Register one listener for several names.
    pub fn subscribe_all(&mut self, names: &[EventName], listener: Arc<dyn Listener>) {
        for name in names {
            self.subscribe(*name, Arc::clone(&listener));
        }
    }

    /// Deliver `event` to every listener registered for its name.
    ///
    /// Listeners run on the caller's thread, one after another. The slow
    /// threshold is only checked once a listener returns: nothing here can
    /// preempt one, so a listener that never returns blocks this call, and
    /// the `apply_action` that published, indefinitely. Listeners doing
    /// I/O must bound it themselves.
    pub fn publish(&self, event: &DomainEvent) {
        let name = event.name();
        let Some(listeners) = self.listeners.get(&name) else {
            tracing::debug!(event = %name, "no listeners registered");
            return;
        };

        for listener in listeners {
            let started = Instant::now();
            let outcome = catch_unwind(AssertUnwindSafe(|| listener.handle(event)));
            let elapsed = started.elapsed();

            match outcome {
                Ok(Ok(())) => {
                    tracing::debug!(event = %name, listener = listener.name(), "listener completed");
                }
                Ok(Err(e)) => {
                    tracing::warn!(
                        event = %name,
                        listener = listener.name(),
                        error = %e,
                        "listener failed"
                    );
                }
                Err(panic) => {
                    tracing::warn!(
                        event = %name,
                        listener = listener.name(),
                        panic = panic_message(panic.as_ref()),
                        "listener panicked"
                    );
                }
            }

            if elapsed > self.slow_threshold {
                tracing::warn!(
                    event = %name,
                    listener = listener.name(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    threshold_ms = self.slow_threshold.as_millis() as u64,
                    "slow listener"
                );
            }
        }
    }

    /// Number of listeners registered for `name`.
    pub fn listener_count(&self, name: EventName) -> usize {
        self.listeners.get(&name).map_or(0, Vec::len)
    }

    /// Names with at least one listener, in [`EventName::ALL`] order.
    pub fn registered_names(&self) -> Vec<EventName> {
        EventName::ALL
            .into_iter()
            .filter(|n| self.listener_count(*n) > 0)
            .collect()
    }

    /// Listener names registered for `name`, in delivery order.
    pub fn listener_names(&self, name: EventName) -> Vec<String> {
        self.listeners
            .get(&name)
            .map(|ls| ls.iter().map(|l| l.name().to_string()).collect())
            .unwrap_or_default()
    }

    /// The slow-listener threshold.
    pub fn slow_threshold(&self) -> Duration {
        self.slow_threshold
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: Vec<_> = self
            .registered_names()
            .into_iter()
            .map(|n| (n.as_str(), self.listener_count(n)))
            .collect();
        f.debug_struct("EventDispatcher")
            .field("listeners", &counts)
            .field("slow_threshold", &self.slow_threshold)
            .finish()
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
