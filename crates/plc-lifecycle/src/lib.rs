//! # plc-lifecycle — Policy Record Lifecycle
//!
//! The only layer that touches both the record store and the event
//! dispatcher. One call to [`PolicyLifecycleService::apply_action`] runs:
//!
//! ```text
//! load ─▶ evaluate ─▶ save (version check) ─▶ invalidate dashboard ─▶ publish
//! ```
//!
//! Any failure before the save leaves the record untouched and publishes
//! nothing. Delivery is synchronous, so every listener has run by the time
//! `apply_action` returns.
//!
//! ## Concurrency
//!
//! Different records never contend. Two writers racing on the same record
//! are serialized by the store's optimistic version check: the second save
//! fails with `ConcurrentModification` and that caller publishes nothing.
//!
//! ## Other Events
//!
//! [`ClaimService`] and [`ProposalService`] publish claim and governance
//! events through the same dispatcher, so one set of listeners notifies
//! users and audits every kind of event.

pub mod analytics;
pub mod bootstrap;
pub mod cache;
pub mod claims;
pub mod config;
pub mod error;
pub mod governance;
pub mod record;
pub mod service;
pub mod store;

pub use analytics::{DashboardStats, HolderStats};
pub use bootstrap::{wire_standard_listeners, LifecycleStack};
pub use cache::{Cache, InMemoryCache};
pub use claims::ClaimService;
pub use config::LifecycleConfig;
pub use error::LifecycleError;
pub use governance::ProposalService;
pub use record::PolicyRecord;
pub use service::PolicyLifecycleService;
pub use store::{InMemoryPolicyStore, PolicyStore, StoreError};
