//! # plc-state — Policy Lifecycle State Machine
//!
//! The policy lifecycle is declared as data, not as scattered conditionals:
//! a [`TransitionTable`] of [`TransitionRule`]s, each mapping one
//! `(PolicyState, PolicyAction)` pair to a target state together with the
//! roles allowed to invoke it and whether a reason is mandatory.
//!
//! ## States
//!
//! ```text
//! DRAFT ──issue──▶ ACTIVE ──renew──▶ RENEWED ──renew──▶ RENEWED
//!                    │                  │
//!                    └──expire──▶ EXPIRED ◀──expire──┘
//!                                   │
//!                                   └──renew──▶ RENEWED
//!
//! DRAFT | ACTIVE | RENEWED ──cancel*──▶ CANCELLED (terminal)
//!
//! * reason required
//! ```
//!
//! ## Design
//!
//! An enum with a table-driven engine rather than typestate: the actions
//! arrive at runtime from callers, and the engine must answer
//! "what may this actor do next" by enumerating the table. The table is
//! validated on construction (one rule per pair, non-empty role sets,
//! targets consistent with the action), so an ambiguous lifecycle cannot be
//! built.
//!
//! The engine performs no I/O and takes the evaluation instant as an
//! argument, so identical inputs always produce identical results.

pub mod engine;
pub mod policy;
pub mod table;

pub use engine::{TransitionEngine, TransitionError, TransitionResult};
pub use policy::{PolicyAction, PolicyState};
pub use table::{TableError, TransitionRule, TransitionTable, STANDARD_POLICY_RULES};
