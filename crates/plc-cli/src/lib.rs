//! # plc-cli — Policy Lifecycle Command-Line Interface
//!
//! ## Subcommands
//!
//! - `table` — print the standard transition table
//! - `actions` — list the actions a role set may take from a state
//! - `run` — execute a YAML lifecycle scenario against the in-memory stack
//!
//! Argument parsing lives here; behaviour lives in the domain crates.
//! Handlers return their output as a `String` so they can be tested without
//! capturing stdout.

pub mod actions;
pub mod scenario;
pub mod table;
