//! # plc-core — Foundational Types for the Policy Lifecycle Stack
//!
//! Every other crate in the workspace depends on `plc-core`; it depends on
//! nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** `PolicyId` and `HolderId` are
//!    distinct types. A holder identifier cannot be passed where a policy
//!    identifier is expected.
//!
//! 2. **Closed role vocabulary.** `Role` is a closed enum and `RoleSet` is a
//!    `Copy` bitset, so guard checks are a single `&` and role sets can be
//!    declared in `const` transition tables.
//!
//! 3. **UTC-only timestamps.** `Timestamp` is UTC with seconds precision.
//!
//! 4. **Digests flow through `CanonicalBytes`.** Audit digests are computed
//!    over JCS-canonical bytes only.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `plc-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod identity;
pub mod role;
pub mod temporal;

pub use canonical::CanonicalBytes;
pub use digest::{sha256_digest, ContentDigest};
pub use error::{CanonicalizationError, CoreError};
pub use identity::{ClaimId, HolderId, PolicyId, ProposalId};
pub use role::{Role, RoleSet};
pub use temporal::Timestamp;
