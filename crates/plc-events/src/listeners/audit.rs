//! # Lifecycle Audit Trail
//!
//! Append-only record of every domain event, kept for review.
//!
//! ## Integrity
//!
//! Each entry's digest is SHA-256 over the JCS-canonical form of its
//! sequence number, event name, payload and the previous entry's digest.
//! Editing any recorded field, or reordering entries, breaks the chain and
//! is reported by [`AuditTrail::verify_chain`].
//!
//! The trail is bounded: past capacity the oldest 10% of entries are
//! trimmed. Verification then starts from the oldest retained entry, whose
//! recorded predecessor digest is taken as given.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use plc_core::{sha256_digest, CanonicalBytes, CanonicalizationError, ContentDigest, PolicyId};

use crate::dispatcher::{Listener, ListenerError};
use crate::event::{DomainEvent, EventName, EventPayload};

/// Default maximum number of retained entries.
pub const DEFAULT_AUDIT_CAPACITY: usize = 10_000;

// ─── Entry ───────────────────────────────────────────────────────────

/// One recorded domain event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Position in the trail since creation. Not reset by trimming.
    pub sequence: u64,
    /// Name of the recorded event.
    pub event: EventName,
    /// The event payload as delivered.
    pub payload: EventPayload,
    /// Digest of the preceding entry, or zero for the first.
    pub previous: ContentDigest,
    /// Digest over this entry's content and `previous`.
    pub digest: ContentDigest,
}

/// Fields covered by an entry's digest.
#[derive(Serialize)]
struct ChainLink<'a> {
    sequence: u64,
    event: EventName,
    payload: &'a EventPayload,
    previous: &'a ContentDigest,
}

fn link_digest(
    sequence: u64,
    event: EventName,
    payload: &EventPayload,
    previous: &ContentDigest,
) -> Result<ContentDigest, CanonicalizationError> {
    let canonical = CanonicalBytes::new(&ChainLink {
        sequence,
        event,
        payload,
        previous,
    })?;
    Ok(sha256_digest(&canonical))
}

impl AuditEntry {
    /// Recompute this entry's digest from its content.
    pub fn compute_digest(&self) -> Result<ContentDigest, CanonicalizationError> {
        link_digest(self.sequence, self.event, &self.payload, &self.previous)
    }
}

// ─── Errors ──────────────────────────────────────────────────────────

/// A detected break in the audit chain.
#[derive(Error, Debug)]
pub enum AuditChainError {
    /// The entry's content no longer matches its recorded digest.
    #[error("audit entry {sequence} digest mismatch")]
    DigestMismatch {
        /// Sequence of the altered entry.
        sequence: u64,
    },

    /// The entry does not point at its predecessor.
    #[error("audit entry {sequence} is not linked to its predecessor")]
    BrokenLink {
        /// Sequence of the unlinked entry.
        sequence: u64,
    },

    /// An entry could not be canonicalized.
    #[error("audit entry canonicalization failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),
}

// ─── Trail ───────────────────────────────────────────────────────────

/// A bounded, hash-chained audit trail.
///
/// Not internally synchronized. The [`AuditListener`] shares it as
/// `Arc<Mutex<AuditTrail>>`.
pub struct AuditTrail {
    entries: Vec<AuditEntry>,
    max_entries: usize,
    next_sequence: u64,
    head: ContentDigest,
}

impl AuditTrail {
    /// An empty trail retaining at most `max_entries` entries.
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Vec::new(),
            max_entries: max_entries.max(1),
            next_sequence: 0,
            head: ContentDigest::ZERO,
        }
    }

    /// An empty trail behind the lock the listener expects.
    pub fn shared(max_entries: usize) -> Arc<Mutex<AuditTrail>> {
        Arc::new(Mutex::new(Self::new(max_entries)))
    }

    /// Record `event` at the head of the chain and return its digest.
    pub fn append(&mut self, event: &DomainEvent) -> Result<ContentDigest, CanonicalizationError> {
        let sequence = self.next_sequence;
        let previous = self.head;
        let digest = link_digest(sequence, event.name(), event.payload(), &previous)?;

        self.entries.push(AuditEntry {
            sequence,
            event: event.name(),
            payload: event.payload().clone(),
            previous,
            digest,
        });
        self.next_sequence += 1;
        self.head = digest;

        if self.entries.len() > self.max_entries {
            let trim_count = (self.max_entries / 10).max(1);
            self.entries.drain(..trim_count);
        }
        Ok(digest)
    }

    /// Check every retained entry's digest and link.
    pub fn verify_chain(&self) -> Result<(), AuditChainError> {
        let mut expected_previous: Option<ContentDigest> = None;
        for entry in &self.entries {
            if let Some(prev) = expected_previous {
                if entry.previous != prev {
                    return Err(AuditChainError::BrokenLink {
                        sequence: entry.sequence,
                    });
                }
            } else if entry.sequence == 0 && entry.previous != ContentDigest::ZERO {
                return Err(AuditChainError::BrokenLink { sequence: 0 });
            }
            if entry.compute_digest()? != entry.digest {
                return Err(AuditChainError::DigestMismatch {
                    sequence: entry.sequence,
                });
            }
            expected_previous = Some(entry.digest);
        }
        Ok(())
    }

    /// Retained entries, oldest first.
    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    /// Retained entries referring to one policy, oldest first. Includes
    /// claims submitted against it.
    pub fn entries_for_policy(&self, policy_id: &PolicyId) -> Vec<&AuditEntry> {
        self.entries
            .iter()
            .filter(|e| e.payload.policy_id().as_ref() == Some(policy_id))
            .collect()
    }

    /// Retained entries for one event name.
    pub fn entries_by_event(&self, event: EventName) -> Vec<&AuditEntry> {
        self.entries.iter().filter(|e| e.event == event).collect()
    }

    /// Digest of the most recent entry, or zero if nothing was recorded.
    pub fn head(&self) -> ContentDigest {
        self.head
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Mutable access to retained entries, for tamper tests.
    #[cfg(test)]
    pub(crate) fn entries_mut(&mut self) -> &mut Vec<AuditEntry> {
        &mut self.entries
    }
}

impl Default for AuditTrail {
    fn default() -> Self {
        Self::new(DEFAULT_AUDIT_CAPACITY)
    }
}

impl std::fmt::Debug for AuditTrail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditTrail")
            .field("entries", &self.entries.len())
            .field("max_entries", &self.max_entries)
            .field("head", &self.head.to_hex())
            .finish()
    }
}

// ─── Listener ────────────────────────────────────────────────────────

/// Appends every delivered event to a shared [`AuditTrail`].
#[derive(Debug, Clone)]
pub struct AuditListener {
    trail: Arc<Mutex<AuditTrail>>,
}

impl AuditListener {
    pub fn new(trail: Arc<Mutex<AuditTrail>>) -> Self {
        Self { trail }
    }
}

impl Listener for AuditListener {
    fn name(&self) -> &str {
        "audit-trail"
    }

    fn handle(&self, event: &DomainEvent) -> Result<(), ListenerError> {
        let digest = self.trail.lock().append(event)?;
        tracing::debug!(event = %event.name(), digest = %digest, "audit entry appended");
        Ok(())
    }
}
