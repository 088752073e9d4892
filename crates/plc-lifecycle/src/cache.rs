//! # Cache
//!
//! Key/value cache for derived read models. The lifecycle service only
//! invalidates; the dashboard rollup reads and fills.
//!
//! ## Generations
//!
//! Every key carries a generation that each invalidation bumps. A filler
//! reads the generation before it reads the source data and passes it back
//! to [`Cache::put`]; the value is stored only if no invalidation happened
//! in between. A rollup computed from data that changed mid-computation is
//! therefore never written over the invalidation that announced the change.

use std::collections::HashMap;

use parking_lot::RwLock;
use serde_json::Value;

/// Cache boundary. Invalidation is fire-and-forget.
pub trait Cache: Send + Sync {
    /// Drop `key` if present and bump its generation.
    fn invalidate(&self, key: &str);

    /// The cached value for `key`.
    fn get(&self, key: &str) -> Option<Value>;

    /// Current generation of `key`. Zero until first invalidated.
    fn generation(&self, key: &str) -> u64;

    /// Store `value` under `key` if its generation is still `observed`.
    ///
    /// Returns `false`, storing nothing, when `key` was invalidated after
    /// `observed` was read.
    fn put(&self, key: &str, value: Value, observed: u64) -> bool;
}

#[derive(Debug, Default)]
struct Slots {
    entries: HashMap<String, Value>,
    generations: HashMap<String, u64>,
}

impl Slots {
    fn generation(&self, key: &str) -> u64 {
        self.generations.get(key).copied().unwrap_or(0)
    }
}

/// In-memory [`Cache`]. The generation doubles as the per-key
/// invalidation count.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    slots: RwLock<Slots>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times `key` has been invalidated.
    pub fn invalidation_count(&self, key: &str) -> u64 {
        self.slots.read().generation(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.slots.read().entries.contains_key(key)
    }
}

impl Cache for InMemoryCache {
    fn invalidate(&self, key: &str) {
        let mut slots = self.slots.write();
        slots.entries.remove(key);
        *slots.generations.entry(key.to_string()).or_insert(0) += 1;
        tracing::debug!(key, generation = slots.generation(key), "cache invalidated");
    }

    fn get(&self, key: &str) -> Option<Value> {
        self.slots.read().entries.get(key).cloned()
    }

    fn generation(&self, key: &str) -> u64 {
        self.slots.read().generation(key)
    }

    fn put(&self, key: &str, value: Value, observed: u64) -> bool {
        let mut slots = self.slots.write();
        let current = slots.generation(key);
        if current != observed {
            tracing::debug!(key, observed, current, "stale cache fill dropped");
            return false;
        }
        slots.entries.insert(key.to_string(), value);
        true
    }
}
