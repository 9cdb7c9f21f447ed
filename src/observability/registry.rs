//! Diagnostic registry of live objects.
//!
//! # Responsibilities
//! - Give every in-flight request a unique, human-readable entry
//! - Remove the entry exactly once when the request is finalized
//! - Let tests and debug tooling list what is still alive

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

/// Global atomic counter for object IDs.
static OBJECT_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a registered object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(u64);

impl ObjectId {
    fn next() -> Self {
        Self(OBJECT_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "obj-{}", self.0)
    }
}

/// Tracks live objects by name.
#[derive(Debug, Clone, Default)]
pub struct ObjectRegistry {
    live: Arc<DashMap<ObjectId, String>>,
}

impl ObjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a live object. Returns a guard that unregisters on drop.
    pub fn register(&self, name: impl Into<String>) -> ObjectGuard {
        let id = ObjectId::next();
        let name = name.into();
        tracing::trace!(object = %id, name = %name, "Object registered");
        self.live.insert(id, name);
        ObjectGuard {
            live: Arc::clone(&self.live),
            id,
        }
    }

    /// Number of objects currently registered.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Names of the objects currently registered, in no particular order.
    pub fn names(&self) -> Vec<String> {
        self.live.iter().map(|entry| entry.value().clone()).collect()
    }
}

/// Guard for one registered object.
#[derive(Debug)]
pub struct ObjectGuard {
    live: Arc<DashMap<ObjectId, String>>,
    id: ObjectId,
}

impl ObjectGuard {
    pub fn id(&self) -> ObjectId {
        self.id
    }
}

impl Drop for ObjectGuard {
    fn drop(&mut self) {
        self.live.remove(&self.id);
        tracing::trace!(object = %self.id, "Object unregistered");
    }
}
