//! Pollset handles.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

/// Global atomic counter for pollset IDs.
/// Relaxed ordering is enough; IDs only need to be unique.
static POLLSET_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a pollset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PollsetId(u64);

impl PollsetId {
    fn next() -> Self {
        Self(POLLSET_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for PollsetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "pollset-{}", self.0)
    }
}

/// A readiness multiplexer a worker can wait on.
///
/// Clones share the same wake-up state.
#[derive(Debug, Clone)]
pub struct Pollset {
    id: PollsetId,
    notify: Arc<Notify>,
}

impl Pollset {
    pub fn new() -> Self {
        Self {
            id: PollsetId::next(),
            notify: Arc::new(Notify::new()),
        }
    }

    pub fn id(&self) -> PollsetId {
        self.id
    }

    /// Wake one waiter, or the next one to call [`Pollset::wait`].
    pub fn kick(&self) {
        self.notify.notify_one();
    }

    /// Wait until the pollset is kicked.
    pub async fn wait(&self) {
        self.notify.notified().await;
    }
}

impl Default for Pollset {
    fn default() -> Self {
        Self::new()
    }
}
