//! Context owning the set of pollsets in-flight requests need woken.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::poll::pollset::{Pollset, PollsetId};

#[derive(Debug)]
struct Member {
    pollset: Pollset,
    refs: usize,
}

#[derive(Debug, Default)]
struct PollsetSet {
    members: DashMap<PollsetId, Member>,
}

impl PollsetSet {
    fn add(&self, pollset: &Pollset) {
        self.members
            .entry(pollset.id())
            .and_modify(|member| member.refs += 1)
            .or_insert_with(|| Member {
                pollset: pollset.clone(),
                refs: 1,
            });
    }

    fn remove(&self, id: PollsetId) {
        if let Entry::Occupied(mut entry) = self.members.entry(id) {
            entry.get_mut().refs -= 1;
            if entry.get().refs == 0 {
                entry.remove();
            }
        }
    }
}

/// Registry of the pollsets used by one client's in-flight requests.
///
/// Created before issuing requests and destroyed after they complete.
/// Clones share the same set.
#[derive(Debug, Clone, Default)]
pub struct Context {
    set: Arc<PollsetSet>,
}

impl Context {
    /// Create a context with an empty pollset set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tear the context down.
    ///
    /// Requests still in flight keep their own handle on the set, so this
    /// never frees state out from under them; it only reports the misuse.
    pub fn destroy(self) {
        let remaining = self.set.members.len();
        if remaining > 0 {
            tracing::warn!(
                registered_pollsets = remaining,
                "Context destroyed while requests are still in flight"
            );
        }
    }

    /// Add `pollset` to the set for as long as the returned guard lives.
    pub fn register(&self, pollset: &Pollset) -> PollsetRegistration {
        self.set.add(pollset);
        tracing::trace!(pollset = %pollset.id(), "Pollset registered");
        PollsetRegistration {
            set: Arc::clone(&self.set),
            id: pollset.id(),
        }
    }

    /// Whether `id` is currently registered.
    pub fn contains(&self, id: PollsetId) -> bool {
        self.set.members.contains_key(&id)
    }

    /// Number of distinct registered pollsets.
    pub fn len(&self) -> usize {
        self.set.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.members.is_empty()
    }

    /// Kick every registered pollset.
    pub fn kick_all(&self) {
        for member in self.set.members.iter() {
            member.pollset.kick();
        }
    }
}

/// Guard that keeps a pollset registered with a [`Context`].
/// Removes it when dropped.
#[derive(Debug)]
pub struct PollsetRegistration {
    set: Arc<PollsetSet>,
    id: PollsetId,
}

impl Drop for PollsetRegistration {
    fn drop(&mut self) {
        self.set.remove(self.id);
        tracing::trace!(pollset = %self.id, "Pollset deregistered");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_is_balanced() {
        let context = Context::new();
        let pollset = Pollset::new();

        let registration = context.register(&pollset);
        assert!(context.contains(pollset.id()));
        assert_eq!(context.len(), 1);

        drop(registration);
        assert!(!context.contains(pollset.id()));
        assert!(context.is_empty());
    }

    #[test]
    fn shared_pollset_stays_until_last_release() {
        let context = Context::new();
        let pollset = Pollset::new();

        let first = context.register(&pollset);
        let second = context.register(&pollset);
        assert_eq!(context.len(), 1);

        drop(first);
        assert!(context.contains(pollset.id()));

        drop(second);
        assert!(!context.contains(pollset.id()));
    }

    #[test]
    fn distinct_pollsets_tracked_independently() {
        let context = Context::new();
        let a = Pollset::new();
        let b = Pollset::new();

        let reg_a = context.register(&a);
        let _reg_b = context.register(&b);
        assert_eq!(context.len(), 2);

        drop(reg_a);
        assert!(!context.contains(a.id()));
        assert!(context.contains(b.id()));
    }

    #[test]
    fn concurrent_register_and_release() {
        let context = Context::new();
        let pollset = Pollset::new();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let context = context.clone();
                let pollset = pollset.clone();
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        let registration = context.register(&pollset);
                        drop(registration);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert!(context.is_empty());
    }

    #[tokio::test]
    async fn kick_all_wakes_registered() {
        let context = Context::new();
        let pollset = Pollset::new();
        let _registration = context.register(&pollset);

        context.kick_all();
        tokio::time::timeout(std::time::Duration::from_secs(1), pollset.wait())
            .await
            .unwrap();
    }
}
