//! Listener registry: event key to a sorted, immutable snapshot of bindings.

use dashmap::{DashMap, mapref::entry::Entry};
use skitter_core::{EventKey, HandlerId, Invoker, OwnerId, Preference};
use std::{cmp::Reverse, fmt, sync::Arc};

/// A bucket snapshot. Replaced, never mutated, so dispatch iterates it
/// without holding a lock.
pub(crate) type Bucket = Arc<[Arc<Binding>]>;

/// One listener instance bound to one handler for one event type.
pub(crate) struct Binding {
    pub(crate) owner: OwnerId,
    pub(crate) handler: HandlerId,
    pub(crate) key: EventKey,
    pub(crate) preference: Preference,
    pub(crate) priority: i32,
    pub(crate) cancelable: bool,
    pub(crate) invoker: Arc<dyn Invoker>,
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("owner", &self.owner)
            .field("handler", &self.handler)
            .field("key", &self.key)
            .field("preference", &self.preference)
            .field("priority", &self.priority)
            .field("cancelable", &self.cancelable)
            .finish()
    }
}

#[derive(Default)]
pub(crate) struct Registry {
    buckets: DashMap<EventKey, Bucket>,
}

impl Registry {
    /// Insert `binding` into its bucket, keeping the bucket sorted by
    /// priority (descending, stable).
    ///
    /// Returns `false` without inserting if the bucket already holds a
    /// binding for the same owner and handler.
    pub(crate) fn insert(&self, binding: Binding) -> bool {
        match self.buckets.entry(binding.key) {
            Entry::Occupied(mut entry) => {
                let duplicate = entry
                    .get()
                    .iter()
                    .any(|b| b.owner == binding.owner && b.handler == binding.handler);
                if duplicate {
                    return false;
                }
                let mut bindings = entry.get().to_vec();
                bindings.push(Arc::new(binding));
                bindings.sort_by_key(|b| Reverse(b.priority));
                entry.insert(bindings.into());
            }
            Entry::Vacant(entry) => {
                entry.insert(Arc::from(vec![Arc::new(binding)]));
            }
        }
        true
    }

    /// The current bindings for `key`, if any.
    pub(crate) fn snapshot(&self, key: EventKey) -> Option<Bucket> {
        self.buckets
            .get(&key)
            .map(|bucket| Arc::clone(bucket.value()))
            .filter(|bucket| !bucket.is_empty())
    }

    /// Remove every binding matching `predicate`; drops emptied buckets.
    pub(crate) fn remove_where(&self, predicate: impl Fn(&Binding) -> bool) -> usize {
        // Collect first: `entry` on a key whose shard is read-locked by an
        // iterator would deadlock.
        let keys: Vec<EventKey> = self.buckets.iter().map(|bucket| *bucket.key()).collect();

        let mut removed = 0;
        for key in keys {
            let Entry::Occupied(mut entry) = self.buckets.entry(key) else {
                continue;
            };
            let kept: Vec<Arc<Binding>> = entry
                .get()
                .iter()
                .filter(|b| !predicate(b))
                .cloned()
                .collect();
            let count = entry.get().len() - kept.len();
            if count == 0 {
                continue;
            }
            removed += count;
            if kept.is_empty() {
                entry.remove();
            } else {
                entry.insert(kept.into());
            }
        }
        removed
    }

    pub(crate) fn remove_owner(&self, owner: OwnerId) -> usize {
        self.remove_where(|b| b.owner == owner)
    }

    /// Remove bindings whose weakly held owner is gone.
    pub(crate) fn sweep(&self) -> usize {
        self.remove_where(|b| !b.invoker.is_alive())
    }

    pub(crate) fn contains_owner(&self, owner: OwnerId) -> bool {
        self.buckets
            .iter()
            .any(|bucket| bucket.value().iter().any(|b| b.owner == owner))
    }

    pub(crate) fn count(&self, key: EventKey) -> usize {
        self.buckets.get(&key).map_or(0, |bucket| bucket.len())
    }

    pub(crate) fn len(&self) -> usize {
        self.buckets.iter().map(|bucket| bucket.len()).sum()
    }

    pub(crate) fn clear(&self) {
        self.buckets.clear();
    }
}
