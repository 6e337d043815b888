// ── Canonical device store ──
//
// Wholesale-replacement storage with push-based change notification via
// a `watch` channel, plus an explicit last-write-wins guard for
// overlapping polls.
//
// Polls are allowed to race: a poll in flight when the next tick fires
// is not cancelled, and responses may land out of order. Every poll
// takes a sequence number up front; a result is applied only if nothing
// newer has been applied since. This makes "last response wins" a
// checked invariant instead of call-order luck.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;

use crate::model::{Device, DeviceCollection, DeviceId};

/// The single authoritative device collection.
pub struct DeviceStore {
    snapshot: watch::Sender<Arc<DeviceCollection>>,
    next_seq: AtomicU64,
    /// Sequence number of the last applied outcome. Guarded by a lock
    /// so the compare and the publish are one atomic step.
    applied_seq: Mutex<u64>,
}

impl Default for DeviceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceStore {
    /// Create an empty store. The collection stays empty until the
    /// first successful poll is applied.
    pub fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(DeviceCollection::new()));
        Self {
            snapshot,
            next_seq: AtomicU64::new(1),
            applied_seq: Mutex::new(0),
        }
    }

    /// Allocate the sequence number for a poll about to start.
    pub fn begin_poll(&self) -> u64 {
        self.next_seq.fetch_add(1, Ordering::Relaxed)
    }

    /// Wholesale-replace the collection with a poll result.
    ///
    /// Returns `false` (and changes nothing) if an outcome with a newer
    /// sequence number has already been applied — the stale response
    /// lost the race.
    pub fn apply(&self, seq: u64, devices: Vec<Device>) -> bool {
        self.publish(seq, devices.into_iter().collect())
    }

    /// Clear the collection after a failed poll, under the same
    /// last-write-wins guard.
    pub fn clear(&self, seq: u64) -> bool {
        self.publish(seq, DeviceCollection::new())
    }

    fn publish(&self, seq: u64, collection: DeviceCollection) -> bool {
        let mut applied = self.applied_seq.lock().expect("store lock poisoned");
        if seq <= *applied {
            return false;
        }
        *applied = seq;
        // send_modify updates unconditionally, even with zero receivers.
        self.snapshot
            .send_modify(|snap| *snap = Arc::new(collection));
        true
    }

    /// Current collection (cheap `Arc` clone).
    pub fn snapshot(&self) -> Arc<DeviceCollection> {
        self.snapshot.borrow().clone()
    }

    /// Subscribe to collection changes.
    pub fn subscribe(&self) -> watch::Receiver<Arc<DeviceCollection>> {
        self.snapshot.subscribe()
    }

    pub fn get(&self, id: &DeviceId) -> Option<Device> {
        self.snapshot.borrow().get(id).cloned()
    }

    pub fn get_by_name(&self, name: &str) -> Option<Device> {
        self.snapshot.borrow().get_by_name(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.snapshot.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.borrow().is_empty()
    }
}
