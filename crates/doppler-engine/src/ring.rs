//! Published snapshots for realtime mode.
//!
//! The tick thread pushes one [`EngineSnapshot`] per tick; renderers read
//! the newest one, or an older one by its publish position, from any
//! thread. Positions count pushes from zero and never wrap. Position `p`
//! lives in slot `p % capacity` until `capacity` later pushes evict it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::snapshot::EngineSnapshot;

/// One stored snapshot and the position it was published at.
struct Published {
    pos: u64,
    snapshot: Arc<EngineSnapshot>,
}

/// Fixed-capacity store of the most recent snapshots.
///
/// Single producer ([`push`](Self::push), tick thread only), any number
/// of readers. Each slot has its own lock, so a reader only ever waits
/// for the one slot being overwritten.
pub struct SnapshotRing {
    slots: Box<[Mutex<Option<Published>>]>,
    pushed: AtomicU64,
}

const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<SnapshotRing>();
};

impl SnapshotRing {
    /// A ring holding the last `capacity` snapshots.
    ///
    /// # Panics
    ///
    /// Panics if `capacity < 2`; `RealtimeConfig::validate` rejects that.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 2, "snapshot ring needs 2 slots, got {capacity}");
        Self {
            slots: (0..capacity).map(|_| Mutex::new(None)).collect(),
            pushed: AtomicU64::new(0),
        }
    }

    fn slot(&self, pos: u64) -> MutexGuard<'_, Option<Published>> {
        let idx = (pos % self.slots.len() as u64) as usize;
        // Slots are replaced whole, so a poisoned lock is still coherent.
        self.slots[idx]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Publish `snapshot` at the next position.
    pub fn push(&self, snapshot: EngineSnapshot) {
        let pos = self.pushed.load(Ordering::Relaxed);
        *self.slot(pos) = Some(Published {
            pos,
            snapshot: Arc::new(snapshot),
        });
        // Readers that see the new count also see the slot contents.
        self.pushed.store(pos + 1, Ordering::Release);
    }

    /// The newest snapshot, if any has been published.
    pub fn latest(&self) -> Option<Arc<EngineSnapshot>> {
        self.published()
            .checked_sub(1)
            .and_then(|pos| self.get_by_pos(pos))
    }

    /// The snapshot published at `pos`, unless it is not yet published
    /// or has been evicted.
    pub fn get_by_pos(&self, pos: u64) -> Option<Arc<EngineSnapshot>> {
        let pushed = self.published();
        if pos >= pushed || pushed - pos > self.slots.len() as u64 {
            return None;
        }
        // The producer may overwrite the slot after the bounds check.
        self.slot(pos)
            .as_ref()
            .filter(|p| p.pos == pos)
            .map(|p| Arc::clone(&p.snapshot))
    }

    /// Number of snapshots published so far.
    pub fn published(&self) -> u64 {
        self.pushed.load(Ordering::Acquire)
    }

    /// How many snapshots are retained.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::tick::SimulationEngine;
    use doppler_core::TickId;

    fn snapshots(n: usize) -> Vec<EngineSnapshot> {
        let mut engine = SimulationEngine::new(EngineConfig::default()).unwrap();
        (0..n)
            .map(|_| {
                engine.step();
                engine.snapshot()
            })
            .collect()
    }

    #[test]
    fn nothing_published_yet() {
        let ring = SnapshotRing::new(4);
        assert_eq!(ring.published(), 0);
        assert_eq!(ring.capacity(), 4);
        assert!(ring.latest().is_none());
        assert!(ring.get_by_pos(0).is_none());
    }

    #[test]
    #[should_panic(expected = "needs 2 slots")]
    fn single_slot_ring_panics() {
        let _ = SnapshotRing::new(1);
    }

    #[test]
    fn latest_follows_pushes() {
        let ring = SnapshotRing::new(4);
        for (i, snap) in snapshots(3).into_iter().enumerate() {
            ring.push(snap);
            assert_eq!(ring.latest().unwrap().tick, TickId(i as u64 + 1));
        }
        assert_eq!(ring.published(), 3);
    }

    #[test]
    fn old_positions_are_evicted() {
        let ring = SnapshotRing::new(2);
        for snap in snapshots(5) {
            ring.push(snap);
        }
        let held: Vec<_> = (0..6)
            .map(|pos| ring.get_by_pos(pos).map(|s| s.tick))
            .collect();
        assert_eq!(
            held,
            vec![None, None, None, Some(TickId(4)), Some(TickId(5)), None]
        );
    }

    #[test]
    fn readers_never_go_backwards() {
        let ring = Arc::new(SnapshotRing::new(4));
        let snaps = snapshots(200);
        let reader = {
            let ring = Arc::clone(&ring);
            std::thread::spawn(move || {
                let mut last = TickId(0);
                for _ in 0..1000 {
                    if let Some(s) = ring.latest() {
                        assert!(s.tick >= last);
                        assert_eq!(s.wavefronts.len(), 28);
                        last = s.tick;
                    }
                }
            })
        };
        for snap in snaps {
            ring.push(snap);
        }
        reader.join().unwrap();
    }
}
