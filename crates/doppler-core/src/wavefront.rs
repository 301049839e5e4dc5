//! Emitted wavefronts and the fixed-capacity ring that recycles them.
//!
//! The ring never allocates after construction: an emission overwrites the
//! slot after the write cursor, so the oldest wavefront is logically
//! destroyed by being reset in place.

use smallvec::SmallVec;

use crate::geometry::{CrossingDirection, Position};
use crate::id::SlotIndex;

/// Ring capacity used by the reference configuration.
pub const DEFAULT_RING_CAPACITY: usize = 28;

/// Inline storage size; rings up to this capacity live on the stack.
const INLINE_SLOTS: usize = 32;

/// One expanding circular wave.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Wavefront {
    /// Distance travelled from the emission center.
    pub radius: f64,
    /// Source position at the moment of emission.
    pub center: Position,
    /// Set once this wavefront has been paired with its successor to
    /// produce an observed-frequency sample.
    pub observed: bool,
}

impl Wavefront {
    /// A freshly emitted wavefront at `center`.
    pub fn emitted_at(center: Position) -> Self {
        Self {
            radius: 0.0,
            center,
            observed: false,
        }
    }

    /// A parked placeholder that can never trigger detection.
    pub fn parked(center: Position, radius: f64) -> Self {
        Self {
            radius,
            center,
            observed: true,
        }
    }

    /// `x` coordinate of the edge facing the observer.
    pub fn leading_edge(&self, direction: CrossingDirection) -> f64 {
        direction.leading_edge(self.center.x, self.radius)
    }
}

/// Fixed-size ring of [`Wavefront`] slots plus a write cursor.
///
/// Invariant: every [`recycle`](Self::recycle) resets exactly one slot
/// and advances the cursor by exactly one, wrapping at `capacity`.
#[derive(Clone, Debug)]
pub struct WavefrontRing {
    slots: SmallVec<[Wavefront; INLINE_SLOTS]>,
    cursor: usize,
    recycles: u64,
}

impl WavefrontRing {
    /// Create a ring of `capacity` parked slots.
    ///
    /// Every slot starts observed, centered on `center`, at radius
    /// `park_radius` (twice the space boundary in the engine), so nothing
    /// is detected before the first real emission. The cursor starts on
    /// the last slot so the first recycle writes slot 0.
    ///
    /// # Panics
    ///
    /// Panics if `capacity < 2`; detection needs at least one adjacent pair.
    pub fn new(capacity: usize, center: Position, park_radius: f64) -> Self {
        assert!(
            capacity >= 2,
            "WavefrontRing capacity must be >= 2, got {capacity}"
        );
        let slots = (0..capacity)
            .map(|_| Wavefront::parked(center, park_radius))
            .collect();
        Self {
            slots,
            cursor: capacity - 1,
            recycles: 0,
        }
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Slot most recently written by [`recycle`](Self::recycle).
    ///
    /// Before the first recycle this is the last slot.
    pub fn cursor(&self) -> SlotIndex {
        SlotIndex(self.cursor)
    }

    /// Total number of recycles since construction.
    pub fn recycles(&self) -> u64 {
        self.recycles
    }

    /// Grow every wavefront by `wave_speed * dt`, observed or not.
    pub fn advance_all(&mut self, wave_speed: f64, dt: f64) {
        let step = wave_speed * dt;
        for slot in self.slots.iter_mut() {
            slot.radius += step;
        }
    }

    /// Overwrite the oldest slot with a new wavefront at `position`.
    ///
    /// Returns the index of the slot that was written, which is also the
    /// new cursor.
    pub fn recycle(&mut self, position: Position) -> SlotIndex {
        self.cursor = (self.cursor + 1) % self.slots.len();
        self.slots[self.cursor] = Wavefront::emitted_at(position);
        self.recycles += 1;
        SlotIndex(self.cursor)
    }

    /// Slot at `index`, if in range.
    pub fn get(&self, index: SlotIndex) -> Option<&Wavefront> {
        self.slots.get(index.0)
    }

    /// Mutable slot at `index`, if in range.
    pub fn get_mut(&mut self, index: SlotIndex) -> Option<&mut Wavefront> {
        self.slots.get_mut(index.0)
    }

    /// All slots in storage order.
    pub fn slots(&self) -> &[Wavefront] {
        &self.slots
    }

    /// Mutable access to all slots in storage order.
    pub fn slots_mut(&mut self) -> &mut [Wavefront] {
        &mut self.slots
    }
}
