//! Fixed-capacity history of recent spikes.

use spikeview_core::Spike;

/// How much of an axis has to be repainted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedrawKind {
    /// No spike arrived since the last paint.
    Nothing,
    /// Only the newest `n` spikes need drawing on top of the previous frame.
    Incremental(usize),
    /// The whole buffer has to be drawn.
    Full,
}

/// Circular buffer of the last `capacity` spikes.
///
/// Slots are preallocated with the empty spike; `push` overwrites the slot
/// after the newest one.
#[derive(Debug, Clone)]
pub struct SpikeRing {
    slots: Vec<Spike>,
    index: usize,
    filled: usize,
    since_redraw: usize,
    needs_full: bool,
}

impl SpikeRing {
    /// Creates a ring holding at most `capacity` spikes (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: vec![Spike::empty(); capacity],
            index: 0,
            filled: 0,
            since_redraw: 0,
            needs_full: false,
        }
    }

    /// Maximum number of spikes retained.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of spikes currently retained.
    pub fn len(&self) -> usize {
        self.filled
    }

    /// Returns true if no spike is retained.
    pub fn is_empty(&self) -> bool {
        self.filled == 0
    }

    /// Stores a spike, evicting the oldest one when full.
    pub fn push(&mut self, spike: Spike) {
        let capacity = self.capacity();
        self.index = (self.index + 1) % capacity;
        self.slots[self.index] = spike;
        self.filled = (self.filled + 1).min(capacity);
        self.since_redraw = (self.since_redraw + 1).min(capacity);
    }

    /// Newest spike.
    pub fn latest(&self) -> Option<&Spike> {
        (self.filled > 0).then(|| &self.slots[self.index])
    }

    /// Retained spikes, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Spike> + '_ {
        let capacity = self.capacity();
        let start = (self.index + capacity + 1 - self.filled) % capacity;
        (0..self.filled).map(move |k| &self.slots[(start + k) % capacity])
    }

    /// Redraw needed since the previous call, without resetting it.
    pub fn pending_redraw(&self) -> RedrawKind {
        if self.needs_full || self.since_redraw >= self.capacity() {
            RedrawKind::Full
        } else if self.since_redraw == 0 {
            RedrawKind::Nothing
        } else {
            RedrawKind::Incremental(self.since_redraw)
        }
    }

    /// Redraw needed since the previous call; resets the counter.
    pub fn take_redraw(&mut self) -> RedrawKind {
        let kind = self.pending_redraw();
        self.since_redraw = 0;
        self.needs_full = false;
        kind
    }

    /// Drops every spike.
    pub fn clear(&mut self) {
        self.slots.fill(Spike::empty());
        self.index = 0;
        self.filled = 0;
        self.since_redraw = 0;
        self.needs_full = true;
    }
}
