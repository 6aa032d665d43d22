//! Cancellable disposal scheduling for release tails.
//!
//! When a note is released its voice keeps sounding until the longest
//! operator release has decayed; the engine schedules the actual reclaim
//! here. A voice stolen before its timer fires must be cancelled so it is
//! never freed twice.

use alloc::vec::Vec;

#[derive(Clone, Copy, Debug)]
struct Entry {
    voice_id: u64,
    due: f64,
}

/// Pending voice disposals keyed by voice id.
///
/// Rescheduling an id replaces its previous entry. The queue is tiny (at
/// most a handful of release tails), so linear scans beat any heap.
#[derive(Debug, Default)]
pub struct DisposalQueue {
    entries: Vec<Entry>,
}

impl DisposalQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `voice_id` for disposal at `due`, replacing any existing
    /// entry for the same voice.
    pub fn schedule(&mut self, voice_id: u64, due: f64) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.voice_id == voice_id) {
            entry.due = due;
        } else {
            self.entries.push(Entry { voice_id, due });
        }
    }

    /// Cancels a pending disposal. Returns whether an entry existed.
    pub fn cancel(&mut self, voice_id: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.voice_id != voice_id);
        self.entries.len() != before
    }

    /// Removes and returns one entry whose due time has passed, or `None`.
    ///
    /// Call in a loop to drain everything due at `now`.
    pub fn pop_due(&mut self, now: f64) -> Option<u64> {
        let idx = self.entries.iter().position(|e| e.due <= now)?;
        Some(self.entries.swap_remove(idx).voice_id)
    }

    /// Number of pending disposals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every pending entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
