use std::collections::HashMap;

use crate::cache::{frame::FrameHandle, frame_set::FrameSet};

/// Decoded frames of every requested sequence, keyed by sequence id.
///
/// Frame sets are created on first request and never evicted: memory is bounded by the total
/// frame count of the configured timeline. Lookups never fail loudly; absence is `None`.
#[derive(Debug, Default)]
pub struct FrameCache {
    sets: HashMap<String, FrameSet>,
}

impl FrameCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` once a frame set exists for `sequence_id`.
    pub fn has(&self, sequence_id: &str) -> bool {
        self.sets.contains_key(sequence_id)
    }

    /// Create the frame set for `sequence_id` if missing, returning it.
    pub fn ensure(&mut self, sequence_id: &str, total_frames: u32) -> &mut FrameSet {
        self.sets
            .entry(sequence_id.to_owned())
            .or_insert_with(|| FrameSet::new(total_frames))
    }

    /// Resolve a frame with nearest-earlier fallback.
    pub fn get(&self, sequence_id: &str, frame_index: u32) -> Option<&FrameHandle> {
        self.sets.get(sequence_id)?.get(frame_index)
    }

    /// Store a decoded frame. Returns `false` if the sequence is unknown or the index is out of
    /// range.
    pub fn store(&mut self, sequence_id: &str, frame_index: u32, handle: FrameHandle) -> bool {
        self.sets
            .get_mut(sequence_id)
            .is_some_and(|set| set.store(frame_index, handle))
    }

    /// Record a failed frame. Returns `true` when this newly settled the slot.
    pub fn mark_failed(&mut self, sequence_id: &str, frame_index: u32) -> bool {
        self.sets
            .get_mut(sequence_id)
            .is_some_and(|set| set.mark_failed(frame_index))
    }

    /// Run gap-filling over one sequence; returns the number of slots changed.
    pub fn gap_fill(&mut self, sequence_id: &str) -> usize {
        self.sets.get_mut(sequence_id).map_or(0, FrameSet::gap_fill)
    }

    /// Frame set of `sequence_id`, if requested before.
    pub fn frame_set(&self, sequence_id: &str) -> Option<&FrameSet> {
        self.sets.get(sequence_id)
    }

    /// Number of frames of `sequence_id` holding their own image.
    pub fn loaded_count(&self, sequence_id: &str) -> u32 {
        self.sets.get(sequence_id).map_or(0, FrameSet::loaded_count)
    }

    /// Number of sequences with a frame set.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// `true` when no sequence has been requested.
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cache/frame_cache.rs"]
mod tests;
