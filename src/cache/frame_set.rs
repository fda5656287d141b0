use crate::cache::frame::FrameHandle;

/// State of one frame position within a [`FrameSet`].
#[derive(Clone, Debug, Default)]
pub enum FrameSlot {
    /// Nothing stored yet (pending, failed before gap-fill, or no earlier frame to borrow).
    #[default]
    Empty,
    /// The frame's own decoded image.
    Loaded(FrameHandle),
    /// The frame failed; this is the nearest earlier loaded image.
    FailedFallback(FrameHandle),
}

impl FrameSlot {
    /// The drawable image behind this slot, if any.
    pub fn handle(&self) -> Option<&FrameHandle> {
        match self {
            Self::Empty => None,
            Self::Loaded(h) | Self::FailedFallback(h) => Some(h),
        }
    }

    /// `true` for [`FrameSlot::Empty`].
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Ordered frame slots of one sequence plus per-slot settlement bookkeeping.
///
/// A slot is *settled* once its fetch has finished, successfully or not. Completions may arrive
/// in any order, so the set tolerates sparse fills; gap-filling is meant to run once every slot
/// has settled.
#[derive(Clone, Debug)]
pub struct FrameSet {
    slots: Vec<FrameSlot>,
    settled: Vec<bool>,
    settled_count: u32,
    loaded_count: u32,
    failed_count: u32,
}

impl FrameSet {
    /// Create `total_frames` empty, unsettled slots.
    pub fn new(total_frames: u32) -> Self {
        let n = total_frames as usize;
        Self {
            slots: vec![FrameSlot::Empty; n],
            settled: vec![false; n],
            settled_count: 0,
            loaded_count: 0,
            failed_count: 0,
        }
    }

    /// Number of slots.
    pub fn len(&self) -> u32 {
        self.slots.len() as u32
    }

    /// `true` for a zero-length set.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Raw slot access without fallback search.
    pub fn slot(&self, index: u32) -> Option<&FrameSlot> {
        self.slots.get(index as usize)
    }

    /// Store the decoded image of frame `index` and mark it settled.
    ///
    /// Returns `false` for out-of-range indices.
    pub fn store(&mut self, index: u32, handle: FrameHandle) -> bool {
        let i = index as usize;
        if i >= self.slots.len() {
            return false;
        }
        if self.settled[i] {
            if !matches!(self.slots[i], FrameSlot::Loaded(_)) {
                // A slot given up on earlier is now known good.
                self.failed_count = self.failed_count.saturating_sub(1);
                self.loaded_count += 1;
            }
        } else {
            self.settled[i] = true;
            self.settled_count += 1;
            self.loaded_count += 1;
        }
        self.slots[i] = FrameSlot::Loaded(handle);
        true
    }

    /// Mark frame `index` as settled without an image.
    ///
    /// Returns `true` when this newly settled the slot.
    pub fn mark_failed(&mut self, index: u32) -> bool {
        let i = index as usize;
        if i >= self.slots.len() || self.settled[i] {
            return false;
        }
        self.settled[i] = true;
        self.settled_count += 1;
        self.failed_count += 1;
        true
    }

    /// `true` once frame `index` finished loading or failing.
    pub fn is_settled(&self, index: u32) -> bool {
        self.settled.get(index as usize).copied().unwrap_or(false)
    }

    /// Indices that have not settled yet.
    pub fn unsettled(&self) -> impl Iterator<Item = u32> + '_ {
        self.settled
            .iter()
            .enumerate()
            .filter(|(_, s)| !**s)
            .map(|(i, _)| i as u32)
    }

    /// `true` when every slot has settled.
    pub fn is_complete(&self) -> bool {
        self.settled_count as usize == self.slots.len()
    }

    /// Settled slot count.
    pub fn settled_count(&self) -> u32 {
        self.settled_count
    }

    /// Slots holding their own image.
    pub fn loaded_count(&self) -> u32 {
        self.loaded_count
    }

    /// Slots that settled without an image.
    pub fn failed_count(&self) -> u32 {
        self.failed_count
    }

    /// Fraction of settled slots in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        if self.slots.is_empty() {
            return 1.0;
        }
        f64::from(self.settled_count) / (self.slots.len() as f64)
    }

    /// Resolve frame `index` to a drawable image.
    ///
    /// Empty slots fall back to the nearest earlier non-empty slot; `None` when there is none or
    /// `index` is out of range.
    pub fn get(&self, index: u32) -> Option<&FrameHandle> {
        let i = index as usize;
        if i >= self.slots.len() {
            return None;
        }
        self.slots[..=i].iter().rev().find_map(FrameSlot::handle)
    }

    /// Replace every non-loaded slot with the nearest preceding loaded image.
    ///
    /// Slots before the first loaded frame stay empty. Returns the number of slots changed, so a
    /// second pass over a filled set returns 0.
    pub fn gap_fill(&mut self) -> usize {
        let mut last: Option<FrameHandle> = None;
        let mut changed = 0;

        for slot in &mut self.slots {
            if let FrameSlot::Loaded(h) = slot {
                last = Some(h.clone());
                continue;
            }
            let Some(h) = &last else {
                continue;
            };
            let already = matches!(slot, FrameSlot::FailedFallback(cur) if cur.same_image(h));
            if !already {
                *slot = FrameSlot::FailedFallback(h.clone());
                changed += 1;
            }
        }

        changed
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cache/frame_set.rs"]
mod tests;
