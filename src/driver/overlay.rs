use std::sync::{
    Arc,
    atomic::{AtomicU32, AtomicU64, AtomicUsize, Ordering},
};

use crate::sequence::descriptor::SequenceDescriptor;

#[derive(Debug, Default)]
struct OverlayInner {
    sequence: AtomicUsize,
    frame: AtomicU32,
    version: AtomicU64,
}

/// Observable playback indices for text/UI overlays.
///
/// Cloning shares the same state; readers on any thread see what the driver last published.
/// `version` increments on every active-sequence change, so a reader can cheaply detect when its
/// text needs replacing.
#[derive(Clone, Debug, Default)]
pub struct OverlayState {
    inner: Arc<OverlayInner>,
}

/// Point-in-time read of an [`OverlayState`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OverlaySnapshot {
    /// Active sequence index.
    pub sequence_index: usize,
    /// Active frame index within that sequence.
    pub frame_index: u32,
    /// Number of sequence changes published so far.
    pub version: u64,
}

impl OverlayState {
    /// State pointing at the first frame of the first sequence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently active sequence index.
    pub fn active_sequence(&self) -> usize {
        self.inner.sequence.load(Ordering::Acquire)
    }

    /// Currently active frame index.
    pub fn active_frame(&self) -> u32 {
        self.inner.frame.load(Ordering::Acquire)
    }

    /// Sequence-change counter.
    pub fn version(&self) -> u64 {
        self.inner.version.load(Ordering::Acquire)
    }

    /// Read all three values.
    pub fn snapshot(&self) -> OverlaySnapshot {
        OverlaySnapshot {
            sequence_index: self.active_sequence(),
            frame_index: self.active_frame(),
            version: self.version(),
        }
    }

    pub(crate) fn publish_sequence(&self, index: usize) {
        self.inner.sequence.store(index, Ordering::Release);
        self.inner.version.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn publish_frame(&self, frame: u32) {
        self.inner.frame.store(frame, Ordering::Release);
    }
}

/// Call-to-action attached to a sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OverlayCta {
    /// Button text.
    pub text: String,
    /// Target link, if any.
    pub link: Option<String>,
}

/// Copy an overlay shows while a sequence is active.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OverlayText {
    /// Headline.
    pub label: String,
    /// Secondary line.
    pub description: Option<String>,
    /// Small print.
    pub subtext: Option<String>,
    /// Call-to-action button.
    pub cta: Option<OverlayCta>,
}

impl From<&SequenceDescriptor> for OverlayText {
    fn from(d: &SequenceDescriptor) -> Self {
        Self {
            label: d.label.clone(),
            description: d.description.clone(),
            subtext: d.subtext.clone(),
            cta: d.cta_text.as_ref().map(|text| OverlayCta {
                text: text.clone(),
                link: d.cta_link.clone(),
            }),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/driver/overlay.rs"]
mod tests;
