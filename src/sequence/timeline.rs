use std::collections::HashSet;

use crate::{
    foundation::error::{ReelError, ReelResult},
    sequence::descriptor::SequenceDescriptor,
};

/// Ordered list of sequences; the order defines the scroll timeline.
///
/// Validated on construction and immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "Vec<SequenceDescriptor>", into = "Vec<SequenceDescriptor>")]
pub struct Timeline {
    sequences: Vec<SequenceDescriptor>,
    frame_counts: Vec<u32>,
}

impl Timeline {
    /// Validate and wrap `sequences`.
    pub fn new(sequences: Vec<SequenceDescriptor>) -> ReelResult<Self> {
        if sequences.is_empty() {
            return Err(ReelError::validation(
                "timeline must contain at least one sequence",
            ));
        }

        let mut seen = HashSet::with_capacity(sequences.len());
        for s in &sequences {
            s.validate()?;
            if !seen.insert(s.id.as_str()) {
                return Err(ReelError::validation(format!(
                    "duplicate sequence id '{}'",
                    s.id
                )));
            }
        }

        let frame_counts = sequences.iter().map(|s| s.total_frames).collect();
        Ok(Self {
            sequences,
            frame_counts,
        })
    }

    /// Number of sequences.
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    /// Always `false` for a validated timeline.
    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// Sequence at timeline position `index`.
    pub fn get(&self, index: usize) -> Option<&SequenceDescriptor> {
        self.sequences.get(index)
    }

    /// Timeline position of the sequence with id `id`.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.sequences.iter().position(|s| s.id == id)
    }

    /// All sequences in timeline order.
    pub fn sequences(&self) -> &[SequenceDescriptor] {
        &self.sequences
    }

    /// Per-sequence frame counts in timeline order, the mapper's input.
    pub fn frame_counts(&self) -> &[u32] {
        &self.frame_counts
    }

    /// Total frames across every sequence (upper bound of decoded images held in memory).
    pub fn total_frames(&self) -> u64 {
        self.frame_counts.iter().map(|&n| u64::from(n)).sum()
    }

    /// Total scrollable height the host document must provide, in pixels.
    ///
    /// Every sequence occupies `viewport_height * scroll_factor` pixels regardless of its length.
    pub fn scroll_extent(&self, viewport_height: f64, scroll_factor: f64) -> f64 {
        (self.len() as f64) * viewport_height * scroll_factor
    }
}

impl TryFrom<Vec<SequenceDescriptor>> for Timeline {
    type Error = ReelError;

    fn try_from(value: Vec<SequenceDescriptor>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Timeline> for Vec<SequenceDescriptor> {
    fn from(value: Timeline) -> Self {
        value.sequences
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sequence/timeline.rs"]
mod tests;
