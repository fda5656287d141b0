/// Raw scroll sample taken from the hosting document.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollInput {
    /// Pixels scrolled from the top of the document.
    pub scroll_offset: f64,
    /// Viewport height in pixels.
    pub viewport_height: f64,
    /// Screens of scroll each sequence occupies.
    pub scroll_factor: f64,
}

impl ScrollInput {
    /// Scroll distance of one sequence.
    pub fn sequence_span(self) -> f64 {
        self.viewport_height * self.scroll_factor
    }
}

/// Where the timeline is for a given scroll offset. Recomputed every tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaybackPosition {
    /// Active sequence, in timeline order.
    pub sequence_index: usize,
    /// Frame within the active sequence.
    pub frame_index: u32,
    /// Progress through the active sequence's span, in `[0, 1)`.
    pub progress: f64,
}

impl PlaybackPosition {
    const START: Self = Self {
        sequence_index: 0,
        frame_index: 0,
        progress: 0.0,
    };
}

/// Map a scroll sample to a playback position.
///
/// Every sequence occupies the same span (`viewport_height * scroll_factor`) regardless of its
/// frame count. Offsets at or below zero map to the first frame of the first sequence; offsets
/// past the end map to the last frame of the last sequence. Returns `None` only for an empty
/// timeline.
pub fn map_scroll(input: ScrollInput, frame_counts: &[u32]) -> Option<PlaybackPosition> {
    let last_seq = frame_counts.len().checked_sub(1)?;

    let span = input.sequence_span();
    let offset = input.scroll_offset;
    if !span.is_finite() || span <= 0.0 || offset.is_nan() || offset <= 0.0 {
        return Some(PlaybackPosition::START);
    }

    let raw = (offset / span).floor();
    if raw > last_seq as f64 {
        let total = frame_counts[last_seq];
        return Some(PlaybackPosition {
            sequence_index: last_seq,
            frame_index: total.saturating_sub(1),
            progress: 1.0 - f64::EPSILON,
        });
    }

    let sequence_index = raw as usize;
    let progress = (offset % span) / span;
    let last_frame = frame_counts[sequence_index].saturating_sub(1);
    let frame_index = ((progress * f64::from(last_frame)).floor() as u32).min(last_frame);

    Some(PlaybackPosition {
        sequence_index,
        frame_index,
        progress,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/scroll/mapper.rs"]
mod tests;
