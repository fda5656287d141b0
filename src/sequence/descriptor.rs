use crate::foundation::error::{ReelError, ReelResult};

fn default_padding() -> usize {
    3
}

fn default_format() -> String {
    "webp".to_owned()
}

/// Addressing scheme for a statically named frame series.
///
/// Frame `i` lives at `{base_url}/frame_{i zero-padded to padding}{suffix}.{format}`.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameUrlTemplate {
    /// URL or directory that holds the frames.
    pub base_url: String,
    /// Zero-padding width of the frame number.
    #[serde(default = "default_padding")]
    pub padding: usize,
    /// Text appended after the frame number (e.g. `_delay-0.036s`).
    #[serde(default)]
    pub suffix: String,
    /// File extension without the dot.
    #[serde(default = "default_format")]
    pub format: String,
}

impl FrameUrlTemplate {
    /// Template with default padding (3), no suffix and `webp` frames.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            padding: default_padding(),
            suffix: String::new(),
            format: default_format(),
        }
    }

    /// Override the zero-padding width.
    pub fn with_padding(mut self, padding: usize) -> Self {
        self.padding = padding;
        self
    }

    /// Override the file name suffix.
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Override the file extension.
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    /// Render the locator of frame `index`.
    pub fn frame_url(&self, index: u32) -> String {
        let base = self.base_url.trim_end_matches('/');
        let file = format!(
            "frame_{index:0width$}{suffix}.{format}",
            width = self.padding,
            suffix = self.suffix,
            format = self.format,
        );
        if base.is_empty() {
            file
        } else {
            format!("{base}/{file}")
        }
    }

    fn validate(&self) -> ReelResult<()> {
        if self.format.is_empty() || self.format.contains(['/', '.']) {
            return Err(ReelError::validation(format!(
                "frame format '{}' must be a bare extension",
                self.format
            )));
        }
        if self.suffix.contains('/') {
            return Err(ReelError::validation("frame suffix must not contain '/'"));
        }
        Ok(())
    }
}

/// One named, ordered set of frames that together form a scroll-scrubbed animation.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SequenceDescriptor {
    /// Unique sequence id.
    pub id: String,
    /// Where the frames live.
    pub frames: FrameUrlTemplate,
    /// Number of frames, must be > 0.
    pub total_frames: u32,
    /// Headline shown by overlays while this sequence is active.
    pub label: String,
    /// Optional secondary line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Optional small print.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtext: Option<String>,
    /// Optional call-to-action text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cta_text: Option<String>,
    /// Optional call-to-action target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cta_link: Option<String>,
}

impl SequenceDescriptor {
    /// Minimal descriptor with no overlay copy beyond the label.
    pub fn new(
        id: impl Into<String>,
        frames: FrameUrlTemplate,
        total_frames: u32,
        label: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            frames,
            total_frames,
            label: label.into(),
            description: None,
            subtext: None,
            cta_text: None,
            cta_link: None,
        }
    }

    /// Locator of frame `index` within this sequence.
    pub fn frame_url(&self, index: u32) -> String {
        self.frames.frame_url(index)
    }

    /// Check the descriptor in isolation (uniqueness is checked by the timeline).
    pub fn validate(&self) -> ReelResult<()> {
        if self.id.trim().is_empty() {
            return Err(ReelError::validation("sequence id must be non-empty"));
        }
        if self.total_frames == 0 {
            return Err(ReelError::validation(format!(
                "sequence '{}' total_frames must be > 0",
                self.id
            )));
        }
        self.frames
            .validate()
            .map_err(|e| ReelError::validation(format!("sequence '{}': {e}", self.id)))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sequence/descriptor.rs"]
mod tests;
