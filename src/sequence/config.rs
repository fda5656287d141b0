use std::{fs::File, io::BufReader, path::Path, time::Duration};

use anyhow::Context as _;

use crate::{
    foundation::error::{ReelError, ReelResult},
    sequence::timeline::Timeline,
};

fn default_scroll_factor() -> f64 {
    4.0
}

fn default_lookahead() -> usize {
    2
}

fn default_initial_wait_ms() -> u64 {
    10_000
}

fn default_frame_timeout_ms() -> Option<u64> {
    Some(30_000)
}

/// Player tuning knobs.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlayerConfig {
    /// Screens of scroll per sequence.
    #[serde(default = "default_scroll_factor")]
    pub scroll_factor: f64,
    /// How many sequences ahead of the active one to preload.
    #[serde(default = "default_lookahead")]
    pub lookahead: usize,
    /// How long `start` blocks on the first sequences, in milliseconds.
    #[serde(default = "default_initial_wait_ms")]
    pub initial_wait_ms: u64,
    /// Frames still unsettled this long after a preload is issued count as failed.
    /// `None` waits forever.
    #[serde(default = "default_frame_timeout_ms")]
    pub frame_timeout_ms: Option<u64>,
    /// Fetch pool width; `None` uses rayon's default.
    #[serde(default)]
    pub threads: Option<usize>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            scroll_factor: default_scroll_factor(),
            lookahead: default_lookahead(),
            initial_wait_ms: default_initial_wait_ms(),
            frame_timeout_ms: default_frame_timeout_ms(),
            threads: None,
        }
    }
}

impl PlayerConfig {
    /// Check ranges.
    pub fn validate(&self) -> ReelResult<()> {
        if !self.scroll_factor.is_finite() || self.scroll_factor <= 0.0 {
            return Err(ReelError::validation(
                "scroll_factor must be finite and > 0",
            ));
        }
        if self.threads == Some(0) {
            return Err(ReelError::validation("threads must be > 0 when set"));
        }
        Ok(())
    }

    /// `initial_wait_ms` as a [`Duration`].
    pub fn initial_wait(&self) -> Duration {
        Duration::from_millis(self.initial_wait_ms)
    }

    /// `frame_timeout_ms` as a [`Duration`].
    pub fn frame_timeout(&self) -> Option<Duration> {
        self.frame_timeout_ms.map(Duration::from_millis)
    }
}

/// On-disk timeline document: optional player settings plus the ordered sequences.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TimelineFile {
    /// Player settings; defaults apply when omitted.
    #[serde(default)]
    pub player: PlayerConfig,
    /// Validated sequence list.
    pub sequences: Timeline,
}

impl TimelineFile {
    /// Parse and validate a JSON document.
    pub fn from_json_str(s: &str) -> ReelResult<Self> {
        let file: Self = serde_json::from_str(s)
            .map_err(|e| ReelError::config(format!("parse timeline JSON: {e}")))?;
        file.player.validate()?;
        Ok(file)
    }

    /// Read, parse and validate a JSON document from disk.
    pub fn from_path(path: &Path) -> ReelResult<Self> {
        let f = File::open(path)
            .with_context(|| format!("open timeline '{}'", path.display()))?;
        let file: Self = serde_json::from_reader(BufReader::new(f))
            .map_err(|e| ReelError::config(format!("parse '{}': {e}", path.display())))?;
        file.player.validate()?;
        Ok(file)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sequence/config.rs"]
mod tests;
