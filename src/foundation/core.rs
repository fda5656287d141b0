use crate::foundation::error::{ReelError, ReelResult};

/// Viewport (and render surface) dimensions in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Viewport {
    /// Create a viewport; zero-sized viewports are allowed and simply render nothing.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Create a viewport that must have a non-zero area.
    pub fn non_empty(width: u32, height: u32) -> ReelResult<Self> {
        if width == 0 || height == 0 {
            return Err(ReelError::validation(format!(
                "viewport must be non-empty, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    /// Return `true` when either dimension is zero.
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width divided by height, or `None` for an empty viewport.
    pub fn aspect(self) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        Some(f64::from(self.width) / f64::from(self.height))
    }

    /// Number of bytes an RGBA8 buffer of this size occupies.
    pub fn rgba8_len(self) -> usize {
        (self.width as usize)
            .saturating_mul(self.height as usize)
            .saturating_mul(4)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
