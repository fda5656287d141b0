use std::path::Path;

use anyhow::Context as _;

use crate::foundation::{core::Viewport, error::ReelResult};

/// Viewport-sized drawing target.
///
/// Pixels are tightly packed, row-major, premultiplied RGBA8. The surface keeps its contents
/// between draws, so a skipped draw leaves the previous frame visible.
#[derive(Clone, Debug)]
pub struct Surface {
    viewport: Viewport,
    clear_rgba: [u8; 4],
    data: Vec<u8>,
}

impl Surface {
    /// Allocate a surface cleared to opaque black.
    pub fn new(viewport: Viewport) -> Self {
        Self::with_clear(viewport, [0, 0, 0, 255])
    }

    /// Allocate a surface cleared to `clear_rgba`.
    pub fn with_clear(viewport: Viewport, clear_rgba: [u8; 4]) -> Self {
        let mut s = Self {
            viewport,
            clear_rgba,
            data: Vec::new(),
        };
        s.reallocate();
        s
    }

    /// Current dimensions.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.viewport.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.viewport.height
    }

    /// Pixel bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// RGBA of one pixel, `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.viewport.width || y >= self.viewport.height {
            return None;
        }
        let i = ((y as usize) * (self.viewport.width as usize) + (x as usize)) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Resize to `viewport`, clearing the contents. Returns `false` when the size is unchanged.
    pub fn resize(&mut self, viewport: Viewport) -> bool {
        if viewport == self.viewport {
            return false;
        }
        self.viewport = viewport;
        self.reallocate();
        true
    }

    /// Fill with the clear color.
    pub fn clear(&mut self) {
        for px in self.data.chunks_exact_mut(4) {
            px.copy_from_slice(&self.clear_rgba);
        }
    }

    /// Write the current contents as a straight-alpha PNG, creating parent directories.
    pub fn save_png(&self, path: &Path) -> ReelResult<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create output dir '{}'", parent.display()))?;
        }
        let mut straight = self.data.clone();
        unpremultiply_in_place(&mut straight);
        image::save_buffer_with_format(
            path,
            &straight,
            self.viewport.width,
            self.viewport.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("write png '{}'", path.display()))?;
        Ok(())
    }

    fn reallocate(&mut self) {
        self.data = vec![0; self.viewport.rgba8_len()];
        self.clear();
    }
}

fn unpremultiply_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 255 {
            continue;
        }
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * 255 + a / 2) / a).min(255) as u8;
        px[1] = ((px[1] as u16 * 255 + a / 2) / a).min(255) as u8;
        px[2] = ((px[2] as u16 * 255 + a / 2) / a).min(255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
