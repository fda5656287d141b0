use rayon::prelude::*;

use crate::{
    cache::frame::FrameHandle,
    render::{
        cover::{CoverCrop, cover_crop},
        surface::Surface,
    },
};

/// Pixel sampling used when scaling the cropped frame onto the surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleFilter {
    /// Nearest source pixel.
    Nearest,
    /// Bilinear blend of the four nearest source pixels.
    #[default]
    Bilinear,
}

/// Why a draw did not touch the surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// The image has no pixel data yet.
    NotReady,
    /// The surface has zero area.
    EmptySurface,
}

/// Result of [`Renderer::draw`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawOutcome {
    /// The surface now shows the frame.
    Drawn,
    /// Nothing was drawn; previous pixels are untouched.
    Skipped(SkipReason),
}

/// Cover-fit frame renderer.
#[derive(Clone, Copy, Debug, Default)]
pub struct Renderer {
    filter: SampleFilter,
}

impl Renderer {
    /// Renderer with the given sampling filter.
    pub fn new(filter: SampleFilter) -> Self {
        Self { filter }
    }

    /// Sampling filter in use.
    pub fn filter(&self) -> SampleFilter {
        self.filter
    }

    /// Fill `target` with `image` using cover fit.
    ///
    /// Never fails: images that are not ready, and empty surfaces, are skipped.
    pub fn draw(&self, target: &mut Surface, image: &FrameHandle) -> DrawOutcome {
        if !image.is_ready() {
            return DrawOutcome::Skipped(SkipReason::NotReady);
        }
        let (tw, th) = (target.width(), target.height());
        let Some(crop) = cover_crop(image.width, image.height, tw, th) else {
            return DrawOutcome::Skipped(SkipReason::EmptySurface);
        };

        let sampler = Sampler::new(image, crop, tw, th);
        let filter = self.filter;
        let row_len = (tw as usize) * 4;
        target
            .data_mut()
            .par_chunks_mut(row_len)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, px) in row.chunks_exact_mut(4).enumerate() {
                    let rgba = match filter {
                        SampleFilter::Nearest => sampler.nearest(x as u32, y as u32),
                        SampleFilter::Bilinear => sampler.bilinear(x as u32, y as u32),
                    };
                    px.copy_from_slice(&rgba);
                }
            });

        DrawOutcome::Drawn
    }
}

struct Sampler<'a> {
    src: &'a [u8],
    iw: u32,
    ih: u32,
    crop: CoverCrop,
    scale_x: f64,
    scale_y: f64,
}

impl<'a> Sampler<'a> {
    fn new(image: &'a FrameHandle, crop: CoverCrop, tw: u32, th: u32) -> Self {
        Self {
            src: image.rgba8_premul.as_slice(),
            iw: image.width,
            ih: image.height,
            crop,
            scale_x: crop.sw / f64::from(tw),
            scale_y: crop.sh / f64::from(th),
        }
    }

    /// Source-space coordinates of the target pixel center.
    fn source_pos(&self, x: u32, y: u32) -> (f64, f64) {
        (
            self.crop.sx + (f64::from(x) + 0.5) * self.scale_x,
            self.crop.sy + (f64::from(y) + 0.5) * self.scale_y,
        )
    }

    fn texel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = ((y as usize) * (self.iw as usize) + (x as usize)) * 4;
        [
            self.src[i],
            self.src[i + 1],
            self.src[i + 2],
            self.src[i + 3],
        ]
    }

    fn nearest(&self, x: u32, y: u32) -> [u8; 4] {
        let (u, v) = self.source_pos(x, y);
        let sx = (u.floor().max(0.0) as u32).min(self.iw - 1);
        let sy = (v.floor().max(0.0) as u32).min(self.ih - 1);
        self.texel(sx, sy)
    }

    fn bilinear(&self, x: u32, y: u32) -> [u8; 4] {
        let (u, v) = self.source_pos(x, y);
        let max_x = f64::from(self.iw - 1);
        let max_y = f64::from(self.ih - 1);
        let u = (u - 0.5).clamp(0.0, max_x);
        let v = (v - 0.5).clamp(0.0, max_y);

        let x0 = u.floor() as u32;
        let y0 = v.floor() as u32;
        let x1 = (x0 + 1).min(self.iw - 1);
        let y1 = (y0 + 1).min(self.ih - 1);
        let fx = u - f64::from(x0);
        let fy = v - f64::from(y0);

        let p00 = self.texel(x0, y0);
        let p10 = self.texel(x1, y0);
        let p01 = self.texel(x0, y1);
        let p11 = self.texel(x1, y1);

        let mut out = [0u8; 4];
        for c in 0..4 {
            let top = f64::from(p00[c]) * (1.0 - fx) + f64::from(p10[c]) * fx;
            let bottom = f64::from(p01[c]) * (1.0 - fx) + f64::from(p11[c]) * fx;
            out[c] = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/renderer.rs"]
mod tests;
