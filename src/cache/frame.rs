use std::sync::Arc;

use crate::foundation::error::{ReelError, ReelResult};

/// Decoded frame image in premultiplied RGBA8 form.
///
/// Cloning is cheap: pixel storage is shared.
#[derive(Clone, Debug)]
pub struct FrameHandle {
    /// Frame number this image was decoded from.
    pub source_index: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl FrameHandle {
    /// Wrap already premultiplied pixels.
    pub fn from_premul(
        source_index: u32,
        width: u32,
        height: u32,
        rgba8_premul: Vec<u8>,
    ) -> Self {
        Self {
            source_index,
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
        }
    }

    /// A handle with no pixel data yet, the equivalent of an image still being decoded.
    pub fn pending(source_index: u32) -> Self {
        Self::from_premul(source_index, 0, 0, Vec::new())
    }

    /// `true` once the handle carries a full, non-empty pixel buffer.
    pub fn is_ready(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.rgba8_premul.len()
                == (self.width as usize)
                    .saturating_mul(self.height as usize)
                    .saturating_mul(4)
    }

    /// `true` when both handles share the same pixel storage.
    pub fn same_image(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.rgba8_premul, &other.rgba8_premul)
    }
}

/// Decode encoded image bytes (any format the `image` crate knows) into a [`FrameHandle`].
pub fn decode_frame(source_index: u32, bytes: &[u8]) -> ReelResult<FrameHandle> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| ReelError::decode(format!("frame {source_index}: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(FrameHandle::from_premul(
        source_index,
        width,
        height,
        rgba8_premul,
    ))
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
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
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cache/frame.rs"]
mod tests;
