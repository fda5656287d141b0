/// Source rectangle (in image pixels) that fills a target with "cover" fit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoverCrop {
    /// Left edge.
    pub sx: f64,
    /// Top edge.
    pub sy: f64,
    /// Width.
    pub sw: f64,
    /// Height.
    pub sh: f64,
}

impl CoverCrop {
    /// `true` when the crop trims left/right margins.
    pub fn crops_horizontally(self) -> bool {
        self.sx > 0.0
    }

    /// `true` when the crop trims top/bottom margins.
    pub fn crops_vertically(self) -> bool {
        self.sy > 0.0
    }
}

/// Compute the centered cover crop of an `image_w x image_h` image for a `target_w x target_h`
/// target.
///
/// Images relatively wider than the target lose equal left/right margins, taller images lose
/// equal top/bottom margins; the aspect ratio is preserved and the target is always filled.
/// Returns `None` when any dimension is zero.
pub fn cover_crop(image_w: u32, image_h: u32, target_w: u32, target_h: u32) -> Option<CoverCrop> {
    if image_w == 0 || image_h == 0 || target_w == 0 || target_h == 0 {
        return None;
    }

    let (iw, ih) = (f64::from(image_w), f64::from(image_h));
    let target_ratio = f64::from(target_w) / f64::from(target_h);
    let image_ratio = iw / ih;

    let crop = if image_ratio > target_ratio {
        let sw = ih * target_ratio;
        CoverCrop {
            sx: (iw - sw) / 2.0,
            sy: 0.0,
            sw,
            sh: ih,
        }
    } else {
        let sh = iw / target_ratio;
        CoverCrop {
            sx: 0.0,
            sy: (ih - sh) / 2.0,
            sw: iw,
            sh,
        }
    };
    Some(crop)
}

#[cfg(test)]
#[path = "../../tests/unit/render/cover.rs"]
mod tests;
