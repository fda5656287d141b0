use super::*;

#[test]
fn taller_image_on_wide_target_crops_top_and_bottom() {
    // 4:3 image into a 16:9 target: relatively taller, so rows are trimmed.
    let c = cover_crop(1600, 1200, 1920, 1080).unwrap();
    assert_eq!(c.sx, 0.0);
    assert_eq!(c.sw, 1600.0);
    assert!((c.sh - 900.0).abs() < 1e-9);
    assert!((c.sy - 150.0).abs() < 1e-9);
    assert!(c.crops_vertically());
    assert!(!c.crops_horizontally());
}

#[test]
fn wider_image_on_narrow_target_crops_sides_equally() {
    // 16:9 image into a 4:3 target.
    let c = cover_crop(1920, 1080, 1600, 1200).unwrap();
    assert_eq!(c.sy, 0.0);
    assert_eq!(c.sh, 1080.0);
    assert!((c.sw - 1440.0).abs() < 1e-9);
    assert!((c.sx - 240.0).abs() < 1e-9);
    assert!((c.sx + c.sw + c.sx - 1920.0).abs() < 1e-9);
    assert!(c.crops_horizontally());
}

#[test]
fn four_three_image_on_sixteen_nine_surface_is_centered() {
    let c = cover_crop(400, 300, 1600, 900).unwrap();
    let top = c.sy;
    let bottom = 300.0 - (c.sy + c.sh);
    assert!((top - bottom).abs() < 1e-9);
    assert!((c.sw / c.sh - 16.0 / 9.0).abs() < 1e-9);
}

#[test]
fn matching_aspect_is_identity() {
    let c = cover_crop(800, 450, 1600, 900).unwrap();
    assert!(c.sx.abs() < 1e-9 && c.sy.abs() < 1e-9);
    assert!((c.sw - 800.0).abs() < 1e-9);
    assert!((c.sh - 450.0).abs() < 1e-9);
}

#[test]
fn zero_dimensions_yield_none() {
    assert!(cover_crop(0, 10, 10, 10).is_none());
    assert!(cover_crop(10, 10, 10, 0).is_none());
}
