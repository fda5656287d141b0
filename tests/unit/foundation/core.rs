use super::*;

#[test]
fn empty_viewports_have_no_aspect() {
    assert!(Viewport::new(0, 10).is_empty());
    assert!(Viewport::new(10, 0).aspect().is_none());
    assert!(Viewport::non_empty(0, 1).is_err());
}

#[test]
fn aspect_and_byte_len() {
    let vp = Viewport::non_empty(1600, 900).unwrap();
    assert!((vp.aspect().unwrap() - 16.0 / 9.0).abs() < 1e-12);
    assert_eq!(vp.rgba8_len(), 1600 * 900 * 4);
}
