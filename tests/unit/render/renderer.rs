use super::*;
use crate::foundation::core::Viewport;

const A: [u8; 4] = [255, 0, 0, 255];
const B: [u8; 4] = [0, 255, 0, 255];
const C: [u8; 4] = [0, 0, 255, 255];
const D: [u8; 4] = [255, 255, 255, 255];

/// 4x2 image whose columns are A, B, C, D.
fn striped() -> FrameHandle {
    let mut px = Vec::new();
    for _ in 0..2 {
        for c in [A, B, C, D] {
            px.extend_from_slice(&c);
        }
    }
    FrameHandle::from_premul(0, 4, 2, px)
}

#[test]
fn wide_image_is_center_cropped_on_square_surface() {
    let mut surface = Surface::new(Viewport::new(2, 2));
    let outcome = Renderer::new(SampleFilter::Nearest).draw(&mut surface, &striped());
    assert_eq!(outcome, DrawOutcome::Drawn);
    for y in 0..2 {
        assert_eq!(surface.pixel(0, y), Some(B));
        assert_eq!(surface.pixel(1, y), Some(C));
    }
}

#[test]
fn same_size_bilinear_copies_source() {
    let img = FrameHandle::from_premul(0, 2, 1, [A, C].concat());
    let mut surface = Surface::new(Viewport::new(2, 1));
    Renderer::default().draw(&mut surface, &img);
    assert_eq!(surface.pixel(0, 0), Some(A));
    assert_eq!(surface.pixel(1, 0), Some(C));
}

#[test]
fn upscaled_uniform_image_stays_uniform() {
    let img = FrameHandle::from_premul(0, 1, 1, B.to_vec());
    let mut surface = Surface::new(Viewport::new(16, 9));
    assert_eq!(Renderer::default().draw(&mut surface, &img), DrawOutcome::Drawn);
    assert!(surface.data().chunks_exact(4).all(|px| px == B.as_slice()));
}

#[test]
fn not_ready_image_leaves_previous_frame() {
    let mut surface = Surface::new(Viewport::new(2, 2));
    let r = Renderer::new(SampleFilter::Nearest);
    r.draw(&mut surface, &striped());
    let before = surface.data().to_vec();

    let outcome = r.draw(&mut surface, &FrameHandle::pending(1));
    assert_eq!(outcome, DrawOutcome::Skipped(SkipReason::NotReady));
    assert_eq!(surface.data(), before.as_slice());
}

#[test]
fn empty_surface_is_skipped() {
    let mut surface = Surface::new(Viewport::new(0, 10));
    assert_eq!(
        Renderer::default().draw(&mut surface, &striped()),
        DrawOutcome::Skipped(SkipReason::EmptySurface)
    );
}
