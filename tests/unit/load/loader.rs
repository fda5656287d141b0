use std::{io::Cursor, sync::Mutex};

use super::*;
use crate::{load::source::MemorySource, sequence::descriptor::FrameUrlTemplate};

fn png(shade: u8) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([shade, shade, shade, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn desc(id: &str, frames: u32) -> SequenceDescriptor {
    SequenceDescriptor::new(
        id,
        FrameUrlTemplate::new(id).with_format("png"),
        frames,
        format!("Label {id}"),
    )
}

fn source_for(d: &SequenceDescriptor, skip: &[u32]) -> MemorySource {
    let mut src = MemorySource::new();
    for i in 0..d.total_frames {
        if !skip.contains(&i) {
            src.insert(d.frame_url(i), png(i as u8));
        }
    }
    src
}

fn loader(src: impl FrameSource, frame_timeout: Option<Duration>) -> SequenceLoader {
    SequenceLoader::new(
        Arc::new(src),
        LoaderOpts {
            threads: Some(2),
            frame_timeout,
        },
    )
    .unwrap()
}

#[test]
fn preload_is_idempotent_and_reaches_ready() {
    let d = desc("web1", 12);
    let mut loader = loader(source_for(&d, &[]), None);
    let mut cache = FrameCache::new();

    assert_eq!(loader.load_state("web1"), LoadState::NotRequested);
    assert_eq!(loader.preload(&mut cache, &d), PreloadOutcome::Issued);
    assert!(cache.has("web1"));
    assert_ne!(loader.preload(&mut cache, &d), PreloadOutcome::Issued);

    assert!(loader.wait_ready(&mut cache, "web1", Duration::from_secs(10)));
    assert_eq!(
        loader.load_state("web1"),
        LoadState::Ready {
            loaded: 12,
            failed: 0
        }
    );
    assert_eq!(loader.preload(&mut cache, &d), PreloadOutcome::AlreadyReady);
    assert_eq!(loader.progress("web1"), 1.0);
    assert!(loader.is_idle());
    assert!(loader.status_line().is_none());
    assert_eq!(cache.get("web1", 11).unwrap().source_index, 11);
}

#[test]
fn failed_frame_is_gap_filled_not_surfaced() {
    let d = desc("seq", 280);
    let mut loader = loader(source_for(&d, &[50]), None);
    let mut cache = FrameCache::new();

    loader.preload(&mut cache, &d);
    assert!(loader.wait_ready(&mut cache, "seq", Duration::from_secs(20)));
    assert_eq!(
        loader.load_state("seq"),
        LoadState::Ready {
            loaded: 279,
            failed: 1
        }
    );
    assert_eq!(cache.get("seq", 50).unwrap().source_index, 49);
}

#[test]
fn failed_first_frame_has_no_fallback() {
    let d = desc("seq", 5);
    let mut loader = loader(source_for(&d, &[0]), None);
    let mut cache = FrameCache::new();

    loader.preload(&mut cache, &d);
    assert!(loader.wait_ready(&mut cache, "seq", Duration::from_secs(10)));
    assert!(cache.get("seq", 0).is_none());
    assert_eq!(cache.get("seq", 1).unwrap().source_index, 1);
}

#[test]
fn undecodable_bytes_count_as_failures() {
    let d = desc("seq", 3);
    let mut src = source_for(&d, &[]);
    src.insert(d.frame_url(1), b"garbage".to_vec());
    let mut loader = loader(src, None);
    let mut cache = FrameCache::new();

    loader.preload(&mut cache, &d);
    assert!(loader.wait_ready(&mut cache, "seq", Duration::from_secs(10)));
    assert_eq!(cache.get("seq", 1).unwrap().source_index, 0);
}

#[test]
fn wait_ready_on_unrequested_sequence_returns_immediately() {
    let mut loader = loader(MemorySource::new(), None);
    let mut cache = FrameCache::new();
    assert!(!loader.wait_ready(&mut cache, "nope", Duration::from_secs(10)));
    assert_eq!(loader.progress("nope"), 0.0);
}

/// Blocks fetches of one locator until the test drops the gate sender.
struct GatedSource {
    inner: MemorySource,
    stalled: String,
    gate: Mutex<mpsc::Receiver<()>>,
}

impl FrameSource for GatedSource {
    fn fetch(&self, locator: &str) -> ReelResult<Vec<u8>> {
        if locator == self.stalled {
            let gate = self.gate.lock().unwrap();
            let _ = gate.recv_timeout(Duration::from_secs(10));
        }
        self.inner.fetch(locator)
    }
}

fn gated(d: &SequenceDescriptor, stalled_frame: u32) -> (GatedSource, mpsc::Sender<()>) {
    let (tx, rx) = mpsc::channel();
    let src = GatedSource {
        inner: source_for(d, &[]),
        stalled: d.frame_url(stalled_frame),
        gate: Mutex::new(rx),
    };
    (src, tx)
}

#[test]
fn stalled_frame_blocks_ready_without_timeout() {
    let d = desc("seq", 4);
    let (src, gate) = gated(&d, 2);
    let mut loader = loader(src, None);
    let mut cache = FrameCache::new();

    loader.preload(&mut cache, &d);
    assert!(!loader.wait_ready(&mut cache, "seq", Duration::from_millis(300)));
    assert!(matches!(
        loader.load_state("seq"),
        LoadState::InFlight { loaded: 3, .. }
    ));
    assert_eq!(loader.status_line().as_deref(), Some("Loading Label seq..."));
    assert!(loader.progress("seq") < 1.0);

    drop(gate);
    assert!(loader.wait_ready(&mut cache, "seq", Duration::from_secs(10)));
}

#[test]
fn stalled_frame_times_out_as_failure() {
    let d = desc("seq", 4);
    let (src, gate) = gated(&d, 2);
    let mut loader = loader(src, Some(Duration::from_millis(100)));
    let mut cache = FrameCache::new();

    loader.preload(&mut cache, &d);
    assert!(loader.wait_ready(&mut cache, "seq", Duration::from_secs(10)));
    assert_eq!(
        loader.load_state("seq"),
        LoadState::Ready {
            loaded: 3,
            failed: 1
        }
    );
    assert_eq!(cache.get("seq", 2).unwrap().source_index, 1);

    // The late success must not disturb the settled set.
    drop(gate);
    std::thread::sleep(Duration::from_millis(100));
    assert!(loader.pump(&mut cache).is_empty());
    assert_eq!(cache.get("seq", 2).unwrap().source_index, 1);
}

/// Every fetch takes `delay`; nothing ever stalls.
struct SlowSource {
    inner: MemorySource,
    delay: Duration,
}

impl FrameSource for SlowSource {
    fn fetch(&self, locator: &str) -> ReelResult<Vec<u8>> {
        std::thread::sleep(self.delay);
        self.inner.fetch(locator)
    }
}

#[test]
fn queued_frames_are_not_timed_out() {
    let d = desc("seq", 10);
    let src = SlowSource {
        inner: source_for(&d, &[]),
        delay: Duration::from_millis(40),
    };
    let mut loader = SequenceLoader::new(
        Arc::new(src),
        LoaderOpts {
            threads: Some(1),
            frame_timeout: Some(Duration::from_millis(150)),
        },
    )
    .unwrap();
    let mut cache = FrameCache::new();

    // Ten serial 40ms fetches outlast the timeout, but no single fetch does.
    loader.preload(&mut cache, &d);
    assert!(loader.wait_ready(&mut cache, "seq", Duration::from_secs(10)));
    assert_eq!(
        loader.load_state("seq"),
        LoadState::Ready {
            loaded: 10,
            failed: 0
        }
    );
    assert_eq!(cache.get("seq", 9).unwrap().source_index, 9);
}

#[test]
fn zero_threads_is_rejected() {
    let err = SequenceLoader::new(
        Arc::new(MemorySource::new()),
        LoaderOpts {
            threads: Some(0),
            frame_timeout: None,
        },
    )
    .unwrap_err();
    assert!(matches!(err, ReelError::Validation(_)));
}
