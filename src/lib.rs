//! scrollreel is a scroll-synchronized image-sequence player.
//!
//! An ordered [`Timeline`] of sequences (statically named frame series) is laid out along the
//! scroll axis, one fixed-height span per sequence. Each display refresh the host hands the
//! [`PlaybackDriver`] a [`ScrollSample`]; the driver maps it to a frame, keeps frames loading
//! ahead of the reader and draws the frame onto a viewport-sized [`Surface`] with cover fit.
//!
//! # Pipeline overview
//!
//! 1. **Map**: `scroll offset -> PlaybackPosition` via the pure [`map_scroll`]
//! 2. **Load**: [`SequenceLoader`] fetches every frame of a sequence concurrently and fills the
//!    [`FrameCache`], gap-filling failed frames with the nearest earlier one
//! 3. **Resolve**: [`FrameCache::get`] returns the frame or the nearest earlier loaded frame
//! 4. **Draw**: [`Renderer::draw`] crops to cover the surface and samples the frame onto it
//!
//! Design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Best effort**: the playback path never errors; failed frames degrade to earlier frames and
//!   undrawable ticks leave the previous picture in place.
//! - **Single owner**: the cache is mutated only on the driver's thread; fetch workers report
//!   through a channel.
//! - **Premultiplied RGBA8** end-to-end.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod cache;
mod driver;
mod foundation;
mod load;
mod render;
mod scroll;
mod sequence;

pub use cache::frame::{FrameHandle, decode_frame};
pub use cache::frame_cache::FrameCache;
pub use cache::frame_set::{FrameSet, FrameSlot};
pub use driver::overlay::{OverlayCta, OverlaySnapshot, OverlayState, OverlayText};
pub use driver::playback::{
    FixedRateClock, PlaybackDriver, RefreshClock, ScrollSample, ScrollSignal, SharedScroll,
    StopToken, TickReport, ViewGuard,
};
pub use foundation::core::Viewport;
pub use foundation::error::{ReelError, ReelResult};
#[cfg(feature = "http")]
pub use load::source::HttpSource;
pub use load::loader::{LoadState, LoaderOpts, PreloadOutcome, SequenceLoader};
pub use load::source::{DirSource, FrameSource, MemorySource};
pub use render::cover::{CoverCrop, cover_crop};
pub use render::renderer::{DrawOutcome, Renderer, SampleFilter, SkipReason};
pub use render::surface::Surface;
pub use scroll::mapper::{PlaybackPosition, ScrollInput, map_scroll};
pub use sequence::config::{PlayerConfig, TimelineFile};
pub use sequence::descriptor::{FrameUrlTemplate, SequenceDescriptor};
pub use sequence::timeline::Timeline;
