use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering},
    },
    time::{Duration, Instant},
};

use crate::{
    cache::frame_cache::FrameCache,
    driver::overlay::{OverlayState, OverlayText},
    foundation::{core::Viewport, error::ReelResult},
    load::{
        loader::{LoadState, LoaderOpts, PreloadOutcome, SequenceLoader},
        source::FrameSource,
    },
    render::{
        renderer::{DrawOutcome, Renderer},
        surface::Surface,
    },
    scroll::mapper::{PlaybackPosition, ScrollInput, map_scroll},
    sequence::{config::PlayerConfig, timeline::Timeline},
};

/// Number of leading sequences `start` blocks on.
const BLOCKING_START_SEQUENCES: usize = 2;

/// One reading of the host's scroll state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollSample {
    /// Pixels scrolled from the top of the document.
    pub scroll_offset: f64,
    /// Current viewport size.
    pub viewport: Viewport,
}

/// Source of scroll samples, read once per tick.
pub trait ScrollSignal {
    /// Current scroll state.
    fn sample(&self) -> ScrollSample;
}

impl<F> ScrollSignal for F
where
    F: Fn() -> ScrollSample,
{
    fn sample(&self) -> ScrollSample {
        self()
    }
}

/// Thread-safe scroll state a host updates from its own event handlers.
#[derive(Clone, Debug, Default)]
pub struct SharedScroll {
    offset_bits: Arc<AtomicU64>,
    width: Arc<AtomicU32>,
    height: Arc<AtomicU32>,
}

impl SharedScroll {
    /// Scroll state at offset 0 with the given viewport.
    pub fn new(viewport: Viewport) -> Self {
        let s = Self::default();
        s.set_viewport(viewport);
        s
    }

    /// Record a scroll event.
    pub fn set_offset(&self, scroll_offset: f64) {
        self.offset_bits
            .store(scroll_offset.to_bits(), Ordering::Release);
    }

    /// Record a resize event.
    pub fn set_viewport(&self, viewport: Viewport) {
        self.width.store(viewport.width, Ordering::Release);
        self.height.store(viewport.height, Ordering::Release);
    }
}

impl ScrollSignal for SharedScroll {
    fn sample(&self) -> ScrollSample {
        ScrollSample {
            scroll_offset: f64::from_bits(self.offset_bits.load(Ordering::Acquire)),
            viewport: Viewport::new(
                self.width.load(Ordering::Acquire),
                self.height.load(Ordering::Acquire),
            ),
        }
    }
}

/// Display refresh signal the playback loop paces itself on.
pub trait RefreshClock {
    /// Block until the next refresh.
    fn wait_next(&mut self);
}

/// Refresh clock ticking at a fixed rate, catching up without bursts when late.
#[derive(Clone, Debug)]
pub struct FixedRateClock {
    period: Duration,
    next: Option<Instant>,
}

impl FixedRateClock {
    /// Clock ticking `hz` times per second (at least once).
    pub fn new(hz: u32) -> Self {
        Self {
            period: Duration::from_secs(1) / hz.max(1),
            next: None,
        }
    }

    /// Time between ticks.
    pub fn period(&self) -> Duration {
        self.period
    }
}

impl RefreshClock for FixedRateClock {
    fn wait_next(&mut self) {
        let now = Instant::now();
        let next = self.next.unwrap_or(now) + self.period;
        if next > now {
            std::thread::sleep(next - now);
            self.next = Some(next);
        } else {
            self.next = Some(now);
        }
    }
}

/// Cancellation flag for the playback loop. Clones share the flag.
#[derive(Clone, Debug, Default)]
pub struct StopToken(Arc<AtomicBool>);

impl StopToken {
    /// Fresh, unstopped token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the loop to stop after its current tick.
    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// `true` once [`stop`](Self::stop) was called.
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Guard that stops this token when dropped, tying the loop to the owning view's lifetime.
    pub fn guard(&self) -> ViewGuard {
        ViewGuard {
            token: self.clone(),
        }
    }
}

/// Stops its [`StopToken`] on drop.
#[derive(Debug)]
pub struct ViewGuard {
    token: StopToken,
}

impl Drop for ViewGuard {
    fn drop(&mut self) {
        self.token.stop();
    }
}

/// What one [`PlaybackDriver::tick`] did.
#[derive(Clone, Debug, PartialEq)]
pub struct TickReport {
    /// Mapped position; `None` only for an empty timeline.
    pub position: Option<PlaybackPosition>,
    /// The active sequence changed this tick.
    pub sequence_changed: bool,
    /// The surface was resized this tick.
    pub resized: bool,
    /// Draw result; `None` when no frame (or fallback) was available yet.
    pub draw: Option<DrawOutcome>,
    /// Sequences whose loading finished during this tick.
    pub became_ready: Vec<String>,
}

/// Scroll-synchronized sequence player.
///
/// Owns the frame cache, the loader and the output surface. Each tick maps the scroll sample to
/// a frame, keeps look-ahead loading going, publishes overlay indices and draws.
#[derive(Debug)]
pub struct PlaybackDriver {
    timeline: Timeline,
    config: PlayerConfig,
    cache: FrameCache,
    loader: SequenceLoader,
    renderer: Renderer,
    surface: Surface,
    overlay: OverlayState,
    active: Option<usize>,
}

impl PlaybackDriver {
    /// Build a driver fetching frames from `source`.
    pub fn new(
        timeline: Timeline,
        config: PlayerConfig,
        source: Arc<dyn FrameSource>,
    ) -> ReelResult<Self> {
        config.validate()?;
        let loader = SequenceLoader::new(
            source,
            LoaderOpts {
                threads: config.threads,
                frame_timeout: config.frame_timeout(),
            },
        )?;
        Ok(Self {
            timeline,
            config,
            cache: FrameCache::new(),
            loader,
            renderer: Renderer::default(),
            surface: Surface::new(Viewport::default()),
            overlay: OverlayState::new(),
            active: None,
        })
    }

    /// Replace the renderer (e.g. to change the sampling filter).
    pub fn with_renderer(mut self, renderer: Renderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// Kick off initial loading: block on the first sequences, then start the look-ahead ones.
    ///
    /// Returns whether the first sequence is ready.
    pub fn start(&mut self) -> bool {
        let wait = self.config.initial_wait();
        let blocking = BLOCKING_START_SEQUENCES.min(self.timeline.len());
        for index in 0..blocking {
            self.preload_index(index);
            if let Some(desc) = self.timeline.get(index) {
                let ready = self.loader.wait_ready(&mut self.cache, &desc.id, wait);
                if !ready {
                    tracing::warn!(sequence = desc.id.as_str(), "initial sequence not ready in time");
                }
            }
        }
        let fired = blocking
            .saturating_add(self.config.lookahead)
            .min(self.timeline.len());
        for index in blocking..fired {
            self.preload_index(index);
        }
        self.is_initial_ready()
    }

    /// Run one display-refresh step.
    pub fn tick(&mut self, sample: ScrollSample) -> TickReport {
        let became_ready = self.loader.pump(&mut self.cache);
        let resized = self.surface.resize(sample.viewport);

        let input = ScrollInput {
            scroll_offset: sample.scroll_offset,
            viewport_height: f64::from(sample.viewport.height),
            scroll_factor: self.config.scroll_factor,
        };
        let Some(position) = map_scroll(input, self.timeline.frame_counts()) else {
            return TickReport {
                position: None,
                sequence_changed: false,
                resized,
                draw: None,
                became_ready,
            };
        };

        let index = position.sequence_index;
        let sequence_changed = self.active != Some(index);
        if sequence_changed {
            self.active = Some(index);
            let ahead = self.config.lookahead.saturating_add(1);
            for next in (index..self.timeline.len()).take(ahead) {
                self.preload_index(next);
            }
            self.overlay.publish_sequence(index);
            tracing::debug!(sequence = index, "active sequence changed");
        }
        self.overlay.publish_frame(position.frame_index);

        let draw = self
            .timeline
            .get(index)
            .and_then(|desc| self.cache.get(&desc.id, position.frame_index))
            .map(|handle| self.renderer.draw(&mut self.surface, handle));

        TickReport {
            position: Some(position),
            sequence_changed,
            resized,
            draw,
            became_ready,
        }
    }

    /// Tick once per refresh until `stop` fires. Returns the number of ticks run.
    pub fn run<S, C>(&mut self, signal: &S, clock: &mut C, stop: &StopToken) -> u64
    where
        S: ScrollSignal + ?Sized,
        C: RefreshClock + ?Sized,
    {
        let mut ticks = 0u64;
        while !stop.is_stopped() {
            self.tick(signal.sample());
            ticks += 1;
            clock.wait_next();
        }
        tracing::debug!(ticks, "playback loop stopped");
        ticks
    }

    /// `true` once the first sequence is fully loaded (the intro gate).
    pub fn is_initial_ready(&self) -> bool {
        self.timeline
            .get(0)
            .is_some_and(|d| self.loader.load_state(&d.id).is_ready())
    }

    /// Loading indicator text, if anything is in flight.
    pub fn status_line(&self) -> Option<String> {
        self.loader.status_line()
    }

    /// Load state of the sequence at `index`.
    pub fn load_state(&self, index: usize) -> LoadState {
        self.timeline
            .get(index)
            .map_or(LoadState::NotRequested, |d| self.loader.load_state(&d.id))
    }

    /// Overlay observables; clone to hand to a UI.
    pub fn overlay(&self) -> &OverlayState {
        &self.overlay
    }

    /// Copy for the currently active sequence.
    pub fn overlay_text(&self) -> Option<OverlayText> {
        self.timeline
            .get(self.active?)
            .map(OverlayText::from)
    }

    /// Output surface.
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Frame cache.
    pub fn cache(&self) -> &FrameCache {
        &self.cache
    }

    /// Sequence timeline.
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Player settings.
    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Block until the sequence at `index` is ready or `timeout` elapses.
    pub fn wait_ready(&mut self, index: usize, timeout: Duration) -> bool {
        let Some(desc) = self.timeline.get(index) else {
            return false;
        };
        self.loader.wait_ready(&mut self.cache, &desc.id, timeout)
    }

    /// Preload the sequence at `index`; out-of-range indices are ignored.
    pub fn preload_index(&mut self, index: usize) -> Option<PreloadOutcome> {
        let desc = self.timeline.get(index)?;
        Some(self.loader.preload(&mut self.cache, desc))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/driver/playback.rs"]
mod tests;
