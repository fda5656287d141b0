use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc,
    },
    time::{Duration, Instant},
};

use crate::{
    cache::{
        frame::{FrameHandle, decode_frame},
        frame_cache::FrameCache,
    },
    foundation::error::{ReelError, ReelResult},
    load::source::FrameSource,
    sequence::descriptor::SequenceDescriptor,
};

const WAIT_POLL: Duration = Duration::from_millis(25);

/// Loading progress of one sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadState {
    /// `preload` was never called for this sequence.
    NotRequested,
    /// Fetches are outstanding.
    InFlight {
        /// Frames decoded so far.
        loaded: u32,
        /// Frames failed (or timed out) so far.
        failed: u32,
    },
    /// Every frame settled and the frame set was gap-filled.
    Ready {
        /// Frames holding their own image.
        loaded: u32,
        /// Frames drawn from an earlier frame instead.
        failed: u32,
    },
}

impl LoadState {
    /// `true` for [`LoadState::Ready`].
    pub fn is_ready(self) -> bool {
        matches!(self, Self::Ready { .. })
    }
}

/// Result of a [`SequenceLoader::preload`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PreloadOutcome {
    /// Fetches were issued by this call.
    Issued,
    /// A previous call is still loading; nothing was re-issued.
    AlreadyInFlight,
    /// The sequence is already loaded; nothing was re-issued.
    AlreadyReady,
}

/// Loader tuning.
#[derive(Clone, Debug, Default)]
pub struct LoaderOpts {
    /// Fetch pool width; `None` uses rayon's default.
    pub threads: Option<usize>,
    /// Frames whose fetch has been running this long without settling count as failed.
    ///
    /// Frames still queued behind a busy pool are not timed.
    pub frame_timeout: Option<Duration>,
}

enum FetchEvent {
    Started {
        sequence_id: Arc<str>,
        frame_index: u32,
        at: Instant,
    },
    Finished(Completion),
}

struct Completion {
    sequence_id: Arc<str>,
    frame_index: u32,
    result: ReelResult<FrameHandle>,
}

struct Batch {
    label: String,
    total: u32,
    loaded: u32,
    failed: u32,
    started: Vec<Option<Instant>>,
    ready: bool,
}

impl Batch {
    fn state(&self) -> LoadState {
        if self.ready {
            LoadState::Ready {
                loaded: self.loaded,
                failed: self.failed,
            }
        } else {
            LoadState::InFlight {
                loaded: self.loaded,
                failed: self.failed,
            }
        }
    }
}

/// Concurrent, best-effort frame loader.
///
/// Each preload spawns one fetch+decode job per frame on a private rayon pool. Jobs report back
/// over a channel; [`pump`](Self::pump) applies their results to the caller's [`FrameCache`] on
/// the caller's thread, so the cache is never shared across threads. Individual failures are
/// logged and gap-filled, never returned.
pub struct SequenceLoader {
    source: Arc<dyn FrameSource>,
    pool: rayon::ThreadPool,
    opts: LoaderOpts,
    tx: mpsc::Sender<FetchEvent>,
    rx: mpsc::Receiver<FetchEvent>,
    batches: HashMap<String, Batch>,
    issue_order: Vec<String>,
    cancelled: Arc<AtomicBool>,
}

impl std::fmt::Debug for SequenceLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequenceLoader")
            .field("pool_threads", &self.pool.current_num_threads())
            .field("opts", &self.opts)
            .field("sequences", &self.issue_order)
            .finish()
    }
}

impl SequenceLoader {
    /// Create a loader fetching from `source`.
    pub fn new(source: Arc<dyn FrameSource>, opts: LoaderOpts) -> ReelResult<Self> {
        let pool = build_thread_pool(opts.threads)?;
        let (tx, rx) = mpsc::channel();
        Ok(Self {
            source,
            pool,
            opts,
            tx,
            rx,
            batches: HashMap::new(),
            issue_order: Vec::new(),
            cancelled: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Start loading every frame of `desc`. Idempotent per sequence id.
    #[tracing::instrument(skip(self, cache, desc), fields(sequence = %desc.id))]
    pub fn preload(&mut self, cache: &mut FrameCache, desc: &SequenceDescriptor) -> PreloadOutcome {
        if let Some(batch) = self.batches.get(&desc.id) {
            return if batch.ready {
                PreloadOutcome::AlreadyReady
            } else {
                PreloadOutcome::AlreadyInFlight
            };
        }

        cache.ensure(&desc.id, desc.total_frames);
        self.batches.insert(
            desc.id.clone(),
            Batch {
                label: desc.label.clone(),
                total: desc.total_frames,
                loaded: 0,
                failed: 0,
                started: vec![None; desc.total_frames as usize],
                ready: false,
            },
        );
        self.issue_order.push(desc.id.clone());

        let sequence_id: Arc<str> = Arc::from(desc.id.as_str());
        for frame_index in 0..desc.total_frames {
            let locator = desc.frame_url(frame_index);
            let source = Arc::clone(&self.source);
            let tx = self.tx.clone();
            let cancelled = Arc::clone(&self.cancelled);
            let sequence_id = Arc::clone(&sequence_id);
            self.pool.spawn(move || {
                if cancelled.load(Ordering::Relaxed) {
                    return;
                }
                // The receiver is gone once the loader is dropped; nothing left to update.
                let _ = tx.send(FetchEvent::Started {
                    sequence_id: Arc::clone(&sequence_id),
                    frame_index,
                    at: Instant::now(),
                });
                let result = source
                    .fetch(&locator)
                    .and_then(|bytes| decode_frame(frame_index, &bytes));
                let _ = tx.send(FetchEvent::Finished(Completion {
                    sequence_id,
                    frame_index,
                    result,
                }));
            });
        }

        tracing::info!(frames = desc.total_frames, "preload issued");
        PreloadOutcome::Issued
    }

    /// Apply finished fetches to `cache`, expire stalled frames and finalize settled batches.
    ///
    /// Returns the ids of sequences that became ready during this call.
    pub fn pump(&mut self, cache: &mut FrameCache) -> Vec<String> {
        while let Ok(event) = self.rx.try_recv() {
            self.handle(cache, event);
        }
        self.expire_stalled(cache, Instant::now());
        self.finalize(cache)
    }

    /// Pump until `sequence_id` is ready or `timeout` elapses. Returns whether it is ready.
    ///
    /// Sequences that were never preloaded return `false` immediately.
    pub fn wait_ready(
        &mut self,
        cache: &mut FrameCache,
        sequence_id: &str,
        timeout: Duration,
    ) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            self.pump(cache);
            match self.load_state(sequence_id) {
                LoadState::Ready { .. } => return true,
                LoadState::NotRequested => return false,
                LoadState::InFlight { .. } => {}
            }

            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let wait = (deadline - now).min(WAIT_POLL);
            if let Ok(event) = self.rx.recv_timeout(wait) {
                self.handle(cache, event);
            }
        }
    }

    /// Current state of `sequence_id`.
    pub fn load_state(&self, sequence_id: &str) -> LoadState {
        self.batches
            .get(sequence_id)
            .map_or(LoadState::NotRequested, Batch::state)
    }

    /// Settled fraction of `sequence_id` in `[0, 1]`; 0 when never requested.
    pub fn progress(&self, sequence_id: &str) -> f64 {
        let Some(b) = self.batches.get(sequence_id) else {
            return 0.0;
        };
        if b.ready || b.total == 0 {
            return 1.0;
        }
        f64::from(b.loaded + b.failed) / f64::from(b.total)
    }

    /// Human-readable indicator for the oldest sequence still loading, if any.
    pub fn status_line(&self) -> Option<String> {
        self.issue_order
            .iter()
            .filter_map(|id| self.batches.get(id))
            .find(|b| !b.ready)
            .map(|b| format!("Loading {}...", b.label))
    }

    /// `true` when no batch is in flight.
    pub fn is_idle(&self) -> bool {
        self.batches.values().all(|b| b.ready)
    }

    fn handle(&mut self, cache: &mut FrameCache, event: FetchEvent) {
        match event {
            FetchEvent::Started {
                sequence_id,
                frame_index,
                at,
            } => {
                if let Some(slot) = self
                    .batches
                    .get_mut(&*sequence_id)
                    .and_then(|b| b.started.get_mut(frame_index as usize))
                {
                    *slot = Some(at);
                }
            }
            FetchEvent::Finished(c) => self.apply(cache, c),
        }
    }

    fn apply(&mut self, cache: &mut FrameCache, c: Completion) {
        let id: &str = &c.sequence_id;
        let Some(batch) = self.batches.get_mut(id) else {
            return;
        };
        let already_settled = cache
            .frame_set(id)
            .is_none_or(|set| set.is_settled(c.frame_index));
        if already_settled {
            tracing::debug!(sequence = id, frame = c.frame_index, "late completion ignored");
            return;
        }

        match c.result {
            Ok(handle) => {
                if cache.store(id, c.frame_index, handle) {
                    batch.loaded += 1;
                }
            }
            Err(e) => {
                tracing::debug!(sequence = id, frame = c.frame_index, error = %e, "frame failed");
                if cache.mark_failed(id, c.frame_index) {
                    batch.failed += 1;
                }
            }
        }
    }

    fn expire_stalled(&mut self, cache: &mut FrameCache, now: Instant) {
        let Some(timeout) = self.opts.frame_timeout else {
            return;
        };
        for (id, batch) in &mut self.batches {
            if batch.ready {
                continue;
            }
            let stalled: Vec<u32> = cache
                .frame_set(id)
                .map(|set| {
                    set.unsettled()
                        .filter(|&i| {
                            batch
                                .started
                                .get(i as usize)
                                .copied()
                                .flatten()
                                .is_some_and(|at| now.duration_since(at) >= timeout)
                        })
                        .collect()
                })
                .unwrap_or_default();
            if stalled.is_empty() {
                continue;
            }
            for i in &stalled {
                if cache.mark_failed(id, *i) {
                    batch.failed += 1;
                }
            }
            tracing::warn!(
                sequence = id.as_str(),
                frames = stalled.len(),
                timeout_ms = timeout.as_millis() as u64,
                "frames timed out; treating as failed"
            );
        }
    }

    fn finalize(&mut self, cache: &mut FrameCache) -> Vec<String> {
        let mut ready = Vec::new();
        for id in &self.issue_order {
            let Some(batch) = self.batches.get_mut(id) else {
                continue;
            };
            if batch.ready {
                continue;
            }
            let complete = cache.frame_set(id).is_some_and(|set| set.is_complete());
            if !complete {
                continue;
            }
            let filled = cache.gap_fill(id);
            batch.ready = true;
            tracing::info!(
                sequence = id.as_str(),
                loaded = batch.loaded,
                failed = batch.failed,
                filled,
                "sequence ready"
            );
            ready.push(id.clone());
        }
        ready
    }
}

impl Drop for SequenceLoader {
    fn drop(&mut self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }
}

fn build_thread_pool(threads: Option<usize>) -> ReelResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(ReelError::validation(
            "loader 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new().thread_name(|i| format!("reel-fetch-{i}"));
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| ReelError::validation(format!("failed to build fetch thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/load/loader.rs"]
mod tests;
