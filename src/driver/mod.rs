//! The per-refresh playback loop and its overlay observables.

pub(crate) mod overlay;
pub(crate) mod playback;
