//! Scroll offset to playback position mapping.

pub(crate) mod mapper;
