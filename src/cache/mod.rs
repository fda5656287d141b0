//! Decoded frame storage.

pub(crate) mod frame;
pub(crate) mod frame_cache;
pub(crate) mod frame_set;
