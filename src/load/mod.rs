//! Frame sources and the concurrent sequence loader.

pub(crate) mod loader;
pub(crate) mod source;
