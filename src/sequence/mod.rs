//! Static sequence configuration: descriptors, the ordered timeline and the on-disk document.

pub(crate) mod config;
pub(crate) mod descriptor;
pub(crate) mod timeline;
