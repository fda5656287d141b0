//! Cover-fit drawing onto a viewport-sized surface.

pub(crate) mod cover;
pub(crate) mod renderer;
pub(crate) mod surface;
