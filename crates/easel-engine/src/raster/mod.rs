//! CPU rendering backend.
//!
//! Paths are flattened to device polygons and drawn into a premultiplied RGBA8
//! buffer with `tiny-skia`; clips are `tiny_skia::Mask`s kept on the state
//! stack.

mod paint;
mod surface;

pub use surface::RasterSurface;
