//! Easel engine crate.
//!
//! Immediate-mode 2D drawing shared by every rendering target: the path/style
//! model, the `Surface` contract, compositing on top of it, and texture
//! bookkeeping for GPU-backed surfaces.

pub mod coords;
pub mod geometry;
pub mod paint;
pub mod text;
pub mod resource;

pub mod surface;
pub mod composite;
pub mod texture;

pub mod raster;
pub mod device;
pub mod context;

pub mod error;
pub mod logging;

pub use context::{ContextConfig, RenderContext};
pub use error::{CanvasError, Result};
