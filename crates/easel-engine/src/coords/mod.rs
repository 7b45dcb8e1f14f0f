//! Coordinate and geometry primitives shared by the path model and backends.
//!
//! Canonical spaces:
//! - user space: logical units as supplied by the caller
//! - device space: pixels actually allocated (user space × display scale)
//!
//! Both use a top-left origin with +X right and +Y down, so increasing angles
//! turn clockwise on screen.

mod rect;
mod transform;
mod vec2;

pub use rect::Rect;
pub use transform::Transform;
pub use vec2::Vec2;
