//! Paint model shared by the surface contract and all backends.
//!
//! Scope:
//! - straight-alpha input colors, clamped on conversion
//! - fill/stroke styles (solid, linear and radial gradients)
//! - resolution of a style into a backend-ready [`DrawableBrush`]

pub mod brush;
pub mod color;
pub mod gradient;
pub mod style;

pub use brush::{resolve, BrushStop, DrawableBrush, GradientSupport};
pub use color::{Color, Rgba8};
pub use gradient::{ColorStop, GradientStops, LinearGradient, RadialGradient};
pub use style::Style;
