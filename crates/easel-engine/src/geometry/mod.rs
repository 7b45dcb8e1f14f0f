//! Path model and its conversion into device-space geometry.
//!
//! Backends never see `PathComponent`s directly: they receive a
//! [`DeviceGeometry`] of flattened subpaths already scaled to device pixels.

mod arc;
mod device;
mod path;

pub use arc::{arc_span, FULL_TURN};
pub(crate) use arc::arc_segments;
pub use device::{build_device_geometry, DeviceGeometry, Subpath, FLATTEN_TOLERANCE};
pub use path::{Path, PathComponent};
