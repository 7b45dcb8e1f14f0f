use crate::coords::{Rect, Transform, Vec2};

use super::arc::{arc_segments, arc_span};
use super::{Path, PathComponent};

/// Maximum distance, in device pixels, between a flattened arc and the true curve.
pub const FLATTEN_TOLERANCE: f32 = 0.25;

/// A flattened subpath in device pixels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Subpath {
    pub points: Vec<Vec2>,
    pub closed: bool,
}

impl Subpath {
    fn starting_at(p: Vec2) -> Self {
        Self { points: vec![p], closed: false }
    }

    fn push(&mut self, p: Vec2) {
        if self.points.last() != Some(&p) {
            self.points.push(p);
        }
    }

    /// A subpath needs at least two distinct points to contribute any pixels.
    #[inline]
    pub fn is_drawable(&self) -> bool {
        self.points.len() >= 2
    }
}

/// Backend-facing geometry: every path component converted into line
/// segments at device-pixel scale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceGeometry {
    pub subpaths: Vec<Subpath>,
}

/// Converts `path` into device geometry for a surface at `display_scale`.
pub fn build_device_geometry(path: &Path, display_scale: f32) -> DeviceGeometry {
    DeviceGeometry::build(path, &Transform::scale(display_scale, display_scale))
}

impl DeviceGeometry {
    /// Converts `path` from user space with `to_device`.
    pub fn build(path: &Path, to_device: &Transform) -> Self {
        let mut builder = Builder::new(*to_device);
        for component in path.components() {
            match *component {
                PathComponent::MoveTo(p) => builder.move_to(p),
                PathComponent::LineTo(p) => builder.line_to(p),
                PathComponent::Close => builder.close(),
                PathComponent::Arc { center, radius, start_angle, end_angle, anticlockwise } => {
                    builder.arc(center, radius, start_angle, end_angle, anticlockwise)
                }
            }
        }
        builder.finish()
    }

    /// Subpaths that contribute pixels.
    pub fn drawable(&self) -> impl Iterator<Item = &Subpath> {
        self.subpaths.iter().filter(|s| s.is_drawable())
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.drawable().next().is_none()
    }

    /// Bounding box of all drawable points, or `None` when nothing is drawable.
    pub fn bounds(&self) -> Option<Rect> {
        let mut points = self.drawable().flat_map(|s| s.points.iter().copied());
        let first = points.next()?;
        Some(points.fold(Rect::new(first.x, first.y, 0.0, 0.0), Rect::include))
    }
}

struct Builder {
    to_device: Transform,
    tolerance_scale: f32,
    done: Vec<Subpath>,
    open: Option<Subpath>,
    /// Current position in user space.
    position: Vec2,
}

impl Builder {
    fn new(to_device: Transform) -> Self {
        Self {
            to_device,
            tolerance_scale: to_device.mean_scale(),
            done: Vec::new(),
            open: None,
            position: Vec2::zero(),
        }
    }

    fn flush(&mut self) {
        if let Some(subpath) = self.open.take() {
            self.done.push(subpath);
        }
    }

    fn move_to(&mut self, p: Vec2) {
        self.flush();
        self.open = Some(Subpath::starting_at(self.to_device.apply(p)));
        self.position = p;
    }

    /// Appends a device point to the open subpath, opening one at the
    /// current position if needed.
    fn extend(&mut self, device: Vec2) {
        let start = self.to_device.apply(self.position);
        self.open
            .get_or_insert_with(|| Subpath::starting_at(start))
            .push(device);
    }

    fn line_to(&mut self, p: Vec2) {
        self.extend(self.to_device.apply(p));
        self.position = p;
    }

    fn close(&mut self) {
        if let Some(subpath) = self.open.as_mut() {
            subpath.closed = true;
        }
        // The current position is left where it is; the next segment starts a
        // fresh subpath from there.
        self.flush();
    }

    fn arc(&mut self, center: Vec2, radius: f32, start: f32, end: f32, anticlockwise: bool) {
        if radius <= 0.0 || !radius.is_finite() || !center.is_finite() {
            self.line_to(center);
            return;
        }

        let span = arc_span(start, end, anticlockwise);
        let begin = center + Vec2::from_angle(start) * radius;

        // Without an open subpath the arc starts one at its own first point;
        // otherwise it is joined to the current point by a line.
        if self.open.is_none() {
            self.position = begin;
        }
        self.extend(self.to_device.apply(begin));

        let device_radius = radius * self.tolerance_scale;
        let steps = arc_segments(device_radius, span, FLATTEN_TOLERANCE);
        for i in 1..=steps {
            let angle = start + span * (i as f32 / steps as f32);
            let p = center + Vec2::from_angle(angle) * radius;
            self.extend(self.to_device.apply(p));
        }

        self.position = center + Vec2::from_angle(start + span) * radius;
    }

    fn finish(mut self) -> DeviceGeometry {
        self.flush();
        DeviceGeometry { subpaths: self.done }
    }
}
