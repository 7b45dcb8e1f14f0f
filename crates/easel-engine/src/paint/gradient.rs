use crate::coords::Vec2;

use super::Color;

/// A single gradient stop.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ColorStop {
    pub offset: f32,
    pub color: Color,
}

impl ColorStop {
    #[inline]
    pub const fn new(offset: f32, color: Color) -> Self {
        Self { offset, color }
    }
}

/// Offset → color mapping of a gradient.
///
/// Invariants:
/// - offsets are unique: adding an existing offset replaces its color
/// - stops are kept in ascending offset order
/// - offsets are clamped to `[0, 1]`; non-finite offsets are ignored
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GradientStops {
    stops: Vec<ColorStop>,
}

impl GradientStops {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the stop at `offset`.
    pub fn add(&mut self, offset: f32, color: Color) -> &mut Self {
        if !offset.is_finite() {
            log::debug!("ignoring gradient stop with non-finite offset {offset}");
            return self;
        }
        // `+ 0.0` folds -0.0 into 0.0 so it cannot sort as a separate key.
        let offset = offset.clamp(0.0, 1.0) + 0.0;
        match self.stops.binary_search_by(|s| s.offset.total_cmp(&offset)) {
            Ok(i) => self.stops[i].color = color,
            Err(i) => self.stops.insert(i, ColorStop::new(offset, color)),
        }
        self
    }

    #[inline]
    pub fn as_slice(&self) -> &[ColorStop] {
        &self.stops
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    #[inline]
    pub fn first(&self) -> Option<&ColorStop> {
        self.stops.first()
    }

    #[inline]
    pub fn last(&self) -> Option<&ColorStop> {
        self.stops.last()
    }
}

impl FromIterator<(f32, Color)> for GradientStops {
    fn from_iter<I: IntoIterator<Item = (f32, Color)>>(iter: I) -> Self {
        let mut stops = GradientStops::new();
        for (offset, color) in iter {
            stops.add(offset, color);
        }
        stops
    }
}

/// Linear gradient between two points in user space.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearGradient {
    pub start: Vec2,
    pub end: Vec2,
    pub stops: GradientStops,
}

impl LinearGradient {
    pub fn new(start: Vec2, end: Vec2) -> Self {
        Self { start, end, stops: GradientStops::new() }
    }
}

/// Radial gradient from `center` out to `radius`, in user space.
#[derive(Debug, Clone, PartialEq)]
pub struct RadialGradient {
    pub center: Vec2,
    pub radius: f32,
    pub stops: GradientStops,
}

impl RadialGradient {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius, stops: GradientStops::new() }
    }
}
