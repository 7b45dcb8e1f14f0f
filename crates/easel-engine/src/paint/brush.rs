use crate::coords::{Transform, Vec2};

use super::{GradientStops, Rgba8, Style};

/// Color ramp capability of a backend's native gradient object.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum GradientSupport {
    /// Only a start and end color (e.g. GDI+ `LinearGradientBrush`).
    TwoStop,
    /// Arbitrary ascending stop lists.
    #[default]
    MultiStop,
}

/// A resolved gradient stop.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BrushStop {
    pub offset: f32,
    pub color: Rgba8,
}

/// Concrete, clamped paint description consumed by backends.
///
/// Gradient anchors are in the space of the style they were resolved from;
/// use [`DrawableBrush::transformed`] to move them into device space.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawableBrush {
    /// Paints nothing. Surfaces skip the draw entirely.
    Transparent,
    Solid(Rgba8),
    Linear {
        start: Vec2,
        end: Vec2,
        stops: Vec<BrushStop>,
    },
    Radial {
        center: Vec2,
        radius: f32,
        stops: Vec<BrushStop>,
    },
}

/// Resolves `style` into a brush for a backend with the given gradient support.
///
/// - solid colors are converted with saturating truncation
/// - a gradient without stops is [`DrawableBrush::Transparent`]
/// - a gradient with exactly one stop is a solid brush of that stop
/// - otherwise the first and last stop are remapped to offsets 0 and 1, and
///   the interior stops are kept only for [`GradientSupport::MultiStop`]
pub fn resolve(style: &Style, support: GradientSupport) -> DrawableBrush {
    match style {
        Style::Solid(color) => DrawableBrush::Solid(color.to_rgba8()),
        Style::LinearGradient(g) => match resolve_stops(&g.stops, support) {
            Ramp::Empty => DrawableBrush::Transparent,
            Ramp::Single(c) => DrawableBrush::Solid(c),
            Ramp::Stops(stops) => DrawableBrush::Linear { start: g.start, end: g.end, stops },
        },
        Style::RadialGradient(g) => match resolve_stops(&g.stops, support) {
            Ramp::Empty => DrawableBrush::Transparent,
            Ramp::Single(c) => DrawableBrush::Solid(c),
            Ramp::Stops(stops) => DrawableBrush::Radial { center: g.center, radius: g.radius, stops },
        },
    }
}

enum Ramp {
    Empty,
    Single(Rgba8),
    Stops(Vec<BrushStop>),
}

fn resolve_stops(stops: &GradientStops, support: GradientSupport) -> Ramp {
    let (Some(first), Some(last)) = (stops.first(), stops.last()) else {
        return Ramp::Empty;
    };
    if stops.len() == 1 {
        return Ramp::Single(first.color.to_rgba8());
    }

    let lo = first.offset;
    let span = last.offset - lo;
    let remap = |offset: f32| if span > 0.0 { (offset - lo) / span } else { 0.0 };

    let resolved = match support {
        GradientSupport::TwoStop => vec![
            BrushStop { offset: 0.0, color: first.color.to_rgba8() },
            BrushStop { offset: 1.0, color: last.color.to_rgba8() },
        ],
        GradientSupport::MultiStop => stops
            .as_slice()
            .iter()
            .map(|s| BrushStop { offset: remap(s.offset), color: s.color.to_rgba8() })
            .collect(),
    };
    Ramp::Stops(resolved)
}

impl DrawableBrush {
    /// False when drawing with this brush cannot change any pixel.
    #[inline]
    pub fn is_visible(&self) -> bool {
        !matches!(self, DrawableBrush::Transparent)
    }

    /// Maps gradient anchors through `transform`.
    pub fn transformed(&self, transform: &Transform) -> DrawableBrush {
        match self {
            DrawableBrush::Linear { start, end, stops } => DrawableBrush::Linear {
                start: transform.apply(*start),
                end: transform.apply(*end),
                stops: stops.clone(),
            },
            DrawableBrush::Radial { center, radius, stops } => DrawableBrush::Radial {
                center: transform.apply(*center),
                radius: radius * transform.mean_scale(),
                stops: stops.clone(),
            },
            other => other.clone(),
        }
    }

    /// Premultiplied color at `p`. Gradients pad beyond their end stops.
    pub fn sample(&self, p: Vec2) -> [f32; 4] {
        match self {
            DrawableBrush::Transparent => [0.0; 4],
            DrawableBrush::Solid(c) => c.premultiplied(),
            DrawableBrush::Linear { start, end, stops } => {
                let axis = *end - *start;
                let len2 = axis.dot(axis);
                let t = if len2 > 0.0 { (p - *start).dot(axis) / len2 } else { 1.0 };
                sample_ramp(stops, t)
            }
            DrawableBrush::Radial { center, radius, stops } => {
                let t = if *radius > 0.0 { (p - *center).length() / radius } else { 1.0 };
                sample_ramp(stops, t)
            }
        }
    }
}

fn sample_ramp(stops: &[BrushStop], t: f32) -> [f32; 4] {
    let (Some(first), Some(last)) = (stops.first(), stops.last()) else {
        return [0.0; 4];
    };
    let t = if t.is_nan() { 0.0 } else { t };
    if t <= first.offset {
        return first.color.premultiplied();
    }
    if t >= last.offset {
        return last.color.premultiplied();
    }

    let upper = stops.iter().position(|s| s.offset >= t).unwrap_or(stops.len() - 1);
    let (a, b) = (stops[upper.saturating_sub(1)], stops[upper]);
    let width = b.offset - a.offset;
    let local = if width > 0.0 { (t - a.offset) / width } else { 1.0 };

    let ca = a.color.premultiplied();
    let cb = b.color.premultiplied();
    [
        ca[0] + (cb[0] - ca[0]) * local,
        ca[1] + (cb[1] - ca[1]) * local,
        ca[2] + (cb[2] - ca[2]) * local,
        ca[3] + (cb[3] - ca[3]) * local,
    ]
}
