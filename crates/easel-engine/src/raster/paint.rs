use tiny_skia::{
    Color, GradientStop, LineCap, LineJoin, LinearGradient, Paint, PathBuilder, Point, RadialGradient,
    Shader, SpreadMode, Stroke, Transform,
};

use crate::coords::Vec2;
use crate::geometry::DeviceGeometry;
use crate::paint::{BrushStop, DrawableBrush, Rgba8};
use crate::surface::Operator;

/// Canvas default miter limit.
const MITER_LIMIT: f32 = 10.0;

/// Builds a device-space path from flattened geometry.
///
/// Non-finite points are dropped. Returns `None` when nothing drawable is left.
pub(crate) fn build_path(geometry: &DeviceGeometry) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    for subpath in geometry.drawable() {
        let mut points = subpath.points.iter().filter(|p| p.is_finite());
        let Some(first) = points.next() else {
            continue;
        };
        pb.move_to(first.x, first.y);
        for p in points {
            pb.line_to(p.x, p.y);
        }
        if subpath.closed {
            pb.close();
        }
    }
    pb.finish()
}

/// Butt caps and miter joins, like a fresh canvas state.
pub(crate) fn stroke(width: f32) -> Stroke {
    Stroke {
        width,
        miter_limit: MITER_LIMIT,
        line_cap: LineCap::Butt,
        line_join: LineJoin::Miter,
        dash: None,
    }
}

/// Paint for a device-space brush, with `alpha` folded into the colors.
///
/// `None` means the draw cannot change any pixel.
pub(crate) fn paint_for(brush: &DrawableBrush, op: Operator, alpha: f32) -> Option<Paint<'static>> {
    if alpha <= 0.0 {
        return None;
    }
    let shader = match brush {
        DrawableBrush::Transparent => return None,
        DrawableBrush::Solid(c) => Shader::SolidColor(color(*c, alpha)),
        DrawableBrush::Linear { start, end, stops } => LinearGradient::new(
            point(*start),
            point(*end),
            gradient_stops(stops, alpha),
            SpreadMode::Pad,
            Transform::identity(),
        )
        .or_else(|| end_color(stops, alpha))?,
        DrawableBrush::Radial { center, radius, stops } => RadialGradient::new(
            point(*center),
            point(*center),
            *radius,
            gradient_stops(stops, alpha),
            SpreadMode::Pad,
            Transform::identity(),
        )
        // A zero radius paints everything at or beyond the ramp end.
        .or_else(|| end_color(stops, alpha))?,
    };

    Some(Paint {
        shader,
        blend_mode: op.into(),
        anti_alias: true,
        ..Paint::default()
    })
}

fn color(c: Rgba8, alpha: f32) -> Color {
    let mut color = Color::from_rgba8(c.r, c.g, c.b, c.a);
    color.apply_opacity(alpha);
    color
}

fn point(v: Vec2) -> Point {
    Point::from_xy(v.x, v.y)
}

fn gradient_stops(stops: &[BrushStop], alpha: f32) -> Vec<GradientStop> {
    stops
        .iter()
        .map(|s| GradientStop::new(s.offset, color(s.color, alpha)))
        .collect()
}

fn end_color(stops: &[BrushStop], alpha: f32) -> Option<Shader<'static>> {
    stops.last().map(|s| Shader::SolidColor(color(s.color, alpha)))
}
