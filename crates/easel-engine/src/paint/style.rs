use crate::coords::Vec2;

use super::{Color, LinearGradient, RadialGradient};

/// Fill or stroke style.
#[derive(Debug, Clone, PartialEq)]
pub enum Style {
    Solid(Color),
    LinearGradient(LinearGradient),
    RadialGradient(RadialGradient),
}

impl Default for Style {
    fn default() -> Self {
        Style::Solid(Color::black())
    }
}

impl From<Color> for Style {
    fn from(color: Color) -> Self {
        Style::Solid(color)
    }
}

impl Style {
    #[inline]
    pub fn solid(color: Color) -> Self {
        Style::Solid(color)
    }

    /// Linear gradient from `(x0, y0)` to `(x1, y1)` with no stops yet.
    pub fn linear_gradient(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Style::LinearGradient(LinearGradient::new(Vec2::new(x0, y0), Vec2::new(x1, y1)))
    }

    /// Radial gradient centered at `(x, y)` with no stops yet.
    pub fn radial_gradient(x: f32, y: f32, radius: f32) -> Self {
        Style::RadialGradient(RadialGradient::new(Vec2::new(x, y), radius))
    }

    /// Adds a stop to a gradient style. Solid styles ignore the call.
    pub fn add_color_stop(&mut self, offset: f32, color: Color) -> &mut Self {
        match self {
            Style::Solid(_) => {}
            Style::LinearGradient(g) => {
                g.stops.add(offset, color);
            }
            Style::RadialGradient(g) => {
                g.stops.add(offset, color);
            }
        }
        self
    }

    /// Number of gradient stops; zero for solid styles.
    pub fn stop_count(&self) -> usize {
        match self {
            Style::Solid(_) => 0,
            Style::LinearGradient(g) => g.stops.len(),
            Style::RadialGradient(g) => g.stops.len(),
        }
    }

    #[inline]
    pub fn is_gradient(&self) -> bool {
        !matches!(self, Style::Solid(_))
    }
}
