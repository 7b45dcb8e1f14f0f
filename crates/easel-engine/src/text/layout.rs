use fontdue::layout::{CoordinateSystem, GlyphRasterConfig, Layout, LayoutSettings, TextStyle};

use crate::coords::Vec2;

use super::{Font, FontId, FontSystem, TextAlign, TextBaseline, TextMetrics};

/// A glyph bitmap placed relative to the top-left of the laid-out line.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PositionedGlyph {
    pub key: GlyphRasterConfig,
    pub x: f32,
    pub y: f32,
    pub width: usize,
    pub height: usize,
}

/// One line of text laid out in device pixels.
///
/// Both measurement and drawing read this, so a measured width always matches
/// the drawn glyph positions.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLayout {
    /// Font used, or `None` when the system has no fonts.
    pub font: Option<FontId>,
    pub glyphs: Vec<PositionedGlyph>,
    /// Pen advance extent of the line.
    pub width: f32,
    /// Distance from the line top to the baseline.
    pub ascent: f32,
    /// Baseline to line bottom, negative below the baseline.
    pub descent: f32,
}

impl TextLayout {
    #[inline]
    pub fn height(&self) -> f32 {
        self.ascent - self.descent
    }

    /// Offset from the text anchor to the line's top-left corner.
    pub fn anchor_offset(&self, baseline: TextBaseline, align: TextAlign) -> Vec2 {
        let dx = match align {
            TextAlign::Start | TextAlign::Left => 0.0,
            TextAlign::End | TextAlign::Right => -self.width,
            TextAlign::Center => -self.width * 0.5,
        };
        // How far the baseline sits below the anchor.
        let baseline_below = match baseline {
            TextBaseline::Top => self.ascent,
            TextBaseline::Hanging => self.ascent * 0.8,
            TextBaseline::Middle => (self.ascent + self.descent) * 0.5,
            TextBaseline::Alphabetic => 0.0,
            TextBaseline::Ideographic | TextBaseline::Bottom => self.descent,
        };
        Vec2::new(dx, baseline_below - self.ascent)
    }

    /// Extent converted back to logical units.
    pub fn metrics(&self, scale: f32) -> TextMetrics {
        if !(scale > 0.0) {
            return TextMetrics::default();
        }
        TextMetrics { width: self.width / scale, height: self.height() / scale }
    }
}

/// Lays out `text` with the face resolved for `font`, at `font.size * scale`
/// device pixels.
pub fn layout_text(fonts: &FontSystem, font: &Font, text: &str, scale: f32) -> TextLayout {
    let px = font.device_size(scale);
    let fallback = TextLayout {
        font: None,
        glyphs: Vec::new(),
        width: 0.0,
        ascent: px,
        descent: -px * 0.2,
    };

    let Some(id) = fonts.resolve(font) else {
        return fallback;
    };
    let Some(face) = fonts.get(id) else {
        return fallback;
    };
    if px <= 0.0 {
        return TextLayout { font: Some(id), ascent: 0.0, descent: 0.0, ..fallback };
    }

    let (ascent, descent) = face
        .horizontal_line_metrics(px)
        .map(|m| (m.ascent, m.descent))
        .unwrap_or((fallback.ascent, fallback.descent));

    let mut layout: Layout<()> = Layout::new(CoordinateSystem::PositiveYDown);
    layout.reset(&LayoutSettings::default());
    layout.append(&[face], &TextStyle::new(text, px, 0));

    let raw = layout.glyphs();
    // Advance extent rather than bitmap extent, so trailing spaces count.
    let width = raw
        .iter()
        .map(|g| {
            let m = face.metrics_indexed(g.key.glyph_index, px);
            (g.x - m.xmin as f32 + m.advance_width).max(0.0)
        })
        .fold(0.0f32, f32::max);

    let glyphs = raw
        .iter()
        .filter(|g| g.char_data.rasterize() && g.width > 0 && g.height > 0)
        .map(|g| PositionedGlyph { key: g.key, x: g.x, y: g.y, width: g.width, height: g.height })
        .collect();

    TextLayout { font: Some(id), glyphs, width, ascent, descent }
}
