/// Font request as issued by a drawing call.
#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    pub family: String,
    /// Em size in logical units.
    pub size: f32,
    pub weight: FontWeight,
    pub slant: FontSlant,
}

impl Font {
    pub fn new(family: impl Into<String>, size: f32) -> Self {
        Self {
            family: family.into(),
            size,
            weight: FontWeight::Normal,
            slant: FontSlant::Normal,
        }
    }

    pub fn with_weight(mut self, weight: FontWeight) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_slant(mut self, slant: FontSlant) -> Self {
        self.slant = slant;
        self
    }

    /// Em size in device pixels; never negative.
    #[inline]
    pub fn device_size(&self, scale: f32) -> f32 {
        let px = self.size * scale;
        if px.is_finite() { px.max(0.0) } else { 0.0 }
    }
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
    Bolder,
    Lighter,
}

impl FontWeight {
    #[inline]
    pub fn is_bold(self) -> bool {
        matches!(self, FontWeight::Bold | FontWeight::Bolder)
    }
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum FontSlant {
    #[default]
    Normal,
    Italic,
    Oblique,
}

impl FontSlant {
    #[inline]
    pub fn is_italic(self) -> bool {
        !matches!(self, FontSlant::Normal)
    }
}

/// Vertical anchor of the `y` coordinate passed to text calls.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum TextBaseline {
    Top,
    Hanging,
    Middle,
    #[default]
    Alphabetic,
    Ideographic,
    Bottom,
}

/// Horizontal anchor of the `x` coordinate passed to text calls.
///
/// Text is laid out left to right, so `Start` is `Left` and `End` is `Right`.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum TextAlign {
    #[default]
    Start,
    End,
    Left,
    Right,
    Center,
}

/// Measured extent in logical units.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct TextMetrics {
    pub width: f32,
    pub height: f32,
}
