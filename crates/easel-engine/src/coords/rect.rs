use super::Vec2;

/// Axis-aligned rectangle (top-left origin).
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub fn from_min_max(min: Vec2, max: Vec2) -> Self {
        Rect::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }

    #[inline]
    pub fn min(self) -> Vec2 {
        self.origin
    }

    #[inline]
    pub fn max(self) -> Vec2 {
        Vec2::new(self.origin.x + self.size.x, self.origin.y + self.size.y)
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }

    /// Normalizes the rectangle so width/height are non-negative.
    #[inline]
    pub fn normalized(self) -> Self {
        let (x, w) = if self.size.x < 0.0 {
            (self.origin.x + self.size.x, -self.size.x)
        } else {
            (self.origin.x, self.size.x)
        };
        let (y, h) = if self.size.y < 0.0 {
            (self.origin.y + self.size.y, -self.size.y)
        } else {
            (self.origin.y, self.size.y)
        };
        Rect::new(x, y, w, h)
    }

    /// Smallest rectangle containing both `self` and `p`.
    #[inline]
    pub fn include(self, p: Vec2) -> Rect {
        let min = self.min();
        let max = self.max();
        Rect::from_min_max(
            Vec2::new(min.x.min(p.x), min.y.min(p.y)),
            Vec2::new(max.x.max(p.x), max.y.max(p.y)),
        )
    }

    #[inline]
    pub fn intersect(self, other: Rect) -> Option<Rect> {
        let a = self.normalized();
        let b = other.normalized();

        let x0 = a.origin.x.max(b.origin.x);
        let y0 = a.origin.y.max(b.origin.y);
        let x1 = a.max().x.min(b.max().x);
        let y1 = a.max().y.min(b.max().y);

        if x1 - x0 <= 0.0 || y1 - y0 <= 0.0 {
            None
        } else {
            Some(Rect::new(x0, y0, x1 - x0, y1 - y0))
        }
    }

    /// Whole-pixel span `(x0, y0, x1, y1)` covering this rectangle, clamped to
    /// `[0, width) × [0, height)`. Returns `None` if nothing remains.
    pub fn pixel_bounds(self, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
        let r = self.normalized();
        if !r.origin.is_finite() || !r.size.is_finite() {
            return None;
        }
        let x0 = r.origin.x.floor().clamp(0.0, width as f32) as u32;
        let y0 = r.origin.y.floor().clamp(0.0, height as f32) as u32;
        let x1 = r.max().x.ceil().clamp(0.0, width as f32) as u32;
        let y1 = r.max().y.ceil().clamp(0.0, height as f32) as u32;
        if x1 <= x0 || y1 <= y0 { None } else { Some((x0, y0, x1, y1)) }
    }
}
