use bytemuck::{Pod, Zeroable};

/// Straight-alpha RGBA color as supplied by callers.
///
/// Components are nominally in `[0, 1]`, but producers may pass anything;
/// every conversion clamps rather than rejecting.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Color {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
    pub alpha: f32,
}

impl Color {
    #[inline]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self { red, green, blue, alpha }
    }

    #[inline]
    pub const fn transparent() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    #[inline]
    pub const fn black() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }

    #[inline]
    pub const fn white() -> Self {
        Self::new(1.0, 1.0, 1.0, 1.0)
    }

    /// Creates a color from straight sRGB bytes (`0`–`255`).
    #[inline]
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, a as f32 / 255.0)
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.red.is_finite() && self.green.is_finite() && self.blue.is_finite() && self.alpha.is_finite()
    }

    /// Clamps every channel to `[0, 1]`; NaN becomes 0.
    #[inline]
    pub fn clamped(self) -> Self {
        fn c(v: f32) -> f32 {
            if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
        }
        Self::new(c(self.red), c(self.green), c(self.blue), c(self.alpha))
    }

    /// Converts to 8-bit channels.
    ///
    /// Each channel is scaled to `0..=255` and truncated toward zero, then
    /// saturated: `1.0` maps to 255, anything negative to 0, anything above
    /// 1.0 to 255. This is a saturating clamp, not rounding.
    #[inline]
    pub fn to_rgba8(self) -> Rgba8 {
        fn channel(v: f32) -> u8 {
            // `as i32` truncates toward zero and maps NaN to 0.
            ((v * 255.0) as i32).clamp(0, 255) as u8
        }
        Rgba8 {
            r: channel(self.red),
            g: channel(self.green),
            b: channel(self.blue),
            a: channel(self.alpha),
        }
    }
}

/// Straight-alpha 8-bit color produced by style resolution.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const TRANSPARENT: Rgba8 = Rgba8 { r: 0, g: 0, b: 0, a: 0 };

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Premultiplied `[r, g, b, a]` in `[0, 1]`.
    #[inline]
    pub fn premultiplied(self) -> [f32; 4] {
        let a = self.a as f32 / 255.0;
        [
            self.r as f32 / 255.0 * a,
            self.g as f32 / 255.0 * a,
            self.b as f32 / 255.0 * a,
            a,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_channels_saturate() {
        // Inputs are on the 0..1 scale, so -10 and 300 are far outside it.
        let c = Color::new(-10.0, 300.0, 0.5, 1.0).to_rgba8();
        assert_eq!(c, Rgba8::new(0, 255, 127, 255));
    }

    #[test]
    fn one_maps_to_max_and_values_truncate() {
        assert_eq!(Color::new(1.0, 0.999, 0.0, 1.0).to_rgba8(), Rgba8::new(255, 254, 0, 255));
    }

    #[test]
    fn nan_channel_maps_to_zero() {
        assert_eq!(Color::new(f32::NAN, 0.0, 0.0, 1.0).to_rgba8().r, 0);
        assert_eq!(Color::new(f32::NAN, 2.0, -1.0, 0.5).clamped(), Color::new(0.0, 1.0, 0.0, 0.5));
    }

    #[test]
    fn premultiplied_scales_by_alpha() {
        let p = Rgba8::new(255, 0, 255, 51).premultiplied();
        assert!((p[0] - 0.2).abs() < 1e-6);
        assert_eq!(p[1], 0.0);
        assert!((p[3] - 0.2).abs() < 1e-6);
    }
}
