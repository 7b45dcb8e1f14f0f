//! Whole-surface pixel operations built only on [`Surface::lock_memory`].
//!
//! They work on every backend because they never touch native resources;
//! GPU surfaces pick the change up on their next flush.

use crate::error::Result;
use crate::paint::Color;
use crate::surface::Surface;

/// Box passes used by [`Compositing::blur`] to approximate a Gaussian.
const BOX_PASSES: usize = 3;

/// Pixel-level compositing available on every [`Surface`].
pub trait Compositing: Surface {
    /// Replaces every pixel's color with `color`, weighted by the pixel's
    /// existing alpha. Alpha is left as is.
    fn color_fill(&mut self, color: &Color) -> Result<()> {
        let c = color.clamped();
        let mut lock = self.lock_memory(true)?;
        if let Some(pixels) = lock.pixels_mut() {
            for px in pixels.chunks_exact_mut(4) {
                let a = px[3] as f32;
                px[0] = (c.red * a + 0.5) as u8;
                px[1] = (c.green * a + 0.5) as u8;
                px[2] = (c.blue * a + 0.5) as u8;
            }
        }
        Ok(())
    }

    /// Multiplies color channels by `color`. Alpha is left as is.
    fn multiply(&mut self, color: &Color) -> Result<()> {
        let c = color.clamped();
        let mut lock = self.lock_memory(true)?;
        if let Some(pixels) = lock.pixels_mut() {
            for px in pixels.chunks_exact_mut(4) {
                px[0] = (px[0] as f32 * c.red + 0.5) as u8;
                px[1] = (px[1] as f32 * c.green + 0.5) as u8;
                px[2] = (px[2] as f32 * c.blue + 0.5) as u8;
            }
        }
        Ok(())
    }

    /// Approximate Gaussian blur with standard deviation `radius / 2`.
    ///
    /// Three box passes per axis, horizontal first. Each pass is linear in
    /// the pixel count regardless of `radius`.
    fn blur(&mut self, radius: f32) -> Result<()> {
        if !(radius > 0.0) || !radius.is_finite() {
            return Ok(());
        }
        let box_radius = box_radius_for(radius * 0.5);
        let mut lock = self.lock_memory(true)?;
        let (w, h) = (lock.width() as usize, lock.height() as usize);
        let edge = Edge::for_alpha(lock.has_alpha());
        if let Some(pixels) = lock.pixels_mut() {
            let mut plane = to_plane(pixels);
            for _ in 0..BOX_PASSES {
                box_pass(&mut plane, w, h, box_radius, Axis::Horizontal, edge);
            }
            for _ in 0..BOX_PASSES {
                box_pass(&mut plane, w, h, box_radius, Axis::Vertical, edge);
            }
            from_plane(&plane, pixels, 1.0, edge);
        }
        Ok(())
    }

    /// Separable Gaussian blur with independent radii, result scaled by
    /// `alpha`.
    ///
    /// On surfaces without alpha only the color channels are scaled.
    ///
    /// Cost grows with the radius; prefer [`Compositing::blur`] for large
    /// radii.
    fn slow_blur(&mut self, h_radius: f32, v_radius: f32, alpha: f32) -> Result<()> {
        let alpha = if alpha.is_nan() { 0.0 } else { alpha.clamp(0.0, 1.0) };
        let mut lock = self.lock_memory(true)?;
        let (w, h) = (lock.width() as usize, lock.height() as usize);
        let edge = Edge::for_alpha(lock.has_alpha());
        if let Some(pixels) = lock.pixels_mut() {
            let mut plane = to_plane(pixels);
            if let Some(kernel) = gaussian_kernel(h_radius) {
                convolve(&mut plane, w, h, &kernel, Axis::Horizontal, edge);
            }
            if let Some(kernel) = gaussian_kernel(v_radius) {
                convolve(&mut plane, w, h, &kernel, Axis::Vertical, edge);
            }
            from_plane(&plane, pixels, alpha, edge);
        }
        Ok(())
    }
}

impl<S: Surface + ?Sized> Compositing for S {}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    /// `(line count, line length, index of sample k on line l)`.
    #[inline]
    fn lines(self, w: usize, h: usize) -> (usize, usize, impl Fn(usize, usize) -> usize) {
        let horizontal = self == Axis::Horizontal;
        let (count, len) = if horizontal { (h, w) } else { (w, h) };
        (count, len, move |line, k| if horizontal { line * w + k } else { k * w + line })
    }
}

/// How samples beyond the surface edge are read.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Edge {
    /// Outside is transparent black.
    Transparent,
    /// Outside repeats the nearest pixel. Used for opaque surfaces, which
    /// must stay opaque.
    Clamp,
}

impl Edge {
    fn for_alpha(has_alpha: bool) -> Self {
        if has_alpha { Edge::Transparent } else { Edge::Clamp }
    }

    #[inline]
    fn sample(self, line: &[[f32; 4]], at: isize) -> [f32; 4] {
        match self {
            Edge::Transparent if at < 0 || at as usize >= line.len() => [0.0; 4],
            Edge::Transparent => line[at as usize],
            Edge::Clamp => line[at.clamp(0, line.len() as isize - 1) as usize],
        }
    }
}

fn to_plane(pixels: &[u8]) -> Vec<[f32; 4]> {
    pixels
        .chunks_exact(4)
        .map(|p| [p[0] as f32, p[1] as f32, p[2] as f32, p[3] as f32])
        .collect()
}

fn from_plane(plane: &[[f32; 4]], pixels: &mut [u8], scale: f32, edge: Edge) {
    for (px, v) in pixels.chunks_exact_mut(4).zip(plane) {
        let a = match edge {
            Edge::Transparent => (v[3] * scale).clamp(0.0, 255.0),
            Edge::Clamp => 255.0,
        };
        for i in 0..3 {
            px[i] = ((v[i] * scale).clamp(0.0, a) + 0.5) as u8;
        }
        px[3] = (a + 0.5) as u8;
    }
}

/// Radius of each box so that three passes match a Gaussian of `sigma`.
fn box_radius_for(sigma: f32) -> usize {
    let ideal = (12.0 * sigma * sigma / BOX_PASSES as f32 + 1.0).sqrt();
    (((ideal - 1.0) * 0.5).round() as usize).max(1)
}

/// Running-sum box filter along `axis`.
fn box_pass(plane: &mut [[f32; 4]], w: usize, h: usize, radius: usize, axis: Axis, edge: Edge) {
    let (count, len, index) = axis.lines(w, h);
    if len == 0 {
        return;
    }
    let r = radius as isize;
    let norm = 1.0 / (2 * radius + 1) as f32;
    let mut line = vec![[0.0f32; 4]; len];

    for l in 0..count {
        for (k, slot) in line.iter_mut().enumerate() {
            *slot = plane[index(l, k)];
        }
        let mut sum = [0.0f32; 4];
        for at in -r..=r {
            add(&mut sum, &edge.sample(&line, at), 1.0);
        }
        for k in 0..len {
            plane[index(l, k)] = [sum[0] * norm, sum[1] * norm, sum[2] * norm, sum[3] * norm];
            let k = k as isize;
            add(&mut sum, &edge.sample(&line, k + r + 1), 1.0);
            add(&mut sum, &edge.sample(&line, k - r), -1.0);
        }
    }
}

#[inline]
fn add(sum: &mut [f32; 4], v: &[f32; 4], sign: f32) {
    for i in 0..4 {
        sum[i] += v[i] * sign;
    }
}

/// Normalized kernel covering three standard deviations each side.
fn gaussian_kernel(radius: f32) -> Option<Vec<f32>> {
    if !(radius > 0.0) || !radius.is_finite() {
        return None;
    }
    let sigma = (radius / 3.0).max(0.5);
    let half = radius.ceil() as i32;
    let mut kernel: Vec<f32> = (-half..=half)
        .map(|x| (-(x * x) as f32 / (2.0 * sigma * sigma)).exp())
        .collect();
    let total: f32 = kernel.iter().sum();
    for k in &mut kernel {
        *k /= total;
    }
    Some(kernel)
}

fn convolve(plane: &mut [[f32; 4]], w: usize, h: usize, kernel: &[f32], axis: Axis, edge: Edge) {
    let (count, len, index) = axis.lines(w, h);
    if len == 0 {
        return;
    }
    let half = (kernel.len() / 2) as isize;
    let mut line = vec![[0.0f32; 4]; len];

    for l in 0..count {
        for (k, slot) in line.iter_mut().enumerate() {
            *slot = plane[index(l, k)];
        }
        for k in 0..len {
            let mut acc = [0.0f32; 4];
            for (j, weight) in kernel.iter().enumerate() {
                let at = k as isize + j as isize - half;
                add(&mut acc, &edge.sample(&line, at), *weight);
            }
            plane[index(l, k)] = acc;
        }
    }
}
