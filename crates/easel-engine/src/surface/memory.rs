use crate::error::{CanvasError, Result};

use super::{SurfaceInfo, MAX_DIMENSION};

/// Scoped access to a surface's pixels.
///
/// Ending the lock, by [`MemoryLock::release`] or by drop, frees the
/// surface's scaled buffer and marks the surface dirty after write access.
#[derive(Debug)]
pub struct MemoryLock<'a> {
    info: &'a mut SurfaceInfo,
    /// `None` for partial locks, whose pixels live in the scaled buffer.
    pixels: Option<&'a mut [u8]>,
    width: u32,
    height: u32,
    write_access: bool,
}

impl<'a> MemoryLock<'a> {
    pub(crate) fn full(info: &'a mut SurfaceInfo, pixels: &'a mut [u8], write_access: bool) -> Self {
        let (width, height) = (info.actual_width(), info.actual_height());
        Self { info, pixels: Some(pixels), width, height, write_access }
    }

    pub(crate) fn partial(info: &'a mut SurfaceInfo, width: u32, height: u32) -> Self {
        Self { info, pixels: None, width, height, write_access: false }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per row.
    #[inline]
    pub fn stride(&self) -> usize {
        self.width as usize * 4
    }

    #[inline]
    pub fn has_alpha(&self) -> bool {
        self.info.has_alpha()
    }

    #[inline]
    pub fn is_writable(&self) -> bool {
        self.write_access
    }

    /// Premultiplied RGBA8 rows.
    pub fn pixels(&self) -> &[u8] {
        match self.pixels.as_deref() {
            Some(pixels) => pixels,
            None => self.info.scaled_buffer(),
        }
    }

    /// Mutable pixels, or `None` when the lock was taken for reading.
    pub fn pixels_mut(&mut self) -> Option<&mut [u8]> {
        if !self.write_access {
            return None;
        }
        self.pixels.as_deref_mut()
    }

    pub fn release(self) {}
}

impl Drop for MemoryLock<'_> {
    fn drop(&mut self) {
        self.info.release_memory(self.write_access);
    }
}

/// Copies a `width × height` window starting at `(x0, y0)` out of an RGBA8
/// buffer. Texels outside the source are transparent.
///
/// Windows wider or taller than [`MAX_DIMENSION`] are rejected, and a copy
/// that cannot be allocated reports [`CanvasError::ResourceUnavailable`].
pub(crate) fn copy_region(
    pixels: &[u8],
    src_width: u32,
    src_height: u32,
    x0: u32,
    y0: u32,
    width: u32,
    height: u32,
) -> Result<Vec<u8>> {
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(CanvasError::InvalidDimensions { width: width as f32, height: height as f32 });
    }
    let no_memory = || CanvasError::unavailable(format!("cannot allocate {width}x{height} region"));
    let len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(no_memory)?;
    let mut out = Vec::new();
    out.try_reserve_exact(len).map_err(|_| no_memory())?;
    out.resize(len, 0);

    let stride = width as usize * 4;
    let src_stride = src_width as usize * 4;
    let x_end = x0.saturating_add(width).min(src_width);
    let y_end = y0.saturating_add(height).min(src_height);
    if x0 < x_end {
        let run = (x_end - x0) as usize * 4;
        for y in y0..y_end {
            let from = y as usize * src_stride + x0 as usize * 4;
            let to = (y - y0) as usize * stride;
            out[to..to + run].copy_from_slice(&pixels[from..from + run]);
        }
    }
    Ok(out)
}
