use crate::error::{CanvasError, Result};

use super::{FilterMode, InternalFormat};

/// Largest device extent a surface may allocate on either axis.
pub const MAX_DIMENSION: u32 = 32_768;

/// Logical and device extents of a surface, always derived together.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Dimensions {
    pub logical_width: u32,
    pub logical_height: u32,
    pub actual_width: u32,
    pub actual_height: u32,
}

impl Dimensions {
    /// Derives device extents as `logical × display_scale`, rounded to whole pixels.
    pub fn scaled(logical_width: u32, logical_height: u32, display_scale: f32) -> Result<Self> {
        let w = (logical_width as f32 * display_scale).round();
        let h = (logical_height as f32 * display_scale).round();
        let valid = |v: f32| v.is_finite() && (0.0..=MAX_DIMENSION as f32).contains(&v);
        if !(display_scale > 0.0) || !valid(w) || !valid(h) {
            return Err(CanvasError::InvalidDimensions { width: w, height: h });
        }
        Ok(Self {
            logical_width,
            logical_height,
            actual_width: w as u32,
            actual_height: h as u32,
        })
    }

    /// Bytes needed for premultiplied RGBA8 pixels at the device extent.
    #[inline]
    pub fn byte_len(&self) -> usize {
        self.actual_width as usize * self.actual_height as usize * 4
    }
}

/// State every surface owns regardless of backend.
///
/// Dimensions and the alpha flag change only through [`SurfaceInfo::apply_resize`],
/// which replaces them together.
#[derive(Debug, Clone)]
pub struct SurfaceInfo {
    dims: Dimensions,
    has_alpha: bool,
    mag_filter: FilterMode,
    min_filter: FilterMode,
    target_format: InternalFormat,
    /// Transient copy made by partial locks; dropped when the lock ends.
    scaled_buffer: Option<Vec<u8>>,
    dirty: bool,
}

impl SurfaceInfo {
    pub fn new(dims: Dimensions, has_alpha: bool) -> Self {
        Self {
            dims,
            has_alpha,
            mag_filter: FilterMode::default(),
            min_filter: FilterMode::default(),
            target_format: InternalFormat::default(),
            scaled_buffer: None,
            dirty: true,
        }
    }

    #[inline]
    pub fn dimensions(&self) -> Dimensions {
        self.dims
    }

    #[inline]
    pub fn logical_width(&self) -> u32 {
        self.dims.logical_width
    }

    #[inline]
    pub fn logical_height(&self) -> u32 {
        self.dims.logical_height
    }

    #[inline]
    pub fn actual_width(&self) -> u32 {
        self.dims.actual_width
    }

    #[inline]
    pub fn actual_height(&self) -> u32 {
        self.dims.actual_height
    }

    #[inline]
    pub fn has_alpha(&self) -> bool {
        self.has_alpha
    }

    /// Commits new extents and alpha flag in one step.
    pub fn apply_resize(&mut self, dims: Dimensions, has_alpha: bool) {
        self.scaled_buffer = None;
        (self.dims, self.has_alpha) = (dims, has_alpha);
        self.dirty = true;
    }

    pub fn set_mag_filter(&mut self, mode: FilterMode) {
        self.mag_filter = mode;
    }

    pub fn set_min_filter(&mut self, mode: FilterMode) {
        self.min_filter = mode;
    }

    pub fn set_target_format(&mut self, format: InternalFormat) {
        self.target_format = format;
    }

    #[inline]
    pub fn mag_filter(&self) -> FilterMode {
        self.mag_filter
    }

    #[inline]
    pub fn min_filter(&self) -> FilterMode {
        self.min_filter
    }

    #[inline]
    pub fn target_format(&self) -> InternalFormat {
        self.target_format
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Clears the dirty flag, returning whether it was set.
    #[inline]
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    #[inline]
    pub fn has_scaled_buffer(&self) -> bool {
        self.scaled_buffer.is_some()
    }

    pub(crate) fn scaled_buffer(&self) -> &[u8] {
        self.scaled_buffer.as_deref().unwrap_or(&[])
    }

    pub(crate) fn set_scaled_buffer(&mut self, buffer: Vec<u8>) {
        self.scaled_buffer = Some(buffer);
    }

    /// Ends a memory access: the scaled buffer is always freed.
    pub(crate) fn release_memory(&mut self, written: bool) {
        self.scaled_buffer = None;
        if written {
            self.dirty = true;
        }
    }
}
