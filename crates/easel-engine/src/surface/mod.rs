//! Backend-agnostic surface contract.
//!
//! A [`Surface`] is a pixel target with its own drawing state. Every backend
//! implements the same operations so higher layers (canvas bindings,
//! [`crate::composite`]) never branch on the concrete type.

mod info;
mod memory;
mod operator;
mod state;

pub use info::{Dimensions, SurfaceInfo, MAX_DIMENSION};
pub use memory::MemoryLock;
pub use operator::Operator;
pub use state::{DrawState, StateStack};

use std::any::Any;

use crate::coords::Transform;
use crate::error::{CanvasError, Result};
use crate::geometry::Path;
use crate::paint::Style;
use crate::resource::Image;
use crate::text::{Font, TextAlign, TextBaseline, TextMetrics};

/// Closed set of rendering backends.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BackendKind {
    /// CPU rasterizer backed by tiny-skia.
    Raster,
    /// wgpu texture fed from a CPU shadow.
    Gpu,
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum RenderMode {
    #[default]
    Fill,
    Stroke,
}

/// Winding rule for fills and clips.
///
/// Every backend fills and clips with [`FillRule::NonZero`].
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum FillRule {
    #[default]
    NonZero,
    EvenOdd,
}

impl From<FillRule> for tiny_skia::FillRule {
    fn from(rule: FillRule) -> Self {
        match rule {
            FillRule::NonZero => tiny_skia::FillRule::Winding,
            FillRule::EvenOdd => tiny_skia::FillRule::EvenOdd,
        }
    }
}

/// Texture sampling filter.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum FilterMode {
    Nearest,
    #[default]
    Linear,
}

/// Preferred storage format when a surface is uploaded to a texture.
///
/// Pixel memory exposed through [`MemoryLock`] is always RGBA8.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum InternalFormat {
    #[default]
    Rgba8,
    Rgb8,
    R8,
    Rgb565,
    Rgba4,
    Lum8,
    LumAlpha8,
}

/// A drawable pixel target.
///
/// Coordinates for paths and text are logical units, mapped to device pixels
/// by the current transform and `display_scale`. Image and surface blits take
/// device pixels directly.
///
/// Pixel memory is premultiplied RGBA8, row-major, stride `actual_width * 4`.
#[allow(clippy::too_many_arguments)]
pub trait Surface: Any {
    fn backend(&self) -> BackendKind;

    fn as_any(&self) -> &dyn Any;

    fn info(&self) -> &SurfaceInfo;

    fn info_mut(&mut self) -> &mut SurfaceInfo;

    // ── size & flags ──────────────────────────────────────────────────────

    fn logical_width(&self) -> u32 {
        self.info().logical_width()
    }

    fn logical_height(&self) -> u32 {
        self.info().logical_height()
    }

    fn actual_width(&self) -> u32 {
        self.info().actual_width()
    }

    fn actual_height(&self) -> u32 {
        self.info().actual_height()
    }

    fn has_alpha(&self) -> bool {
        self.info().has_alpha()
    }

    /// Reallocates backing memory for a new size.
    ///
    /// On error the surface keeps its previous size and contents. On success
    /// the clip and the state stack are reset.
    fn resize(
        &mut self,
        logical_width: u32,
        logical_height: u32,
        display_scale: f32,
        has_alpha: bool,
    ) -> Result<()>;

    /// Pushes pending pixel changes to the backend's native resource.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn mark_dirty(&mut self) {
        self.info_mut().mark_dirty();
    }

    // ── memory ────────────────────────────────────────────────────────────

    /// Shared info and the full pixel buffer, borrowed together.
    fn memory_parts(&mut self) -> Result<(&mut SurfaceInfo, &mut [u8])>;

    /// Scoped access to the whole pixel buffer.
    fn lock_memory(&mut self, write_access: bool) -> Result<MemoryLock<'_>> {
        let (info, pixels) = self.memory_parts()?;
        Ok(MemoryLock::full(info, pixels, write_access))
    }

    /// Read access to a copy of a sub-rectangle.
    ///
    /// Pixels outside the surface read as transparent. The copy lives in the
    /// surface's scaled buffer until the lock ends. Regions larger than
    /// [`MAX_DIMENSION`] on either axis fail with
    /// [`CanvasError::InvalidDimensions`](crate::error::CanvasError::InvalidDimensions).
    fn lock_memory_partial(
        &mut self,
        x0: u32,
        y0: u32,
        width: u32,
        height: u32,
    ) -> Result<MemoryLock<'_>> {
        let (info, pixels) = self.memory_parts()?;
        let region = memory::copy_region(
            pixels,
            info.actual_width(),
            info.actual_height(),
            x0,
            y0,
            width,
            height,
        )?;
        info.set_scaled_buffer(region);
        Ok(MemoryLock::partial(info, width, height))
    }

    /// Snapshot of the current pixels.
    fn create_image(&mut self) -> Result<Image> {
        let lock = self.lock_memory(false)?;
        Ok(Image::from_premultiplied(
            lock.width(),
            lock.height(),
            lock.pixels().to_vec(),
        ))
    }

    // ── clip ──────────────────────────────────────────────────────────────

    /// Intersects the current clip with the non-zero interior of `path`.
    fn clip(&mut self, path: &Path, display_scale: f32);

    fn reset_clip(&mut self);

    // ── drawing ───────────────────────────────────────────────────────────

    fn render_path(
        &mut self,
        mode: RenderMode,
        path: &Path,
        style: &Style,
        line_width: f32,
        op: Operator,
        display_scale: f32,
        global_alpha: f32,
    ) -> Result<()>;

    fn render_text(
        &mut self,
        mode: RenderMode,
        font: &Font,
        style: &Style,
        baseline: TextBaseline,
        align: TextAlign,
        text: &str,
        x: f32,
        y: f32,
        line_width: f32,
        op: Operator,
        display_scale: f32,
        alpha: f32,
    ) -> Result<()>;

    fn measure_text(&self, font: &Font, text: &str, display_scale: f32) -> TextMetrics;

    /// Draws `source` into the device rectangle `(x, y, width, height)`.
    ///
    /// Fails with [`CanvasError::BackendMismatch`] when `source` belongs to
    /// another backend.
    fn draw_surface(
        &mut self,
        source: &dyn Surface,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        alpha: f32,
        smoothing: bool,
    ) -> Result<()>;

    /// Draws a decoded image into the device rectangle `(x, y, width, height)`.
    fn draw_image(
        &mut self,
        image: &Image,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        alpha: f32,
        smoothing: bool,
    ) -> Result<()>;

    // ── state ─────────────────────────────────────────────────────────────

    fn save(&mut self);

    /// Pops the most recent [`Surface::save`]. Fails with
    /// [`CanvasError::StateStackUnderflow`] when nothing was saved.
    fn restore(&mut self) -> Result<()>;

    fn set_transform(&mut self, transform: Transform);

    fn transform(&self) -> Transform;

    fn set_alpha(&mut self, alpha: f32);

    fn alpha(&self) -> f32;
}

/// Checked downcast of a source surface to a backend's concrete type.
pub fn downcast_source<T: Surface>(source: &dyn Surface, expected: BackendKind) -> Result<&T> {
    let found = source.backend();
    if found != expected {
        return Err(CanvasError::BackendMismatch { expected, found });
    }
    source
        .as_any()
        .downcast_ref::<T>()
        .ok_or(CanvasError::BackendMismatch { expected, found })
}
