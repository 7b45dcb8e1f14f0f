use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use crate::device::{Gpu, GpuInit, GpuSurface, SharedAllocator, WgpuTextureAllocator};
use crate::error::{CanvasError, Result};
use crate::paint::GradientSupport;
use crate::raster::RasterSurface;
use crate::surface::{FilterMode, InternalFormat, Surface};
use crate::text::FontSystem;
use crate::texture::TexturePool;

/// Defaults applied to every surface a [`RenderContext`] creates.
#[derive(Debug, Clone)]
pub struct ContextConfig {
    /// Device pixels per logical unit.
    pub display_scale: f32,
    pub gradient_support: GradientSupport,
    pub default_filter: FilterMode,
    pub default_format: InternalFormat,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            display_scale: 1.0,
            gradient_support: GradientSupport::MultiStop,
            default_filter: FilterMode::Linear,
            default_format: InternalFormat::Rgba8,
        }
    }
}

struct GpuBackend {
    gpu: Gpu,
    allocator: Rc<RefCell<WgpuTextureAllocator>>,
}

/// Owns the resources shared by surfaces: texture pool, fonts and the
/// optional GPU device.
///
/// Lives on the rendering thread. Call [`RenderContext::begin_frame`] once
/// per frame so textures dropped elsewhere are deleted.
pub struct RenderContext {
    config: ContextConfig,
    pool: Arc<TexturePool>,
    fonts: Arc<FontSystem>,
    gpu: Option<GpuBackend>,
}

impl RenderContext {
    /// Context with only the raster backend.
    pub fn new(config: ContextConfig) -> Self {
        Self {
            config,
            pool: TexturePool::new(),
            fonts: Arc::new(FontSystem::new()),
            gpu: None,
        }
    }

    /// Context with the raster backend and a headless wgpu device.
    ///
    /// Blocks until the device is ready.
    pub fn with_gpu(config: ContextConfig, init: GpuInit) -> Result<Self> {
        let gpu = Gpu::new_blocking(init).map_err(|e| CanvasError::unavailable(format!("{e:#}")))?;
        let allocator = WgpuTextureAllocator::new(gpu.device().clone(), gpu.queue().clone());
        let mut ctx = Self::new(config);
        ctx.gpu = Some(GpuBackend { gpu, allocator: Rc::new(RefCell::new(allocator)) });
        Ok(ctx)
    }

    #[inline]
    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    #[inline]
    pub fn fonts(&self) -> &FontSystem {
        &self.fonts
    }

    /// Mutable font registry. Surfaces created earlier keep the fonts they
    /// were created with.
    pub fn fonts_mut(&mut self) -> &mut FontSystem {
        Arc::make_mut(&mut self.fonts)
    }

    #[inline]
    pub fn texture_pool(&self) -> &Arc<TexturePool> {
        &self.pool
    }

    pub fn gpu(&self) -> Option<&Gpu> {
        self.gpu.as_ref().map(|b| &b.gpu)
    }

    /// wgpu textures backing GPU surfaces, keyed by their handles.
    pub fn texture_allocator(&self) -> Option<Rc<RefCell<WgpuTextureAllocator>>> {
        self.gpu.as_ref().map(|b| Rc::clone(&b.allocator))
    }

    pub fn create_raster_surface(
        &self,
        logical_width: u32,
        logical_height: u32,
        has_alpha: bool,
    ) -> Result<RasterSurface> {
        let mut surface = RasterSurface::new(
            logical_width,
            logical_height,
            self.config.display_scale,
            has_alpha,
            Arc::clone(&self.fonts),
            self.config.gradient_support,
        )?;
        self.apply_defaults(&mut surface);
        Ok(surface)
    }

    /// Fails with [`CanvasError::ResourceUnavailable`] when the context has
    /// no GPU device.
    pub fn create_gpu_surface(
        &self,
        logical_width: u32,
        logical_height: u32,
        has_alpha: bool,
    ) -> Result<GpuSurface> {
        let backend = self
            .gpu
            .as_ref()
            .ok_or_else(|| CanvasError::unavailable("no GPU backend in this context"))?;
        let shadow = self.create_raster_surface(logical_width, logical_height, has_alpha)?;
        let allocator: SharedAllocator = backend.allocator.clone();
        GpuSurface::new(shadow, Arc::clone(&self.pool), allocator)
    }

    /// Deletes textures whose last link was dropped since the previous frame.
    ///
    /// Returns the number of textures deleted.
    pub fn begin_frame(&mut self) -> Result<usize> {
        let Some(backend) = self.gpu.as_ref() else {
            return Ok(0);
        };
        let mut allocator = backend
            .allocator
            .try_borrow_mut()
            .map_err(|_| CanvasError::unavailable("texture allocator is busy"))?;
        Ok(self.pool.release_textures(&mut *allocator))
    }

    fn apply_defaults(&self, surface: &mut dyn Surface) {
        let info = surface.info_mut();
        info.set_mag_filter(self.config.default_filter);
        info.set_min_filter(self.config.default_filter);
        info.set_target_format(self.config.default_format);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raster_surfaces_use_context_scale_and_defaults() {
        let ctx = RenderContext::new(ContextConfig {
            display_scale: 2.0,
            default_filter: FilterMode::Nearest,
            default_format: InternalFormat::Rgb565,
            ..ContextConfig::default()
        });
        let surface = ctx.create_raster_surface(30, 20, true).unwrap();
        assert_eq!((surface.actual_width(), surface.actual_height()), (60, 40));
        assert_eq!(surface.info().mag_filter(), FilterMode::Nearest);
        assert_eq!(surface.info().target_format(), InternalFormat::Rgb565);
    }

    #[test]
    fn gpu_surface_without_device_is_unavailable() {
        let ctx = RenderContext::new(ContextConfig::default());
        assert!(matches!(
            ctx.create_gpu_surface(4, 4, true),
            Err(CanvasError::ResourceUnavailable(_))
        ));
        assert!(ctx.gpu().is_none());
    }

    #[test]
    fn begin_frame_without_gpu_releases_nothing() {
        let mut ctx = RenderContext::new(ContextConfig::default());
        assert_eq!(ctx.begin_frame().unwrap(), 0);
        assert_eq!(ctx.texture_pool().live_count(), 0);
    }

    #[test]
    fn fonts_mut_is_copy_on_write() {
        let mut ctx = RenderContext::new(ContextConfig::default());
        let surface = ctx.create_raster_surface(1, 1, true).unwrap();
        let shared = Arc::as_ptr(&ctx.fonts);
        assert!(ctx.fonts_mut().is_empty());
        assert_ne!(Arc::as_ptr(&ctx.fonts), shared);
        drop(surface);
    }
}
