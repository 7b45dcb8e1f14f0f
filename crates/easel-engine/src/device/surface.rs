use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use crate::coords::Transform;
use crate::error::{CanvasError, Result};
use crate::geometry::Path;
use crate::paint::Style;
use crate::raster::RasterSurface;
use crate::resource::Image;
use crate::surface::{
    downcast_source, BackendKind, Dimensions, Operator, RenderMode, Surface, SurfaceInfo,
};
use crate::text::{Font, TextAlign, TextBaseline, TextMetrics};
use crate::texture::{TextureAllocator, TextureLink, TexturePool};

/// Allocator shared by every GPU surface of one context.
pub type SharedAllocator = Rc<RefCell<dyn TextureAllocator>>;

/// Surface whose pixels live in a native texture.
///
/// Drawing happens on a CPU shadow; [`Surface::flush`] uploads the shadow to
/// the texture when it changed.
pub struct GpuSurface {
    shadow: RasterSurface,
    /// `None` while the surface has zero area.
    texture: Option<TextureLink>,
    pool: Arc<TexturePool>,
    allocator: SharedAllocator,
}

impl GpuSurface {
    pub fn new(shadow: RasterSurface, pool: Arc<TexturePool>, allocator: SharedAllocator) -> Result<Self> {
        let dims = shadow.info().dimensions();
        let texture = create_texture(&pool, &allocator, &dims)?;
        Ok(Self { shadow, texture, pool, allocator })
    }

    /// Native texture holding the last flushed contents.
    pub fn texture(&self) -> Option<&TextureLink> {
        self.texture.as_ref()
    }
}

fn create_texture(
    pool: &Arc<TexturePool>,
    allocator: &SharedAllocator,
    dims: &Dimensions,
) -> Result<Option<TextureLink>> {
    if dims.actual_width == 0 || dims.actual_height == 0 {
        return Ok(None);
    }
    let mut allocator = allocator
        .try_borrow_mut()
        .map_err(|_| CanvasError::unavailable("texture allocator is busy"))?;
    pool.create_texture(&mut *allocator, dims.actual_width, dims.actual_height)
        .map(Some)
}

impl Surface for GpuSurface {
    fn backend(&self) -> BackendKind {
        BackendKind::Gpu
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn info(&self) -> &SurfaceInfo {
        self.shadow.info()
    }

    fn info_mut(&mut self) -> &mut SurfaceInfo {
        self.shadow.info_mut()
    }

    fn resize(
        &mut self,
        logical_width: u32,
        logical_height: u32,
        display_scale: f32,
        has_alpha: bool,
    ) -> Result<()> {
        let dims = Dimensions::scaled(logical_width, logical_height, display_scale)?;
        let texture = create_texture(&self.pool, &self.allocator, &dims)?;
        self.shadow.resize(logical_width, logical_height, display_scale, has_alpha)?;
        self.texture = texture;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        let Some(texture) = self.texture.as_ref() else {
            return Ok(());
        };
        if !self.shadow.info_mut().take_dirty() {
            return Ok(());
        }
        let mut allocator = self
            .allocator
            .try_borrow_mut()
            .map_err(|_| CanvasError::unavailable("texture allocator is busy"))?;
        texture.upload(&mut *allocator, self.shadow.pixels())?;
        log::trace!("GpuSurface: uploaded texture {}", texture.handle().get());
        Ok(())
    }

    fn memory_parts(&mut self) -> Result<(&mut SurfaceInfo, &mut [u8])> {
        self.shadow.memory_parts()
    }

    fn clip(&mut self, path: &Path, display_scale: f32) {
        self.shadow.clip(path, display_scale);
    }

    fn reset_clip(&mut self) {
        self.shadow.reset_clip();
    }

    fn render_path(
        &mut self,
        mode: RenderMode,
        path: &Path,
        style: &Style,
        line_width: f32,
        op: Operator,
        display_scale: f32,
        global_alpha: f32,
    ) -> Result<()> {
        self.shadow
            .render_path(mode, path, style, line_width, op, display_scale, global_alpha)
    }

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
    ) -> Result<()> {
        self.shadow.render_text(
            mode, font, style, baseline, align, text, x, y, line_width, op, display_scale, alpha,
        )
    }

    fn measure_text(&self, font: &Font, text: &str, display_scale: f32) -> TextMetrics {
        self.shadow.measure_text(font, text, display_scale)
    }

    fn draw_surface(
        &mut self,
        source: &dyn Surface,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        alpha: f32,
        smoothing: bool,
    ) -> Result<()> {
        let source = downcast_source::<GpuSurface>(source, BackendKind::Gpu)?;
        let src = &source.shadow;
        self.shadow.blit(
            src.pixels(),
            src.actual_width(),
            src.actual_height(),
            x,
            y,
            width,
            height,
            alpha,
            smoothing,
        );
        Ok(())
    }

    fn draw_image(
        &mut self,
        image: &Image,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        alpha: f32,
        smoothing: bool,
    ) -> Result<()> {
        self.shadow.draw_image(image, x, y, width, height, alpha, smoothing)
    }

    fn save(&mut self) {
        self.shadow.save();
    }

    fn restore(&mut self) -> Result<()> {
        self.shadow.restore()
    }

    fn set_transform(&mut self, transform: Transform) {
        self.shadow.set_transform(transform);
    }

    fn transform(&self) -> Transform {
        self.shadow.transform()
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.shadow.set_alpha(alpha);
    }

    fn alpha(&self) -> f32 {
        self.shadow.alpha()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::{Color, GradientSupport};
    use crate::text::FontSystem;
    use crate::texture::TextureHandle;

    #[derive(Default)]
    struct RecordingAllocator {
        next: u32,
        uploads: Vec<(TextureHandle, u32, u32)>,
        deleted: Vec<TextureHandle>,
    }

    impl TextureAllocator for RecordingAllocator {
        fn allocate(&mut self, _: u32, _: u32) -> Result<TextureHandle> {
            self.next += 1;
            TextureHandle::new(self.next).ok_or_else(|| CanvasError::unavailable("zero"))
        }

        fn upload(&mut self, handle: TextureHandle, width: u32, height: u32, _: &[u8]) -> Result<()> {
            self.uploads.push((handle, width, height));
            Ok(())
        }

        fn delete(&mut self, handle: TextureHandle) {
            self.deleted.push(handle);
        }
    }

    fn gpu_surface(
        w: u32,
        h: u32,
    ) -> (GpuSurface, Arc<TexturePool>, Rc<RefCell<RecordingAllocator>>) {
        let pool = TexturePool::new();
        let recorder = Rc::new(RefCell::new(RecordingAllocator::default()));
        let allocator: SharedAllocator = recorder.clone();
        let shadow = RasterSurface::new(
            w,
            h,
            2.0,
            true,
            Arc::new(FontSystem::new()),
            GradientSupport::MultiStop,
        )
        .unwrap();
        let surface = GpuSurface::new(shadow, Arc::clone(&pool), allocator).unwrap();
        (surface, pool, recorder)
    }

    #[test]
    fn texture_matches_device_size() {
        let (surface, pool, _) = gpu_surface(10, 5);
        let texture = surface.texture().unwrap();
        assert_eq!((texture.width(), texture.height()), (20, 10));
        assert_eq!(pool.live_count(), 1);
    }

    #[test]
    fn flush_uploads_only_when_dirty() {
        let (mut surface, _, recorder) = gpu_surface(4, 4);
        surface.flush().unwrap();
        surface.flush().unwrap();
        assert_eq!(recorder.borrow().uploads.len(), 1);

        let mut path = Path::new();
        path.rect(0.0, 0.0, 2.0, 2.0);
        surface
            .render_path(RenderMode::Fill, &path, &Style::solid(Color::white()), 1.0, Operator::SourceOver, 2.0, 1.0)
            .unwrap();
        surface.flush().unwrap();
        assert_eq!(recorder.borrow().uploads.len(), 2);
    }

    #[test]
    fn resize_replaces_texture_and_queues_old_one() {
        let (mut surface, pool, recorder) = gpu_surface(4, 4);
        let old = surface.texture().unwrap().handle();
        surface.resize(8, 2, 1.0, false).unwrap();
        assert_eq!(pool.pending_handles(), vec![old]);
        assert_eq!(pool.live_count(), 1);
        assert_eq!(surface.texture().unwrap().width(), 8);

        let mut alloc = recorder.borrow_mut();
        assert_eq!(pool.release_textures(&mut *alloc), 1);
        assert_eq!(alloc.deleted, vec![old]);
    }

    #[test]
    fn raster_source_is_a_backend_mismatch() {
        let (mut surface, _, _) = gpu_surface(4, 4);
        let raster = RasterSurface::new(2, 2, 1.0, true, Arc::new(FontSystem::new()), GradientSupport::MultiStop)
            .unwrap();
        let err = surface.draw_surface(&raster, 0.0, 0.0, 2.0, 2.0, 1.0, true).unwrap_err();
        assert_eq!(
            err,
            CanvasError::BackendMismatch { expected: BackendKind::Gpu, found: BackendKind::Raster }
        );
    }
}
