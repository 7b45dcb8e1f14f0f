use std::any::Any;
use std::sync::Arc;

use tiny_skia::{BlendMode, FilterQuality, Mask, PixmapMut, PixmapPaint, PixmapRef};

use crate::coords::{Rect, Transform, Vec2};
use crate::error::{CanvasError, Result};
use crate::geometry::{DeviceGeometry, Path};
use crate::paint::{resolve, DrawableBrush, GradientSupport, Style};
use crate::resource::Image;
use crate::surface::{
    downcast_source, BackendKind, Dimensions, FillRule, Operator, RenderMode, StateStack, Surface,
    SurfaceInfo,
};
use crate::text::{layout_text, Font, FontSystem, TextAlign, TextBaseline, TextMetrics};

use super::paint::{build_path, paint_for, stroke};

/// CPU surface backed by a premultiplied RGBA8 buffer.
pub struct RasterSurface {
    info: SurfaceInfo,
    pixels: Vec<u8>,
    stack: StateStack<Arc<Mask>>,
    fonts: Arc<FontSystem>,
    gradient_support: GradientSupport,

    warned_multi_stop: bool,
    warned_stroked_text: bool,
}

impl RasterSurface {
    pub fn new(
        logical_width: u32,
        logical_height: u32,
        display_scale: f32,
        has_alpha: bool,
        fonts: Arc<FontSystem>,
        gradient_support: GradientSupport,
    ) -> Result<Self> {
        let dims = Dimensions::scaled(logical_width, logical_height, display_scale)?;
        let pixels = allocate(&dims, has_alpha)?;
        log::debug!(
            "RasterSurface: created {}x{} (device {}x{}, alpha={has_alpha})",
            dims.logical_width,
            dims.logical_height,
            dims.actual_width,
            dims.actual_height
        );
        Ok(Self {
            info: SurfaceInfo::new(dims, has_alpha),
            pixels,
            stack: StateStack::new(),
            fonts,
            gradient_support,
            warned_multi_stop: false,
            warned_stroked_text: false,
        })
    }

    /// Current premultiplied RGBA8 contents.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    #[inline]
    pub fn gradient_support(&self) -> GradientSupport {
        self.gradient_support
    }

    fn device_size(&self) -> (u32, u32) {
        (self.info.actual_width(), self.info.actual_height())
    }

    fn device_transform(&self, display_scale: f32) -> Transform {
        self.stack
            .current()
            .transform
            .then(Transform::scale(display_scale, display_scale))
    }

    fn brush_for(&mut self, style: &Style, to_device: &Transform) -> DrawableBrush {
        if self.gradient_support == GradientSupport::TwoStop
            && style.stop_count() > 2
            && !self.warned_multi_stop
        {
            log::debug!("RasterSurface: gradient reduced to its first and last stop");
            self.warned_multi_stop = true;
        }
        resolve(style, self.gradient_support).transformed(to_device)
    }

    /// Runs `draw` against the pixel buffer with the current clip.
    fn with_pixmap(&mut self, draw: impl FnOnce(&mut PixmapMut<'_>, Option<&Mask>)) {
        let (w, h) = self.device_size();
        let clip = self.stack.current().clip.clone();
        let Some(mut pixmap) = PixmapMut::from_bytes(&mut self.pixels, w, h) else {
            return;
        };
        draw(&mut pixmap, clip.as_deref());

        if !self.info.has_alpha() {
            for px in self.pixels.chunks_exact_mut(4) {
                px[3] = 255;
            }
        }
        self.info.mark_dirty();
    }

    /// Source-over copy of premultiplied `src` into the device rectangle
    /// `(x, y, width, height)`, ignoring the current transform.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn blit(
        &mut self,
        src: &[u8],
        src_width: u32,
        src_height: u32,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        alpha: f32,
        smoothing: bool,
    ) {
        let alpha = unit(alpha) * self.stack.current().alpha;
        let finite = [x, y, width, height].iter().all(|v| v.is_finite());
        if alpha <= 0.0 || !finite || width <= 0.0 || height <= 0.0 {
            return;
        }
        let Some(source) = PixmapRef::from_bytes(src, src_width, src_height) else {
            return;
        };

        let paint = PixmapPaint {
            opacity: alpha,
            blend_mode: BlendMode::SourceOver,
            quality: if smoothing { FilterQuality::Bilinear } else { FilterQuality::Nearest },
        };
        let placement = tiny_skia::Transform::from_row(
            width / src_width as f32,
            0.0,
            0.0,
            height / src_height as f32,
            x,
            y,
        );
        self.with_pixmap(|pixmap, clip| pixmap.draw_pixmap(0, 0, source, &paint, placement, clip));
    }

    /// Rasterizes laid-out glyphs into a surface-sized coverage mask, plus the
    /// device rectangle they touch.
    fn text_coverage(
        &self,
        font: &Font,
        text: &str,
        anchor: Vec2,
        scale: f32,
        baseline: TextBaseline,
        align: TextAlign,
    ) -> Option<(Mask, tiny_skia::Rect)> {
        let layout = layout_text(&self.fonts, font, text, scale);
        let face = self.fonts.get(layout.font?)?;
        let origin = anchor + layout.anchor_offset(baseline, align);

        let (w, h) = self.device_size();
        let mut mask = Mask::new(w, h)?;
        let mut ink: Option<Rect> = None;

        for glyph in &layout.glyphs {
            let (metrics, bitmap) = face.rasterize_config(glyph.key);
            if metrics.width == 0 || metrics.height == 0 {
                continue;
            }
            let gx = (origin.x + glyph.x).round() as i32;
            let gy = (origin.y + glyph.y).round() as i32;
            let corner = Vec2::new((gx + metrics.width as i32) as f32, (gy + metrics.height as i32) as f32);
            let placed = Rect::new(gx as f32, gy as f32, 0.0, 0.0).include(corner);
            ink = Some(ink.map_or(placed, |r| r.include(placed.origin).include(corner)));

            let data = mask.data_mut();
            for (j, row) in bitmap.chunks(metrics.width).enumerate() {
                let y = gy + j as i32;
                if y < 0 || y >= h as i32 {
                    continue;
                }
                for (i, &v) in row.iter().enumerate() {
                    let x = gx + i as i32;
                    if x < 0 || x >= w as i32 {
                        continue;
                    }
                    let cell = &mut data[y as usize * w as usize + x as usize];
                    *cell = (*cell).max(v);
                }
            }
        }

        let (x0, y0, x1, y1) = ink?.pixel_bounds(w, h)?;
        let bounds = tiny_skia::Rect::from_ltrb(x0 as f32, y0 as f32, x1 as f32, y1 as f32)?;
        Some((mask, bounds))
    }
}

/// Clamps to `0..=1`, mapping NaN to 0.
#[inline]
fn unit(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

/// Multiplies `mask` by `clip`, keeping only coverage both share.
fn intersect(mask: &mut Mask, clip: &Mask) {
    for (m, &c) in mask.data_mut().iter_mut().zip(clip.data()) {
        *m = ((*m as u16 * c as u16 + 127) / 255) as u8;
    }
}

/// Allocates a pixel buffer; surfaces without alpha start opaque black.
fn allocate(dims: &Dimensions, has_alpha: bool) -> Result<Vec<u8>> {
    let len = dims.byte_len();
    let mut pixels = Vec::new();
    pixels.try_reserve_exact(len).map_err(|_| {
        CanvasError::unavailable(format!(
            "cannot allocate {}x{} pixel buffer",
            dims.actual_width, dims.actual_height
        ))
    })?;
    if has_alpha {
        pixels.resize(len, 0);
    } else {
        pixels.extend(std::iter::repeat_n([0u8, 0, 0, 255], len / 4).flatten());
    }
    Ok(pixels)
}

impl Surface for RasterSurface {
    fn backend(&self) -> BackendKind {
        BackendKind::Raster
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn info(&self) -> &SurfaceInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut SurfaceInfo {
        &mut self.info
    }

    fn resize(
        &mut self,
        logical_width: u32,
        logical_height: u32,
        display_scale: f32,
        has_alpha: bool,
    ) -> Result<()> {
        let dims = Dimensions::scaled(logical_width, logical_height, display_scale)?;
        self.pixels = allocate(&dims, has_alpha)?;
        self.info.apply_resize(dims, has_alpha);
        self.stack.reset();
        log::debug!(
            "RasterSurface: resized to {logical_width}x{logical_height} (device {}x{})",
            dims.actual_width,
            dims.actual_height
        );
        Ok(())
    }

    fn memory_parts(&mut self) -> Result<(&mut SurfaceInfo, &mut [u8])> {
        Ok((&mut self.info, &mut self.pixels))
    }

    fn clip(&mut self, path: &Path, display_scale: f32) {
        let to_device = self.device_transform(display_scale);
        let geometry = DeviceGeometry::build(path, &to_device);
        let (w, h) = self.device_size();

        let state = self.stack.current_mut();
        let mask = match state.clip.as_deref() {
            Some(current) => Some(current.clone()),
            None => Mask::new(w, h).map(|mut m| {
                m.data_mut().fill(255);
                m
            }),
        };
        let Some(mut mask) = mask else {
            return;
        };
        match build_path(&geometry) {
            Some(path) => mask.intersect_path(
                &path,
                FillRule::NonZero.into(),
                true,
                tiny_skia::Transform::identity(),
            ),
            None => mask.clear(),
        }
        state.clip = Some(Arc::new(mask));
    }

    fn reset_clip(&mut self) {
        self.stack.current_mut().clip = None;
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
        let alpha = unit(global_alpha) * self.stack.current().alpha;
        let to_device = self.device_transform(display_scale);
        let brush = self.brush_for(style, &to_device);
        let Some(paint) = paint_for(&brush, op, alpha) else {
            return Ok(());
        };
        let Some(path) = build_path(&DeviceGeometry::build(path, &to_device)) else {
            return Ok(());
        };

        let identity = tiny_skia::Transform::identity();
        match mode {
            RenderMode::Fill => self.with_pixmap(|pixmap, clip| {
                pixmap.fill_path(&path, &paint, FillRule::NonZero.into(), identity, clip)
            }),
            RenderMode::Stroke => {
                let width = line_width * to_device.mean_scale();
                // A zero width would draw a hairline.
                if !(width > 0.0 && width.is_finite()) {
                    return Ok(());
                }
                let pen = stroke(width);
                self.with_pixmap(|pixmap, clip| pixmap.stroke_path(&path, &paint, &pen, identity, clip));
            }
        }
        Ok(())
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
        _line_width: f32,
        op: Operator,
        display_scale: f32,
        alpha: f32,
    ) -> Result<()> {
        if mode == RenderMode::Stroke && !self.warned_stroked_text {
            log::debug!("RasterSurface: stroked text is drawn filled");
            self.warned_stroked_text = true;
        }

        let alpha = unit(alpha) * self.stack.current().alpha;
        let to_device = self.device_transform(display_scale);
        let brush = self.brush_for(style, &to_device);
        let Some(paint) = paint_for(&brush, op, alpha) else {
            return Ok(());
        };
        if text.is_empty() {
            return Ok(());
        }

        let anchor = to_device.apply(Vec2::new(x, y));
        let Some((mut coverage, bounds)) =
            self.text_coverage(font, text, anchor, to_device.mean_scale(), baseline, align)
        else {
            return Ok(());
        };
        if let Some(clip) = self.stack.current().clip.as_deref() {
            intersect(&mut coverage, clip);
        }
        self.with_pixmap(|pixmap, _| {
            pixmap.fill_rect(bounds, &paint, tiny_skia::Transform::identity(), Some(&coverage))
        });
        Ok(())
    }

    fn measure_text(&self, font: &Font, text: &str, display_scale: f32) -> TextMetrics {
        layout_text(&self.fonts, font, text, display_scale).metrics(display_scale)
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
        let source = downcast_source::<RasterSurface>(source, BackendKind::Raster)?;
        self.blit(
            &source.pixels,
            source.info.actual_width(),
            source.info.actual_height(),
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
        self.blit(image.pixels(), image.width(), image.height(), x, y, width, height, alpha, smoothing);
        Ok(())
    }

    fn save(&mut self) {
        self.stack.save();
    }

    fn restore(&mut self) -> Result<()> {
        self.stack.restore()
    }

    fn set_transform(&mut self, transform: Transform) {
        if transform.is_finite() {
            self.stack.current_mut().transform = transform;
        }
    }

    fn transform(&self) -> Transform {
        self.stack.current().transform
    }

    fn set_alpha(&mut self, alpha: f32) {
        if !alpha.is_nan() {
            self.stack.current_mut().alpha = alpha.clamp(0.0, 1.0);
        }
    }

    fn alpha(&self) -> f32 {
        self.stack.current().alpha
    }
}

impl std::fmt::Debug for RasterSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterSurface")
            .field("info", &self.info)
            .field("depth", &self.stack.depth())
            .finish()
    }
}
