use std::cell::RefCell;
use std::f32::consts::PI;
use std::rc::Rc;
use std::sync::Arc;

use easel_engine::coords::Transform;
use easel_engine::device::{GpuSurface, SharedAllocator};
use easel_engine::geometry::Path;
use easel_engine::paint::{Color, GradientSupport, Style};
use easel_engine::raster::RasterSurface;
use easel_engine::resource::Image;
use easel_engine::surface::{BackendKind, Operator, RenderMode, Surface};
use easel_engine::text::FontSystem;
use easel_engine::texture::{TextureAllocator, TextureHandle, TexturePool};
use easel_engine::{CanvasError, ContextConfig, RenderContext, Result};

fn surface(w: u32, h: u32) -> RasterSurface {
    RenderContext::new(ContextConfig::default())
        .create_raster_surface(w, h, true)
        .unwrap()
}

fn pixel(s: &RasterSurface, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * s.actual_width() + x) * 4) as usize;
    s.pixels()[i..i + 4].try_into().unwrap()
}

fn rect(x: f32, y: f32, w: f32, h: f32) -> Path {
    let mut path = Path::new();
    path.rect(x, y, w, h);
    path
}

fn fill(s: &mut dyn Surface, path: &Path, style: &Style) {
    s.render_path(RenderMode::Fill, path, style, 1.0, Operator::SourceOver, 1.0, 1.0)
        .unwrap();
}

fn solid(r: f32, g: f32, b: f32, a: f32) -> Style {
    Style::solid(Color::new(r, g, b, a))
}

/// Channel-wise comparison allowing one step of rounding difference.
fn assert_close(actual: [u8; 4], expected: [u8; 4]) {
    let close = actual.iter().zip(&expected).all(|(a, e)| a.abs_diff(*e) <= 1);
    assert!(close, "{actual:?} != {expected:?}");
}

// ── fills ─────────────────────────────────────────────────────────────────

#[test]
fn solid_fill_covers_exactly_the_rectangle() {
    let mut s = surface(8, 8);
    fill(&mut s, &rect(2.0, 2.0, 4.0, 4.0), &solid(1.0, 0.0, 0.0, 1.0));
    assert_eq!(pixel(&s, 2, 2), [255, 0, 0, 255]);
    assert_eq!(pixel(&s, 5, 5), [255, 0, 0, 255]);
    assert_eq!(pixel(&s, 1, 2), [0, 0, 0, 0]);
    assert_eq!(pixel(&s, 6, 6), [0, 0, 0, 0]);
}

#[test]
fn out_of_range_color_is_clamped() {
    let mut s = surface(2, 2);
    fill(&mut s, &rect(0.0, 0.0, 2.0, 2.0), &solid(-10.0, 300.0, 0.0, 1.0));
    assert_eq!(pixel(&s, 0, 0), [0, 255, 0, 255]);
}

#[test]
fn zero_stop_gradient_leaves_pixels_unchanged() {
    let mut s = surface(4, 4);
    fill(&mut s, &rect(0.0, 0.0, 4.0, 4.0), &solid(0.0, 0.0, 1.0, 1.0));
    let before = s.pixels().to_vec();
    let empty = Style::linear_gradient(0.0, 0.0, 4.0, 0.0);
    s.render_path(RenderMode::Fill, &rect(0.0, 0.0, 4.0, 4.0), &empty, 1.0, Operator::Copy, 1.0, 1.0)
        .unwrap();
    assert_eq!(s.pixels(), before.as_slice());
}

#[test]
fn one_stop_gradient_fills_solid() {
    let mut s = surface(4, 1);
    let mut style = Style::linear_gradient(0.0, 0.0, 4.0, 0.0);
    style.add_color_stop(0.5, Color::new(0.0, 1.0, 0.0, 1.0));
    fill(&mut s, &rect(0.0, 0.0, 4.0, 1.0), &style);
    assert_eq!(pixel(&s, 0, 0), pixel(&s, 3, 0));
    assert_eq!(pixel(&s, 0, 0), [0, 255, 0, 255]);
}

#[test]
fn linear_gradient_runs_from_start_to_end() {
    let mut s = surface(10, 1);
    let mut style = Style::linear_gradient(0.0, 0.0, 10.0, 0.0);
    style.add_color_stop(0.0, Color::black()).add_color_stop(1.0, Color::white());
    fill(&mut s, &rect(0.0, 0.0, 10.0, 1.0), &style);
    let (left, right) = (pixel(&s, 0, 0), pixel(&s, 9, 0));
    assert!(left[0] < 20);
    assert!(right[0] > 235);
    assert!(pixel(&s, 4, 0)[0] < pixel(&s, 5, 0)[0]);
}

#[test]
fn move_to_and_close_contribute_nothing() {
    let mut s = surface(8, 8);
    let mut path = Path::new();
    path.move_to(4.0, 4.0).close_path();
    fill(&mut s, &path, &solid(1.0, 1.0, 1.0, 1.0));
    s.render_path(RenderMode::Stroke, &path, &solid(1.0, 1.0, 1.0, 1.0), 4.0, Operator::SourceOver, 1.0, 1.0)
        .unwrap();
    assert!(s.pixels().iter().all(|&b| b == 0));
}

#[test]
fn full_circle_arc_with_equal_angles_is_filled() {
    let mut s = surface(20, 20);
    let mut path = Path::new();
    path.arc(10.0, 10.0, 8.0, PI, PI, false);
    fill(&mut s, &path, &solid(1.0, 1.0, 1.0, 1.0));
    assert_eq!(pixel(&s, 10, 10), [255, 255, 255, 255]);
    assert_eq!(pixel(&s, 10, 3), [255, 255, 255, 255]);
    assert_eq!(pixel(&s, 0, 0), [0, 0, 0, 0]);
}

#[test]
fn display_scale_and_transform_map_to_device_pixels() {
    let mut s = RasterSurface::new(4, 4, 2.0, true, Arc::new(FontSystem::new()), GradientSupport::MultiStop)
        .unwrap();
    s.set_transform(Transform::translate(2.0, 0.0));
    s.render_path(
        RenderMode::Fill,
        &rect(0.0, 0.0, 1.0, 1.0),
        &solid(1.0, 1.0, 1.0, 1.0),
        1.0,
        Operator::SourceOver,
        2.0,
        1.0,
    )
    .unwrap();
    assert_eq!(pixel(&s, 4, 0), [255, 255, 255, 255]);
    assert_eq!(pixel(&s, 5, 1), [255, 255, 255, 255]);
    assert_eq!(pixel(&s, 3, 0), [0, 0, 0, 0]);
    assert_eq!(pixel(&s, 6, 0), [0, 0, 0, 0]);
}

#[test]
fn global_alpha_scales_source() {
    let mut s = surface(2, 2);
    s.render_path(
        RenderMode::Fill,
        &rect(0.0, 0.0, 2.0, 2.0),
        &solid(1.0, 1.0, 1.0, 1.0),
        1.0,
        Operator::SourceOver,
        1.0,
        0.5,
    )
    .unwrap();
    assert_close(pixel(&s, 0, 0), [128, 128, 128, 128]);
}

// ── strokes ───────────────────────────────────────────────────────────────

#[test]
fn stroke_width_is_centered_on_the_line() {
    let mut s = surface(10, 10);
    let mut path = Path::new();
    path.move_to(0.0, 5.0).line_to(10.0, 5.0);
    s.render_path(RenderMode::Stroke, &path, &solid(1.0, 1.0, 1.0, 1.0), 2.0, Operator::SourceOver, 1.0, 1.0)
        .unwrap();
    assert_eq!(pixel(&s, 5, 4), [255, 255, 255, 255]);
    assert_eq!(pixel(&s, 5, 5), [255, 255, 255, 255]);
    assert_eq!(pixel(&s, 5, 3), [0, 0, 0, 0]);
    assert_eq!(pixel(&s, 5, 6), [0, 0, 0, 0]);
}

#[test]
fn stroked_rectangle_has_mitered_corners() {
    let mut s = surface(16, 16);
    s.render_path(
        RenderMode::Stroke,
        &rect(4.0, 4.0, 8.0, 8.0),
        &solid(1.0, 1.0, 1.0, 1.0),
        4.0,
        Operator::SourceOver,
        1.0,
        1.0,
    )
    .unwrap();
    // The outer corner square lies outside a round or bevel join.
    assert_eq!(pixel(&s, 2, 2), [255, 255, 255, 255]);
    assert_eq!(pixel(&s, 13, 13), [255, 255, 255, 255]);
    assert_eq!(pixel(&s, 1, 1), [0, 0, 0, 0]);
    assert_eq!(pixel(&s, 8, 8), [0, 0, 0, 0]);
}

#[test]
fn zero_width_stroke_draws_nothing() {
    let mut s = surface(8, 8);
    s.render_path(
        RenderMode::Stroke,
        &rect(2.0, 2.0, 4.0, 4.0),
        &solid(1.0, 1.0, 1.0, 1.0),
        0.0,
        Operator::SourceOver,
        1.0,
        1.0,
    )
    .unwrap();
    assert!(s.pixels().iter().all(|&b| b == 0));
}

// ── operators & alpha ─────────────────────────────────────────────────────

#[test]
fn copy_replaces_inside_the_shape_only() {
    let mut s = surface(4, 1);
    fill(&mut s, &rect(0.0, 0.0, 4.0, 1.0), &solid(1.0, 0.0, 0.0, 1.0));
    s.render_path(
        RenderMode::Fill,
        &rect(0.0, 0.0, 2.0, 1.0),
        &solid(0.0, 0.0, 1.0, 0.5),
        1.0,
        Operator::Copy,
        1.0,
        1.0,
    )
    .unwrap();
    assert_close(pixel(&s, 0, 0), [0, 0, 128, 128]);
    assert_eq!(pixel(&s, 3, 0), [255, 0, 0, 255]);
}

#[test]
fn surface_without_alpha_stays_opaque() {
    let ctx = RenderContext::new(ContextConfig::default());
    let mut s = ctx.create_raster_surface(2, 2, false).unwrap();
    assert_eq!(pixel(&s, 0, 0), [0, 0, 0, 255]);
    s.render_path(
        RenderMode::Fill,
        &rect(0.0, 0.0, 2.0, 2.0),
        &solid(1.0, 1.0, 1.0, 1.0),
        1.0,
        Operator::DestinationOut,
        1.0,
        1.0,
    )
    .unwrap();
    assert_eq!(pixel(&s, 1, 1)[3], 255);
}

// ── clip & state ──────────────────────────────────────────────────────────

#[test]
fn clip_limits_drawing() {
    let mut s = surface(8, 8);
    s.clip(&rect(0.0, 0.0, 4.0, 8.0), 1.0);
    fill(&mut s, &rect(0.0, 0.0, 8.0, 8.0), &solid(1.0, 1.0, 1.0, 1.0));
    assert_eq!(pixel(&s, 3, 3), [255, 255, 255, 255]);
    assert_eq!(pixel(&s, 4, 3), [0, 0, 0, 0]);

    s.reset_clip();
    fill(&mut s, &rect(0.0, 0.0, 8.0, 8.0), &solid(1.0, 1.0, 1.0, 1.0));
    assert_eq!(pixel(&s, 7, 7), [255, 255, 255, 255]);
}

#[test]
fn save_clip_restore_matches_unclipped_drawing() {
    let scene = |s: &mut RasterSurface| {
        fill(s, &rect(1.0, 1.0, 6.0, 3.0), &solid(0.2, 0.6, 1.0, 0.8));
        let mut tri = Path::new();
        tri.move_to(0.0, 8.0).line_to(8.0, 8.0).line_to(4.0, 2.0).close_path();
        fill(s, &tri, &solid(1.0, 0.5, 0.0, 0.5));
    };

    let mut clipped = surface(8, 8);
    scene(&mut clipped);
    clipped.save();
    clipped.clip(&rect(0.0, 0.0, 1.0, 1.0), 1.0);
    clipped.set_transform(Transform::scale(2.0, 2.0));
    clipped.set_alpha(0.1);
    clipped.restore().unwrap();
    scene(&mut clipped);

    let mut plain = surface(8, 8);
    scene(&mut plain);
    scene(&mut plain);

    assert_eq!(clipped.pixels(), plain.pixels());
    assert_eq!(clipped.transform(), Transform::identity());
    assert_eq!(clipped.alpha(), 1.0);
}

#[test]
fn nested_clips_intersect() {
    let mut s = surface(8, 8);
    s.clip(&rect(0.0, 0.0, 6.0, 8.0), 1.0);
    s.clip(&rect(2.0, 0.0, 6.0, 8.0), 1.0);
    fill(&mut s, &rect(0.0, 0.0, 8.0, 8.0), &solid(1.0, 1.0, 1.0, 1.0));
    assert_eq!(pixel(&s, 1, 0), [0, 0, 0, 0]);
    assert_eq!(pixel(&s, 3, 0), [255, 255, 255, 255]);
    assert_eq!(pixel(&s, 6, 0), [0, 0, 0, 0]);
}

#[test]
fn restore_without_save_underflows() {
    let mut s = surface(1, 1);
    assert_eq!(s.restore(), Err(CanvasError::StateStackUnderflow));
    s.save();
    assert!(s.restore().is_ok());
    assert_eq!(s.restore(), Err(CanvasError::StateStackUnderflow));
}

// ── resize ────────────────────────────────────────────────────────────────

#[test]
fn resize_commits_dimensions_and_alpha_together() {
    let mut s = RasterSurface::new(100, 100, 2.0, false, Arc::new(FontSystem::new()), GradientSupport::MultiStop)
        .unwrap();
    s.save();
    s.resize(200, 100, 2.0, true).unwrap();
    assert_eq!((s.logical_width(), s.logical_height()), (200, 100));
    assert_eq!((s.actual_width(), s.actual_height()), (400, 200));
    assert!(s.has_alpha());
    assert_eq!(s.pixels().len(), 400 * 200 * 4);
    assert_eq!(s.restore(), Err(CanvasError::StateStackUnderflow));
}

#[test]
fn failed_resize_keeps_previous_state() {
    let mut s = surface(10, 10);
    assert!(matches!(s.resize(10, 10, -1.0, false), Err(CanvasError::InvalidDimensions { .. })));
    assert_eq!((s.actual_width(), s.actual_height()), (10, 10));
    assert!(s.has_alpha());
}

// ── memory ────────────────────────────────────────────────────────────────

#[test]
fn partial_lock_copies_region_and_releases_buffer() {
    let mut s = surface(4, 4);
    fill(&mut s, &rect(2.0, 2.0, 2.0, 2.0), &solid(1.0, 1.0, 1.0, 1.0));
    {
        let mut lock = s.lock_memory_partial(2, 2, 3, 3).unwrap();
        assert_eq!((lock.width(), lock.height()), (3, 3));
        assert_eq!(&lock.pixels()[0..4], &[255, 255, 255, 255]);
        assert_eq!(&lock.pixels()[8..12], &[0, 0, 0, 0]);
        assert!(lock.pixels_mut().is_none());
    }
    assert!(!s.info().has_scaled_buffer());
}

#[test]
fn oversized_partial_lock_fails_without_allocating() {
    let mut s = surface(2, 2);
    let err = s.lock_memory_partial(0, 0, 1 << 20, 1 << 20).unwrap_err();
    assert!(matches!(err, CanvasError::InvalidDimensions { .. }));
    assert!(!s.info().has_scaled_buffer());
    assert!(s.lock_memory_partial(0, 0, 1, 1).is_ok());
}

#[test]
fn write_lock_marks_surface_dirty() {
    let mut s = surface(2, 2);
    s.info_mut().take_dirty();
    {
        let mut lock = s.lock_memory(true).unwrap();
        lock.pixels_mut().unwrap()[3] = 255;
    }
    assert!(s.info().is_dirty());
    assert_eq!(s.create_image().unwrap().pixels()[3], 255);
}

// ── images & surfaces ─────────────────────────────────────────────────────

#[test]
fn draw_image_honours_partial_alpha() {
    let mut s = surface(2, 2);
    let image = Image::from_premultiplied(1, 1, vec![255, 0, 0, 255]);
    s.draw_image(&image, 0.0, 0.0, 2.0, 2.0, 0.5, false).unwrap();
    assert_close(pixel(&s, 1, 1), [128, 0, 0, 128]);
}

#[test]
fn draw_image_scales_with_nearest_sampling() {
    let mut s = surface(4, 2);
    let image = Image::from_premultiplied(2, 1, vec![255, 0, 0, 255, 0, 0, 255, 255]);
    s.draw_image(&image, 0.0, 0.0, 4.0, 2.0, 1.0, false).unwrap();
    assert_eq!(pixel(&s, 1, 0), [255, 0, 0, 255]);
    assert_eq!(pixel(&s, 2, 1), [0, 0, 255, 255]);
}

#[test]
fn draw_surface_between_raster_surfaces() {
    let mut src = surface(2, 2);
    fill(&mut src, &rect(0.0, 0.0, 2.0, 2.0), &solid(0.0, 1.0, 0.0, 1.0));
    let mut dst = surface(4, 4);
    dst.draw_surface(&src, 1.0, 1.0, 2.0, 2.0, 1.0, true).unwrap();
    assert_eq!(pixel(&dst, 1, 1), [0, 255, 0, 255]);
    assert_eq!(pixel(&dst, 0, 0), [0, 0, 0, 0]);
}

#[derive(Default)]
struct CountingAllocator {
    next: u32,
}

impl TextureAllocator for CountingAllocator {
    fn allocate(&mut self, _: u32, _: u32) -> Result<TextureHandle> {
        self.next += 1;
        TextureHandle::new(self.next).ok_or_else(|| CanvasError::ResourceUnavailable("zero".into()))
    }

    fn upload(&mut self, _: TextureHandle, _: u32, _: u32, _: &[u8]) -> Result<()> {
        Ok(())
    }

    fn delete(&mut self, _: TextureHandle) {}
}

#[test]
fn draw_surface_from_another_backend_fails() {
    let allocator: SharedAllocator = Rc::new(RefCell::new(CountingAllocator::default()));
    let gpu = GpuSurface::new(surface(2, 2), TexturePool::new(), allocator).unwrap();

    let mut dst = surface(4, 4);
    let err = dst.draw_surface(&gpu, 0.0, 0.0, 2.0, 2.0, 1.0, true).unwrap_err();
    assert_eq!(
        err,
        CanvasError::BackendMismatch { expected: BackendKind::Raster, found: BackendKind::Gpu }
    );
    assert!(dst.pixels().iter().all(|&b| b == 0));
}

// ── text ──────────────────────────────────────────────────────────────────

#[test]
fn text_without_fonts_measures_zero_and_draws_nothing() {
    use easel_engine::text::{Font, TextAlign, TextBaseline};

    let mut s = surface(16, 16);
    let font = Font::new("sans", 12.0);
    assert_eq!(s.measure_text(&font, "hello", 1.0).width, 0.0);
    s.render_text(
        RenderMode::Stroke,
        &font,
        &solid(1.0, 1.0, 1.0, 1.0),
        TextBaseline::Top,
        TextAlign::Start,
        "hello",
        0.0,
        0.0,
        1.0,
        Operator::SourceOver,
        1.0,
        1.0,
    )
    .unwrap();
    assert!(s.pixels().iter().all(|&b| b == 0));
}
