use std::f32::consts::TAU;

use anyhow::{Context, Result};
use easel_engine::composite::Compositing;
use easel_engine::device::GpuInit;
use easel_engine::geometry::Path;
use easel_engine::logging::{init_logging, LoggingConfig};
use easel_engine::paint::{Color, Style};
use easel_engine::resource::Image;
use easel_engine::surface::{Operator, RenderMode, Surface};
use easel_engine::text::{Font, FontWeight, TextAlign, TextBaseline};
use easel_engine::{ContextConfig, RenderContext};

const WIDTH: u32 = 320;
const HEIGHT: u32 = 200;
const SCALE: f32 = 2.0;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let mut output = String::from("easel-demo.png");
    let mut use_gpu = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--gpu" => use_gpu = true,
            other => output = other.to_owned(),
        }
    }

    let config = ContextConfig { display_scale: SCALE, ..ContextConfig::default() };
    let mut ctx = if use_gpu {
        RenderContext::with_gpu(config.clone(), GpuInit::default()).unwrap_or_else(|e| {
            log::warn!("GPU unavailable ({e}); continuing with the raster backend");
            RenderContext::new(config)
        })
    } else {
        RenderContext::new(config)
    };

    let font = load_font();
    if font.is_empty() {
        log::warn!("no system font found; text will be skipped");
    } else {
        ctx.fonts_mut().load_font("sans", &font)?;
    }

    let snapshot = if ctx.gpu().is_some() {
        let mut surface = ctx.create_gpu_surface(WIDTH, HEIGHT, true)?;
        draw_scene(&ctx, &mut surface)?;
        surface.flush()?;
        let image = surface.create_image()?;
        drop(surface);
        log::info!("released {} texture(s)", ctx.begin_frame()?);
        image
    } else {
        let mut surface = ctx.create_raster_surface(WIDTH, HEIGHT, true)?;
        draw_scene(&ctx, &mut surface)?;
        surface.create_image()?
    };

    save_png(&snapshot, &output)?;
    log::info!("wrote {output} ({}x{})", snapshot.width(), snapshot.height());
    Ok(())
}

fn draw_scene(ctx: &RenderContext, surface: &mut dyn Surface) -> Result<()> {
    let w = WIDTH as f32;
    let h = HEIGHT as f32;

    // ── background ────────────────────────────────────────────────────────
    let mut background = Style::linear_gradient(0.0, 0.0, 0.0, h);
    background
        .add_color_stop(0.0, Color::from_rgba8(24, 28, 44, 255))
        .add_color_stop(1.0, Color::from_rgba8(58, 40, 86, 255));
    let mut page = Path::new();
    page.rect(0.0, 0.0, w, h);
    surface.render_path(RenderMode::Fill, &page, &background, 1.0, Operator::SourceOver, SCALE, 1.0)?;

    // ── soft shadow drawn on its own layer ────────────────────────────────
    let mut shadow = ctx.create_raster_surface(WIDTH, HEIGHT, true)?;
    let mut disc = Path::new();
    disc.arc(w * 0.5 + 6.0, h * 0.5 + 8.0, 56.0, 0.0, TAU, false);
    shadow.render_path(RenderMode::Fill, &disc, &Style::solid(Color::black()), 1.0, Operator::SourceOver, SCALE, 1.0)?;
    shadow.blur(12.0 * SCALE)?;
    let shadow_image = shadow.create_image()?;
    let (device_w, device_h) = (surface.actual_width() as f32, surface.actual_height() as f32);
    surface.draw_image(&shadow_image, 0.0, 0.0, device_w, device_h, 0.6, true)?;

    // ── sun ───────────────────────────────────────────────────────────────
    let mut sun = Style::radial_gradient(w * 0.5, h * 0.5, 56.0);
    sun.add_color_stop(0.0, Color::from_rgba8(255, 236, 160, 255))
        .add_color_stop(0.7, Color::from_rgba8(255, 150, 60, 255))
        .add_color_stop(1.0, Color::from_rgba8(220, 60, 80, 255));
    let mut circle = Path::new();
    circle.arc(w * 0.5, h * 0.5, 56.0, 0.0, TAU, false);
    surface.render_path(RenderMode::Fill, &circle, &sun, 1.0, Operator::SourceOver, SCALE, 1.0)?;

    // ── horizon stripes clipped to the sun ────────────────────────────────
    surface.save();
    surface.clip(&circle, SCALE);
    for i in 0..5 {
        let mut stripe = Path::new();
        stripe.rect(0.0, h * 0.5 + 10.0 + i as f32 * 10.0, w, 3.0 + i as f32);
        surface.render_path(
            RenderMode::Fill,
            &stripe,
            &Style::solid(Color::from_rgba8(58, 40, 86, 255)),
            1.0,
            Operator::SourceOver,
            SCALE,
            1.0,
        )?;
    }
    surface.restore()?;

    // ── outline ───────────────────────────────────────────────────────────
    let mut frame = Path::new();
    frame.rect(12.0, 12.0, w - 24.0, h - 24.0);
    surface.render_path(
        RenderMode::Stroke,
        &frame,
        &Style::solid(Color::new(1.0, 1.0, 1.0, 0.35)),
        2.0,
        Operator::SourceOver,
        SCALE,
        1.0,
    )?;

    // ── caption ───────────────────────────────────────────────────────────
    let font = Font::new("sans", 18.0).with_weight(FontWeight::Bold);
    let metrics = surface.measure_text(&font, "easel", SCALE);
    log::debug!("caption measures {:.1}x{:.1}", metrics.width, metrics.height);
    surface.render_text(
        RenderMode::Fill,
        &font,
        &Style::solid(Color::white()),
        TextBaseline::Bottom,
        TextAlign::Center,
        "easel",
        w * 0.5,
        h - 20.0,
        1.0,
        Operator::SourceOver,
        SCALE,
        1.0,
    )?;
    Ok(())
}

/// Writes a premultiplied image as a straight-alpha PNG.
fn save_png(snapshot: &Image, path: &str) -> Result<()> {
    let straight: Vec<u8> = snapshot
        .pixels()
        .chunks_exact(4)
        .flat_map(|p| {
            let a = p[3] as u32;
            let un = |c: u8| if a == 0 { 0 } else { ((c as u32 * 255 + a / 2) / a).min(255) as u8 };
            [un(p[0]), un(p[1]), un(p[2]), p[3]]
        })
        .collect();
    let buffer = image::RgbaImage::from_raw(snapshot.width(), snapshot.height(), straight)
        .context("pixel buffer does not match image size")?;
    buffer.save(path).with_context(|| format!("failed to write {path}"))?;
    Ok(())
}

fn load_font() -> Vec<u8> {
    [
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/noto/NotoSans-Regular.ttf",
        "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    ]
    .iter()
    .find_map(|p| std::fs::read(p).ok())
    .unwrap_or_default()
}
