//! Decoded images ready for drawing.
//!
//! Raster formats go through the `image` crate and SVG documents through
//! `resvg`; either way the result is premultiplied RGBA8.

use crate::error::{CanvasError, Result};

/// Encoded formats recognised by [`Image::decode`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    /// XML document, decoded as SVG.
    Xml,
}

impl ImageFormat {
    /// Identifies the format from the leading bytes.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        const PNG: &[u8] = b"\x89PNG\r\n\x1a\n";
        if bytes.starts_with(PNG) {
            Some(Self::Png)
        } else if bytes.starts_with(&[0xff, 0xd8, 0xff]) {
            Some(Self::Jpeg)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(Self::Gif)
        } else if is_xml(bytes) {
            Some(Self::Xml)
        } else {
            None
        }
    }
}

fn is_xml(bytes: &[u8]) -> bool {
    let body = bytes.strip_prefix(b"\xef\xbb\xbf").unwrap_or(bytes);
    body.iter()
        .find(|b| !b.is_ascii_whitespace())
        .is_some_and(|&b| b == b'<')
}

/// Premultiplied RGBA8 pixels, row-major, stride `width * 4`.
#[derive(Clone, PartialEq, Eq)]
pub struct Image {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Image {
    /// Wraps already-premultiplied pixels. A buffer of the wrong length is
    /// truncated or padded with transparent pixels.
    pub fn from_premultiplied(width: u32, height: u32, mut pixels: Vec<u8>) -> Self {
        pixels.resize(width as usize * height as usize * 4, 0);
        Self { width, height, pixels }
    }

    /// Premultiplies straight-alpha RGBA8 pixels.
    pub fn from_straight_rgba(width: u32, height: u32, mut pixels: Vec<u8>) -> Self {
        for px in pixels.chunks_exact_mut(4) {
            let a = px[3] as u16;
            for c in &mut px[..3] {
                *c = ((*c as u16 * a + 127) / 255) as u8;
            }
        }
        Self::from_premultiplied(width, height, pixels)
    }

    /// Decodes PNG, JPEG, GIF or SVG bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let format = ImageFormat::sniff(bytes)
            .ok_or_else(|| CanvasError::unavailable("unrecognised image format"))?;
        let image = match format {
            ImageFormat::Png => decode_raster(bytes, image::ImageFormat::Png)?,
            ImageFormat::Jpeg => decode_raster(bytes, image::ImageFormat::Jpeg)?,
            ImageFormat::Gif => decode_raster(bytes, image::ImageFormat::Gif)?,
            ImageFormat::Xml => decode_svg(bytes)?,
        };
        log::debug!("Image: decoded {format:?} {}x{}", image.width, image.height);
        Ok(image)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl std::fmt::Debug for Image {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Image")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

fn decode_raster(bytes: &[u8], format: image::ImageFormat) -> Result<Image> {
    let rgba = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| CanvasError::unavailable(format!("{format:?} decode failed: {e}")))?
        .into_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(Image::from_straight_rgba(width, height, rgba.into_raw()))
}

fn decode_svg(bytes: &[u8]) -> Result<Image> {
    use resvg::{tiny_skia, usvg};

    let tree = usvg::Tree::from_data(bytes, &usvg::Options::default())
        .map_err(|e| CanvasError::unavailable(format!("SVG parse failed: {e}")))?;
    let size = tree.size().to_int_size();
    let mut pixmap = tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| CanvasError::unavailable("SVG has an empty canvas"))?;
    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());
    // tiny-skia stores premultiplied RGBA8 already.
    Ok(Image::from_premultiplied(size.width(), size.height(), pixmap.take()))
}
