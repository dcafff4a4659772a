//! The raster surface captions are drawn on.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbaImage};
use memesmith_core::Effect;
use tiny_skia::{ColorU8, IntSize, LineCap, LineJoin, Paint, Path, Pixmap, Stroke, Transform};

use crate::color::Rgba;
use crate::geometry::shrink_factor;
use crate::overlay::{Caption, Watermark};
use crate::text::ShapedText;
use crate::{RenderError, Result};

/// Horizontal space kept clear on each side of a caption.
const CAPTION_MARGIN: f32 = 10.0;

/// Captions are never shrunk below this size.
const MIN_FONT_SIZE: f32 = 8.0;

/// Glow halo passes as (extra width per font pixel, alpha), widest first.
const GLOW_PASSES: [(f32, f32); 3] = [(0.3, 0.15), (0.2, 0.25), (0.1, 0.4)];

/// Encoded output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// 8-bit RGBA PNG.
    #[default]
    Png,
    /// Baseline JPEG; alpha is dropped.
    Jpeg {
        /// 1..=100
        quality: u8,
    },
}

impl OutputFormat {
    /// Pick a format from a file extension, defaulting to PNG.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => OutputFormat::Jpeg { quality: 90 },
            _ => OutputFormat::Png,
        }
    }

    /// MIME type of the encoded bytes.
    pub fn content_type(self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Jpeg { .. } => "image/jpeg",
        }
    }
}

/// An RGBA drawing surface.
pub struct Canvas {
    pixmap: Pixmap,
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

impl Canvas {
    /// A transparent canvas.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Pixmap::new(width, height)
            .map(|pixmap| Self { pixmap })
            .ok_or(RenderError::InvalidDimensions { width, height })
    }

    /// A canvas filled with one colour.
    pub fn filled(width: u32, height: u32, color: Rgba) -> Result<Self> {
        let mut canvas = Self::new(width, height)?;
        canvas.pixmap.fill(color.to_skia());
        Ok(canvas)
    }

    /// Copy a straight-alpha image onto a new canvas.
    pub fn from_rgba(img: &RgbaImage) -> Result<Self> {
        let (width, height) = img.dimensions();
        let size =
            IntSize::from_wh(width, height).ok_or(RenderError::InvalidDimensions { width, height })?;

        let mut data = Vec::with_capacity(img.as_raw().len());
        for px in img.pixels() {
            let [r, g, b, a] = px.0;
            let p = ColorU8::from_rgba(r, g, b, a).premultiply();
            data.extend_from_slice(&[p.red(), p.green(), p.blue(), p.alpha()]);
        }

        Pixmap::from_vec(data, size)
            .map(|pixmap| Self { pixmap })
            .ok_or(RenderError::InvalidDimensions { width, height })
    }

    /// Decode any format the `image` crate understands.
    pub fn from_image_bytes(bytes: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(bytes)?;
        log::debug!("Decoded {}x{} image", img.width(), img.height());
        Self::from_rgba(&img.to_rgba8())
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Straight-alpha colour at a pixel, or `None` outside the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        let c = self.pixmap.pixel(x, y)?.demultiply();
        Some(Rgba::new(c.red(), c.green(), c.blue(), c.alpha()))
    }

    /// Copy the canvas out as a straight-alpha image.
    pub fn to_rgba_image(&self) -> Result<RgbaImage> {
        let (width, height) = (self.width(), self.height());
        let mut raw = Vec::with_capacity(self.pixmap.data().len());
        for p in self.pixmap.pixels() {
            let c = p.demultiply();
            raw.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        RgbaImage::from_raw(width, height, raw).ok_or(RenderError::InvalidDimensions { width, height })
    }

    /// Resample to exactly `width` x `height` with a Lanczos3 filter.
    pub fn resize_to(&mut self, width: u32, height: u32) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidDimensions { width, height });
        }
        if (width, height) == (self.width(), self.height()) {
            return Ok(());
        }
        let resized = imageops::resize(&self.to_rgba_image()?, width, height, FilterType::Lanczos3);
        *self = Self::from_rgba(&resized)?;
        Ok(())
    }

    /// Draw a caption: optional glow, then the outline, then the fill.
    ///
    /// Captions wider than the canvas are shrunk to fit.
    pub fn draw_caption(&mut self, caption: &Caption, effect: Effect) {
        let shaped = ShapedText::shape(&caption.text, caption.style.face);
        if shaped.is_empty() {
            return;
        }

        let mut style = caption.style.clone();
        if effect == Effect::Golden {
            style.fill = Rgba::GOLD;
            style.stroke = Rgba::SADDLE_BROWN;
        }

        let available = self.width() as f32 - 2.0 * CAPTION_MARGIN;
        let natural = shaped.width(style.font_size) + style.line_width() + 2.0 * style.stroke_width;
        let factor = shrink_factor(natural, available);
        if factor < 1.0 {
            let shrunk = (style.font_size * factor).max(MIN_FONT_SIZE);
            log::debug!(
                "Shrinking caption from {}px to {}px to fit {}px",
                style.font_size,
                shrunk,
                self.width()
            );
            style.stroke_width *= shrunk / style.font_size;
            style.font_size = shrunk;
        }

        let Some(path) = shaped.to_path(caption.x, caption.y, style.font_size, style.anchor) else {
            return;
        };

        let line = style.line_width();
        let outline = line + 2.0 * style.stroke_width;

        if effect == Effect::Glow {
            for (extra, alpha) in GLOW_PASSES {
                let halo = style.fill.with_alpha(alpha * style.fill.a as f32 / 255.0);
                self.stroke(&path, halo, outline + extra * style.font_size);
            }
        }
        if style.stroke_width > 0.0 {
            self.stroke(&path, style.stroke, outline);
        }
        self.stroke(&path, style.fill, line);
    }

    /// Stamp the watermark in the bottom-right corner.
    pub fn draw_watermark(&mut self, watermark: &Watermark) {
        let caption = watermark.to_caption(self.width(), self.height());
        self.draw_caption(&caption, Effect::None);
    }

    fn stroke(&mut self, path: &Path, color: Rgba, width: f32) {
        let mut paint = Paint {
            anti_alias: true,
            ..Default::default()
        };
        paint.set_color(color.to_skia());

        let stroke = Stroke {
            width,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Default::default()
        };
        self.pixmap
            .stroke_path(path, &paint, &stroke, Transform::identity(), None);
    }

    /// Encode as 8-bit RGBA PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        self.pixmap
            .encode_png()
            .map_err(|e| RenderError::Encode(e.to_string()))
    }

    /// Encode in the given format.
    pub fn encode(&self, format: OutputFormat) -> Result<Vec<u8>> {
        match format {
            OutputFormat::Png => self.encode_png(),
            OutputFormat::Jpeg { quality } => {
                let rgb = DynamicImage::ImageRgba8(self.to_rgba_image()?).to_rgb8();
                let mut out = Cursor::new(Vec::new());
                let encoder = JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100));
                rgb.write_with_encoder(encoder)
                    .map_err(|e| RenderError::Encode(e.to_string()))?;
                Ok(out.into_inner())
            }
        }
    }
}
