//! End-to-end compositing.

use memesmith_core::{Effect, MemeTemplate};

use crate::canvas::{Canvas, OutputFormat};
use crate::geometry::fit_dimensions;
use crate::overlay::{Caption, OverlaySettings, Watermark};
use crate::Result;

/// Limits and branding for processed uploads.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadOptions {
    /// Landscape target width.
    pub max_width: u32,
    /// Portrait target height.
    pub max_height: u32,
    /// Watermark stamped after the captions. `None` skips it.
    pub watermark: Option<Watermark>,
    /// Output encoding.
    pub format: OutputFormat,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            max_width: 1080,
            max_height: 1920,
            watermark: Some(Watermark::default()),
            format: OutputFormat::Png,
        }
    }
}

/// Decode an upload, fit it for mobile, draw the captions and watermark, and
/// encode the result.
pub fn process_upload(bytes: &[u8], settings: &OverlaySettings, opts: &UploadOptions) -> Result<Vec<u8>> {
    let mut canvas = Canvas::from_image_bytes(bytes)?;
    let (src_w, src_h) = (canvas.width(), canvas.height());
    let (w, h) = fit_dimensions(src_w, src_h, opts.max_width, opts.max_height);
    canvas.resize_to(w, h)?;
    log::debug!("Fitted upload {src_w}x{src_h} to {w}x{h}");

    for overlay in &settings.texts {
        if let Some(caption) = overlay.resolve(w)? {
            canvas.draw_caption(&caption, Effect::None);
        }
    }

    if let Some(watermark) = &opts.watermark {
        canvas.draw_watermark(watermark);
    }

    canvas.encode(opts.format)
}

/// Render a template with top and bottom captions.
///
/// The base image is stretched to the template's declared size, and the
/// captions sit at the template's anchors.
pub fn render_template(
    template: &MemeTemplate,
    base_bytes: &[u8],
    top_text: &str,
    bottom_text: &str,
    effect: Effect,
    watermark: &Watermark,
) -> Result<Vec<u8>> {
    let mut canvas = Canvas::from_image_bytes(base_bytes)?;
    canvas.resize_to(template.width, template.height)?;

    let anchors = &template.text_positions;
    for (text, pos) in [(top_text, &anchors.top), (bottom_text, &anchors.bottom)] {
        if !text.trim().is_empty() {
            canvas.draw_caption(&Caption::template(text, pos.x, pos.y), effect);
        }
    }
    canvas.draw_watermark(watermark);

    log::debug!(
        "Rendered template {} at {}x{} with effect {}",
        template.id,
        template.width,
        template.height,
        effect
    );
    canvas.encode_png()
}
