//! Caption and watermark settings.
//!
//! [`OverlaySettings`] is the JSON the upload endpoint accepts. Each
//! [`TextOverlay`] leaves most fields optional; [`TextOverlay::resolve`]
//! fills in defaults against the final canvas size and yields a [`Caption`]
//! ready to draw.

use serde::{Deserialize, Serialize};

use crate::color::Rgba;
use crate::text::{FontFace, TextAnchor};
use crate::Result;

/// Default caption size in pixels.
pub const DEFAULT_FONT_SIZE: f32 = 60.0;
/// Default caption baseline.
pub const DEFAULT_Y: f32 = 100.0;
/// Default outline width.
pub const DEFAULT_STROKE_WIDTH: f32 = 2.0;
/// Default watermark text.
pub const DEFAULT_WATERMARK: &str = "MemeSmith.com";

/// One caption as sent by a client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextOverlay {
    /// Caption text. Empty captions are skipped.
    #[serde(default)]
    pub content: String,
    /// Anchor x; defaults to the horizontal centre.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    /// Baseline y; defaults to 100.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    /// Size in pixels; defaults to 60.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    /// Fill colour; defaults to white.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Outline colour; defaults to black.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<String>,
    /// Outline width; defaults to 2.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f32>,
}

impl TextOverlay {
    /// A caption with only its text set.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    /// Resolve defaults for a canvas `canvas_width` pixels wide.
    ///
    /// Returns `Ok(None)` for blank captions. Fails only on unparsable
    /// colours.
    pub fn resolve(&self, canvas_width: u32) -> Result<Option<Caption>> {
        if self.content.trim().is_empty() {
            return Ok(None);
        }

        let font_size = or_default(self.font_size, DEFAULT_FONT_SIZE);
        let fill = match self.color.as_deref().map(str::trim) {
            Some(c) if !c.is_empty() => Rgba::parse(c)?,
            _ => Rgba::WHITE,
        };
        let stroke = match self.stroke_color.as_deref().map(str::trim) {
            Some(c) if !c.is_empty() => Rgba::parse(c)?,
            _ => Rgba::BLACK,
        };
        let stroke_width = or_default(self.stroke_width, DEFAULT_STROKE_WIDTH);

        Ok(Some(Caption {
            text: self.content.clone(),
            x: or_default(self.x, canvas_width as f32 / 2.0),
            y: or_default(self.y, DEFAULT_Y),
            style: TextStyle {
                font_size,
                fill,
                stroke,
                stroke_width,
                anchor: TextAnchor::Middle,
                face: FontFace::Caption,
                bold: true,
            },
        }))
    }
}

/// Zero, negative and non-finite values mean "unset", as they do for the
/// web client's settings.
fn or_default(value: Option<f32>, default: f32) -> f32 {
    value.filter(|v| v.is_finite() && *v > 0.0).unwrap_or(default)
}

/// The `settings` field of an upload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverlaySettings {
    /// Captions in draw order.
    #[serde(default)]
    pub texts: Vec<TextOverlay>,
}

impl OverlaySettings {
    /// Parse settings JSON. An absent or blank string means no captions.
    pub fn parse(json: Option<&str>) -> Result<Self> {
        match json.map(str::trim) {
            None | Some("") => Ok(Self::default()),
            Some(s) => Ok(serde_json::from_str(s)?),
        }
    }
}

/// Resolved drawing style for a run of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    /// Size in pixels.
    pub font_size: f32,
    /// Fill colour.
    pub fill: Rgba,
    /// Outline colour.
    pub stroke: Rgba,
    /// Outline width added on each side of the glyph line.
    pub stroke_width: f32,
    /// Horizontal alignment.
    pub anchor: TextAnchor,
    /// Stroke face.
    pub face: FontFace,
    /// Heavier glyph lines.
    pub bold: bool,
}

impl TextStyle {
    /// Width of the pen that draws glyph lines.
    pub fn line_width(&self) -> f32 {
        let weight = if self.bold { 0.12 } else { 0.08 };
        (self.font_size * weight).max(1.0)
    }
}

/// A caption ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct Caption {
    /// Text to draw.
    pub text: String,
    /// Anchor x in canvas pixels.
    pub x: f32,
    /// Baseline y in canvas pixels.
    pub y: f32,
    /// Drawing style.
    pub style: TextStyle,
}

impl Caption {
    /// The bold, heavily outlined caption used on templates.
    pub fn template(text: impl Into<String>, x: f32, y: f32) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            style: TextStyle {
                font_size: 48.0,
                fill: Rgba::WHITE,
                stroke: Rgba::BLACK,
                stroke_width: 5.0,
                anchor: TextAnchor::Middle,
                face: FontFace::Caption,
                bold: true,
            },
        }
    }
}

/// Bottom-right attribution text.
#[derive(Debug, Clone, PartialEq)]
pub struct Watermark {
    /// Text to draw.
    pub text: String,
    /// Size in pixels.
    pub font_size: f32,
    /// Fill colour.
    pub fill: Rgba,
    /// Outline colour.
    pub stroke: Rgba,
    /// Outline width.
    pub stroke_width: f32,
    /// Distance from the right and bottom edges.
    pub margin: f32,
}

impl Watermark {
    /// The watermark stamped on processed uploads.
    pub fn upload(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font_size: 18.0,
            fill: Rgba::WHITE.with_alpha(0.7),
            stroke: Rgba::BLACK.with_alpha(0.5),
            stroke_width: 0.5,
            margin: 10.0,
        }
    }

    /// The watermark stamped on template renders.
    pub fn template(site: &str) -> Self {
        Self {
            font_size: 16.0,
            ..Self::upload(format!("Created with {site}"))
        }
    }

    /// Position the watermark on a canvas of the given size.
    pub fn to_caption(&self, width: u32, height: u32) -> Caption {
        Caption {
            text: self.text.clone(),
            x: width as f32 - self.margin,
            y: height as f32 - self.margin,
            style: TextStyle {
                font_size: self.font_size,
                fill: self.fill,
                stroke: self.stroke,
                stroke_width: self.stroke_width,
                anchor: TextAnchor::End,
                face: FontFace::Plain,
                bold: false,
            },
        }
    }
}

impl Default for Watermark {
    fn default() -> Self {
        Self::upload(DEFAULT_WATERMARK)
    }
}
