//! Meme templates and caption anchors.

use serde::{Deserialize, Serialize};

use super::TemplateId;

/// A caption anchor in template pixel coordinates.
///
/// `x` is the horizontal centre of the caption, `y` its baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextPosition {
    /// Horizontal centre.
    pub x: f32,
    /// Baseline.
    pub y: f32,
}

impl TextPosition {
    /// Creates a new anchor.
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Top and bottom caption anchors of a template.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextPositions {
    /// Anchor of the top caption.
    pub top: TextPosition,
    /// Anchor of the bottom caption.
    pub bottom: TextPosition,
}

/// A predefined base image with fixed caption anchors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemeTemplate {
    /// Template identifier.
    pub id: TemplateId,
    /// Display name.
    pub name: String,
    /// Location of the base image; a site-relative path or an absolute URL.
    pub url: String,
    /// Render width in pixels.
    pub width: u32,
    /// Render height in pixels.
    pub height: u32,
    /// Caption anchors.
    #[serde(rename = "textPositions")]
    pub text_positions: TextPositions,
    /// Only available to pro users (or for a credit).
    #[serde(default)]
    pub pro_only: bool,
}

impl MemeTemplate {
    /// Build a free template with captions anchored at 1/10 and 9/10 of the
    /// height, centred horizontally.
    pub fn with_default_anchors(id: &str, name: &str, width: u32, height: u32) -> Self {
        let cx = width as f32 / 2.0;
        Self {
            id: TemplateId::new(id),
            name: name.to_string(),
            url: format!("/memes/{}.jpg", TemplateId::new(id)),
            width,
            height,
            text_positions: TextPositions {
                top: TextPosition::new(cx, (height as f32 * 0.1).max(48.0)),
                bottom: TextPosition::new(cx, height as f32 * 0.9),
            },
            pro_only: false,
        }
    }

    /// Marks the template as pro-only.
    pub fn pro(mut self) -> Self {
        self.pro_only = true;
        self
    }

    /// File name of the base image, taken from the last path segment of `url`.
    pub fn file_name(&self) -> Option<&str> {
        let path = self.url.split(['?', '#']).next().unwrap_or_default();
        path.rsplit('/').next().filter(|name| !name.is_empty())
    }

    /// Whether the base image lives on a remote host.
    pub fn is_remote(&self) -> bool {
        self.url.starts_with("http://") || self.url.starts_with("https://")
    }
}
