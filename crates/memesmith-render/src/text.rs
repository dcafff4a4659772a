//! Stroke-font text shaping.
//!
//! Captions are drawn from Hershey stroke fonts rather than outline fonts:
//! every glyph is a set of polylines, which are stroked once for the outline
//! colour and again for the fill. Shaping turns a string into those
//! polylines, positioned in canvas pixels.

use tiny_skia::{Path, PathBuilder};
use vector_text::{HersheyFont, VectorFont, render_text};

/// Font units per em. Glyph coordinates are divided by this and multiplied
/// by the requested pixel size.
const UNITS_PER_EM: f32 = 28.0;

/// The y coordinate of the Roman baseline in font units.
const BASELINE: f32 = 9.0;

/// Horizontal alignment of a text run relative to its x coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAnchor {
    /// x is the left edge.
    Start,
    /// x is the centre.
    #[default]
    Middle,
    /// x is the right edge.
    End,
}

/// The stroke face used for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontFace {
    /// Triplex Roman; heavy, used for captions.
    #[default]
    Caption,
    /// Simplex Roman; thin, used for the watermark.
    Plain,
}

impl FontFace {
    fn vector_font(self) -> VectorFont {
        match self {
            FontFace::Caption => VectorFont::HersheyFont(HersheyFont::Romant),
            FontFace::Plain => VectorFont::HersheyFont(HersheyFont::Romans),
        }
    }
}

/// A polyline in font units.
#[derive(Debug, Clone, Default, PartialEq)]
struct Stroke(Vec<(f32, f32)>);

/// A shaped line of text in font units.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapedText {
    strokes: Vec<Stroke>,
    min_x: f32,
    max_x: f32,
}

impl ShapedText {
    /// Shape `text` in the given face.
    ///
    /// Characters the face has no glyph for are skipped.
    pub fn shape(text: &str, face: FontFace) -> Self {
        let points = render_text(text, face.vector_font());

        let mut strokes: Vec<Stroke> = Vec::new();
        for p in &points {
            let pt = (p.x as f32, p.y as f32);
            match strokes.last_mut() {
                Some(current) if p.pen => current.0.push(pt),
                _ => strokes.push(Stroke(vec![pt])),
            }
        }
        strokes.retain(|s| s.0.len() > 1);

        let (min_x, max_x) = strokes
            .iter()
            .flat_map(|s| s.0.iter())
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &(x, _)| {
                (lo.min(x), hi.max(x))
            });

        if strokes.is_empty() {
            return Self {
                strokes,
                min_x: 0.0,
                max_x: 0.0,
            };
        }

        Self {
            strokes,
            min_x,
            max_x,
        }
    }

    /// Whether any ink was produced.
    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    /// Ink width in pixels at `font_size`.
    pub fn width(&self, font_size: f32) -> f32 {
        (self.max_x - self.min_x) * scale(font_size)
    }

    /// Build a canvas path with the baseline at `y` and the run anchored at
    /// `x`. Returns `None` when there is nothing to draw.
    pub fn to_path(&self, x: f32, y: f32, font_size: f32, anchor: TextAnchor) -> Option<Path> {
        if self.is_empty() {
            return None;
        }

        let s = scale(font_size);
        let width = self.width(font_size);
        let left = match anchor {
            TextAnchor::Start => x,
            TextAnchor::Middle => x - width / 2.0,
            TextAnchor::End => x - width,
        };

        let mut pb = PathBuilder::new();
        for stroke in &self.strokes {
            let mut pts = stroke.0.iter().map(|&(px, py)| {
                (left + (px - self.min_x) * s, y + (py - BASELINE) * s)
            });
            if let Some((sx, sy)) = pts.next() {
                pb.move_to(sx, sy);
                for (lx, ly) in pts {
                    pb.line_to(lx, ly);
                }
            }
        }
        pb.finish()
    }
}

fn scale(font_size: f32) -> f32 {
    font_size.max(0.0) / UNITS_PER_EM
}
