//! MemeSmith Render: raster meme compositing.
//!
//! Loads a base image, fits it to the output size, draws stroked and filled
//! captions with an optional effect, stamps a watermark, and encodes the
//! result.
//!
//! ```
//! use memesmith_render::{process_upload, Canvas, OverlaySettings, Rgba, UploadOptions};
//!
//! # fn main() -> memesmith_render::Result<()> {
//! let photo = Canvas::filled(2000, 1000, Rgba::rgb(40, 40, 40))?.encode_png()?;
//! let settings = OverlaySettings::parse(Some(r#"{"texts":[{"content":"HELLO"}]}"#))?;
//! let png = process_upload(&photo, &settings, &UploadOptions::default())?;
//! assert_eq!(&png[1..4], b"PNG");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod canvas;
pub mod color;
pub mod error;
pub mod geometry;
pub mod overlay;
pub mod pipeline;
pub mod text;

pub use canvas::{Canvas, OutputFormat};
pub use color::Rgba;
pub use error::{RenderError, Result};
pub use geometry::fit_dimensions;
pub use overlay::{Caption, OverlaySettings, TextOverlay, TextStyle, Watermark};
pub use pipeline::{process_upload, render_template, UploadOptions};
pub use text::{FontFace, ShapedText, TextAnchor};
