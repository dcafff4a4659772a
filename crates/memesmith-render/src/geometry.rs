//! Output sizing.

/// Size an upload for mobile output, preserving its aspect ratio.
///
/// Landscape images (wider than tall) target `max_w` wide; everything else
/// targets `max_h` tall. Images that already fit inside that target are
/// never enlarged. Both dimensions are at least 1.
///
/// ```
/// use memesmith_render::fit_dimensions;
///
/// assert_eq!(fit_dimensions(4000, 3000, 1080, 1920), (1080, 810));
/// assert_eq!(fit_dimensions(3000, 4000, 1080, 1920), (1440, 1920));
/// assert_eq!(fit_dimensions(640, 480, 1080, 1920), (640, 480));
/// ```
pub fn fit_dimensions(src_w: u32, src_h: u32, max_w: u32, max_h: u32) -> (u32, u32) {
    if src_w == 0 || src_h == 0 {
        return (src_w.max(1), src_h.max(1));
    }

    let aspect = src_w as f64 / src_h as f64;
    let (target_w, target_h) = if aspect > 1.0 {
        let w = max_w as f64;
        (w, (w / aspect).round())
    } else {
        let h = max_h as f64;
        ((h * aspect).round(), h)
    };

    if src_w as f64 <= target_w && src_h as f64 <= target_h {
        return (src_w, src_h);
    }

    ((target_w as u32).max(1), (target_h as u32).max(1))
}

/// Scale factor that shrinks `content` to fit `available`, never above 1.
pub(crate) fn shrink_factor(content: f32, available: f32) -> f32 {
    if content <= 0.0 || available <= 0.0 || content <= available {
        1.0
    } else {
        available / content
    }
}
