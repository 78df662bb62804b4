//! Output row policy for aspect-ratio-correct ASCII rendering.

/// Default glyph cell aspect ratio (height / width).
///
/// Cells are treated as square, so the output grid has the same proportions
/// as the source image: a 4x4 image rendered at 4 columns yields 4 rows.
pub const DEFAULT_CHAR_ASPECT_RATIO: f32 = 1.0;

/// Typical terminal character aspect ratio.
/// Terminal characters are ~2x taller than wide; use this when the output is
/// shown in a terminal to avoid a vertically stretched image.
pub const TERMINAL_CHAR_ASPECT_RATIO: f32 = 2.0;

/// Calculate the number of output rows for a given column count.
///
/// The source image aspect ratio is preserved after compensating for the
/// glyph cell aspect ratio:
///
/// `rows = round(img_height * columns / (img_width * char_aspect))`
///
/// At least one row is produced for any non-empty image.
///
/// # Arguments
/// * `img_width` - Width of the source image in pixels
/// * `img_height` - Height of the source image in pixels
/// * `columns` - Output width in characters
/// * `char_aspect` - Glyph cell aspect ratio (height/width)
///
/// # Returns
/// The output row count, or 0 if any dimension is 0 or the aspect is not
/// a positive finite number.
///
/// # Example
/// ```ignore
/// // A 640x480 (4:3) image at 80 columns on a terminal
/// let rows = output_rows(640, 480, 80, TERMINAL_CHAR_ASPECT_RATIO);
/// assert_eq!(rows, 30);
/// ```
pub fn output_rows(img_width: u32, img_height: u32, columns: u32, char_aspect: f32) -> u32 {
    if img_width == 0 || img_height == 0 || columns == 0 {
        return 0;
    }
    if !char_aspect.is_finite() || char_aspect <= 0.0 {
        return 0;
    }

    let rows = (img_height as f64 * columns as f64) / (img_width as f64 * char_aspect as f64);
    // Clamp before the cast so absurd aspect ratios cannot wrap
    let rows = rows.round().min(u32::MAX as f64) as u32;
    rows.max(1)
}
