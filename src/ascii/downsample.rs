//! Downsampling luminance data to character cells.

/// Pixel span `[start, end)` covered by cell `index` out of `count` cells
/// along an axis of `extent` pixels.
///
/// Spans tile the axis without gaps. When there are more cells than pixels
/// each span is widened to one pixel, so every cell samples something.
#[inline]
pub fn cell_span(index: u32, count: u32, extent: u32) -> (u32, u32) {
    if count == 0 || extent == 0 {
        return (0, 0);
    }
    let start = (index as u64 * extent as u64 / count as u64) as u32;
    let end = ((index as u64 + 1) * extent as u64 / count as u64) as u32;
    let start = start.min(extent - 1);
    (start, end.max(start + 1).min(extent))
}

/// Downsample one horizontal band of luminance rows into a single row of
/// cells, reusing `buffer`.
///
/// `band` holds whole pixel rows of `img_width` pixels; every row in it is
/// averaged into the cells. This is how the renderer produces one output
/// row at a time.
///
/// # Returns
/// The number of cells written to the buffer.
pub fn downsample_band_into(
    band: &[u8],
    img_width: u32,
    char_width: u32,
    buffer: &mut Vec<u8>,
) -> usize {
    buffer.clear();

    if char_width == 0 || img_width == 0 || band.is_empty() {
        return 0;
    }

    let row_len = img_width as usize;
    let band_rows = band.len() / row_len;
    buffer.reserve(char_width as usize);

    for cx in 0..char_width {
        let (start_x, end_x) = cell_span(cx, char_width, img_width);

        let mut sum = 0u64;
        let mut count = 0u64;

        for py in 0..band_rows {
            let offset = py * row_len;
            for &v in &band[offset + start_x as usize..offset + end_x as usize] {
                sum += v as u64;
                count += 1;
            }
        }

        buffer.push(if count > 0 { (sum / count) as u8 } else { 0 });
    }

    char_width as usize
}
