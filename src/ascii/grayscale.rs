//! RGBA to luminance conversion using the ITU-R BT.601 formula.

/// Bytes per pixel in the buffers the renderer accepts (R, G, B, A).
pub const CHANNELS: usize = 4;

/// Luminance of a single pixel.
///
/// The luminance formula is: Y = 0.299*R + 0.587*G + 0.114*B, computed with
/// integer math (coefficients scaled by 1000: 299 + 587 + 114 = 1000).
#[inline]
pub fn luminance(r: u8, g: u8, b: u8) -> u8 {
    ((299 * r as u32 + 587 * g as u32 + 114 * b as u32) / 1000) as u8
}

/// Convert RGBA pixel data to luminance, reusing an existing buffer.
///
/// Alpha is ignored: pixels are treated as opaque. A trailing partial pixel
/// is dropped. This avoids allocation when called once per output row.
///
/// # Returns
/// The number of pixels written to the buffer
pub fn to_luminance_into(rgba: &[u8], buffer: &mut Vec<u8>) -> usize {
    let pixel_count = rgba.len() / CHANNELS;
    buffer.clear();
    buffer.reserve(pixel_count);

    for px in rgba.chunks_exact(CHANNELS) {
        buffer.push(luminance(px[0], px[1], px[2]));
    }

    pixel_count
}
