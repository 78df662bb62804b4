//! Brightness to glyph mapping.

use std::sync::OnceLock;

/// Standard display gamma (sRGB).
pub const GAMMA: f32 = 2.2;

static GAMMA_LUT: OnceLock<[u8; 256]> = OnceLock::new();

/// Gamma correction lookup table, built from [`GAMMA`] on first use.
/// Formula: output = round((input/255)^(1/GAMMA) * 255)
fn gamma_lut() -> &'static [u8; 256] {
    GAMMA_LUT.get_or_init(|| {
        let exponent = 1.0 / GAMMA as f64;
        let mut table = [0u8; 256];
        for (v, slot) in table.iter_mut().enumerate() {
            *slot = ((v as f64 / 255.0).powf(exponent) * 255.0).round() as u8;
        }
        table
    })
}

/// 4x4 Bayer matrix (normalized to 0-255 range).
#[rustfmt::skip]
const BAYER_4X4: [[i16; 4]; 4] = [
    [  0, 128,  32, 160],
    [192,  64, 224,  96],
    [ 48, 176,  16, 144],
    [240, 112, 208,  80],
];

/// Apply gamma correction to a brightness value.
#[inline]
pub fn gamma_correct(linear: u8) -> u8 {
    gamma_lut()[linear as usize]
}

/// Quantize a brightness value to a ramp level in `0..levels`.
#[inline]
pub fn luma_to_level(luma: u8, levels: usize) -> usize {
    if levels < 2 {
        return 0;
    }
    luma as usize * (levels - 1) / 255
}

/// Brightness a ramp level stands for (inverse of [`luma_to_level`] at the
/// level boundaries).
#[inline]
pub fn level_to_luma(level: usize, levels: usize) -> u8 {
    if levels < 2 {
        return 0;
    }
    (level.min(levels - 1) * 255 / (levels - 1)) as u8
}

/// Glyph for a ramp level.
///
/// With `invert` the ramp is read back to front, so the darkest level maps
/// to the densest glyph.
#[inline]
pub fn glyph(charset: &[char], level: usize, invert: bool) -> char {
    if charset.is_empty() {
        return ' ';
    }
    let level = level.min(charset.len() - 1);
    if invert {
        charset[charset.len() - 1 - level]
    } else {
        charset[level]
    }
}

/// Ramp level for a cell using ordered (Bayer) dithering.
///
/// The threshold depends only on the cell position, so rows can be
/// dithered independently of each other.
pub fn ordered_dither_level(luma: u8, x: usize, y: usize, levels: usize) -> usize {
    if levels < 2 {
        return 0;
    }
    // Threshold spread based on number of levels
    let spread = 255 / levels as i16;
    let threshold = BAYER_4X4[y % 4][x % 4];
    let adjusted = (luma as i16) + (threshold - 128) * spread / 256;
    luma_to_level(adjusted.clamp(0, 255) as u8, levels)
}

/// Streaming Floyd-Steinberg error diffusion.
///
/// Quantization error is pushed right within the current row and down into
/// the next one. The downward share is carried between calls, so the grid
/// can be quantized one row at a time.
///
/// ```text
///       [*] 7/16
/// 3/16 5/16 1/16
/// ```
#[derive(Debug, Clone)]
pub struct ErrorDiffuser {
    carry: Vec<i16>,
    current: Vec<i16>,
}

impl ErrorDiffuser {
    /// Create a diffuser for rows of `width` cells.
    pub fn new(width: usize) -> Self {
        Self {
            carry: vec![0; width],
            current: Vec::with_capacity(width),
        }
    }

    /// Quantize one row of brightness values into ramp levels.
    ///
    /// # Returns
    /// The number of levels written to `out`.
    pub fn quantize_row(&mut self, brightness: &[u8], levels: usize, out: &mut Vec<usize>) -> usize {
        out.clear();
        let w = brightness.len();
        self.carry.resize(w, 0);

        self.current.clear();
        self.current
            .extend(brightness.iter().zip(&self.carry).map(|(&b, &c)| b as i16 + c));
        self.carry.iter_mut().for_each(|c| *c = 0);

        for x in 0..w {
            let old_val = self.current[x].clamp(0, 255) as u8;
            let level = luma_to_level(old_val, levels);
            out.push(level);

            let error = self.current[x] - level_to_luma(level, levels) as i16;

            if x + 1 < w {
                self.current[x + 1] += error * 7 / 16;
                self.carry[x + 1] += error / 16;
            }
            if x > 0 {
                self.carry[x - 1] += error * 3 / 16;
            }
            self.carry[x] += error * 5 / 16;
        }

        w
    }
}
