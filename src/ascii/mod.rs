//! ASCII pipeline for converting RGBA pixel buffers to text art.
//!
//! The renderer composes these stages once per output row:
//!
//! 1. **Luminance** - RGBA to brightness using BT.601
//! 2. **Downsampling** - Average brightness over each character cell
//! 3. **Character mapping** - Map brightness to a glyph ramp, optionally
//!    gamma corrected and dithered
//!
//! # Character Sets
//!
//! Multiple glyph ramps are available via [`CharSet`]:
//! - `Standard` - 10-level ASCII density ramp
//! - `Blocks` - Unicode block characters
//! - `Minimal` - 4-level clean look

mod charset;
#[cfg(feature = "decode")]
mod decode;
mod dimensions;
mod downsample;
mod grayscale;
mod mapping;

pub use charset::{CharSet, BLOCKS_CHARSET, MINIMAL_CHARSET, STANDARD_CHARSET};
#[cfg(feature = "decode")]
pub use decode::{decode_image, DecodedImage};
pub use dimensions::{output_rows, DEFAULT_CHAR_ASPECT_RATIO, TERMINAL_CHAR_ASPECT_RATIO};
pub use downsample::{cell_span, downsample_band_into};
pub use grayscale::{luminance, to_luminance_into, CHANNELS};
pub use mapping::{
    gamma_correct, glyph, level_to_luma, luma_to_level, ordered_dither_level, ErrorDiffuser, GAMMA,
};
