//! ascii-worker library crate.
//!
//! Streaming image-to-text-art rendering behind a message boundary: the
//! [`renderer`] turns RGBA pixels into glyph rows one at a time, and the
//! [`relay`] maps host messages onto it.

pub mod ascii;
pub mod config;
pub mod error;
pub mod relay;
pub mod renderer;

pub use error::RenderError;
pub use relay::{InputMessage, OutputMessage, Relay};
pub use renderer::{
    render, Dither, PixelBuffer, RenderOptions, RenderRequest, RenderResult, Renderer, Rows,
    MAX_CELLS,
};
