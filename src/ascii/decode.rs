//! Decoding of encoded images (PNG, JPEG, GIF, BMP) into RGBA pixels.

use crate::error::RenderError;
use crate::renderer::PixelBuffer;

/// An owned RGBA image produced by [`decode_image`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl DecodedImage {
    /// Borrow the decoded pixels as a renderer input.
    pub fn as_buffer(&self) -> Result<PixelBuffer<'_>, RenderError> {
        PixelBuffer::new(&self.data, self.width, self.height)
    }
}

/// Decode an encoded image, guessing its format from the content.
///
/// Fails with [`RenderError::InvalidInput`] for empty input, unknown
/// formats and corrupt data.
pub fn decode_image(bytes: &[u8]) -> Result<DecodedImage, RenderError> {
    if bytes.is_empty() {
        return Err(RenderError::InvalidInput("empty image data".to_string()));
    }

    let img = image::load_from_memory(bytes)
        .map_err(|e| RenderError::InvalidInput(format!("error decoding image: {}", e)))?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    log::debug!("Decoded image: {}x{}", width, height);

    Ok(DecodedImage {
        data: rgba.into_raw(),
        width,
        height,
    })
}
