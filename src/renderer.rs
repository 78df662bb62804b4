//! Streaming image-to-text-art renderer.
//!
//! A [`RenderRequest`] borrows an RGBA [`PixelBuffer`] and is turned into
//! rows of glyphs by the [`Renderer`]. Rows are produced lazily by [`Rows`],
//! so a caller can display each one before the next is computed:
//!
//! ```ignore
//! let renderer = Renderer::init();
//! let buffer = PixelBuffer::new(&rgba, width, height)?;
//! let request = RenderRequest::new(buffer, 80, false)?;
//! for row in renderer.rows(&request) {
//!     println!("{}", row);
//! }
//! ```

use std::fmt;
use std::iter::FusedIterator;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::ascii::{self, CharSet, ErrorDiffuser, CHANNELS};
use crate::error::RenderError;

/// Emit a progress record every this many rows.
const PROGRESS_INTERVAL: u32 = 10;

/// Largest grid a single request may render, in cells (`columns * rows`).
///
/// Requests above it fail with [`RenderError::InvalidInput`]. At 4096
/// columns this still allows 4096 rows.
pub const MAX_CELLS: u64 = 1 << 24;

static RENDERER: OnceLock<Renderer> = OnceLock::new();

/// Borrowed RGBA pixel data with its declared dimensions.
///
/// The length always equals `width * height * 4`; construction fails
/// otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelBuffer<'a> {
    data: &'a [u8],
    width: u32,
    height: u32,
}

impl<'a> PixelBuffer<'a> {
    /// Wrap RGBA bytes, validating them against the declared dimensions.
    pub fn new(data: &'a [u8], width: u32, height: u32) -> Result<Self, RenderError> {
        if data.is_empty() {
            return Err(RenderError::InvalidInput("empty pixel buffer".to_string()));
        }
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidInput(format!(
                "image dimensions must be non-zero, got {}x{}",
                width, height
            )));
        }

        let expected = width as u64 * height as u64 * CHANNELS as u64;
        if data.len() as u64 != expected {
            return Err(RenderError::InvalidInput(format!(
                "buffer length {} does not match {}x{} RGBA ({} bytes expected)",
                data.len(),
                width,
                height,
                expected
            )));
        }

        Ok(Self {
            data,
            width,
            height,
        })
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes of the pixel rows `[start_y, end_y)`.
    fn rows_slice(&self, start_y: u32, end_y: u32) -> &'a [u8] {
        let stride = self.width as usize * CHANNELS;
        &self.data[start_y as usize * stride..end_y as usize * stride]
    }
}

/// Dithering applied when quantizing brightness to glyph levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dither {
    /// Plain quantization
    #[default]
    None,
    /// 4x4 Bayer threshold pattern
    Ordered,
    /// Error diffusion carried from row to row
    FloydSteinberg,
}

impl Dither {
    pub fn name(&self) -> &'static str {
        match self {
            Dither::None => "none",
            Dither::Ordered => "ordered",
            Dither::FloydSteinberg => "floyd-steinberg",
        }
    }
}

impl fmt::Display for Dither {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dither {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "off" => Ok(Dither::None),
            "ordered" | "bayer" => Ok(Dither::Ordered),
            "floyd-steinberg" | "floyd_steinberg" | "fs" => Ok(Dither::FloydSteinberg),
            other => Err(format!(
                "Unknown dither mode '{}'. Available modes: none, ordered, floyd-steinberg",
                other
            )),
        }
    }
}

/// Tunables shared by every request of a relay or caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    /// Glyph ramp to map brightness onto
    pub charset: CharSet,
    /// Glyph cell aspect ratio (height/width) used to derive the row count
    pub char_aspect: f32,
    /// Apply gamma correction before mapping
    pub gamma: bool,
    /// Dithering applied when quantizing brightness to ramp levels
    pub dither: Dither,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            charset: CharSet::default(),
            char_aspect: ascii::DEFAULT_CHAR_ASPECT_RATIO,
            gamma: false,
            dither: Dither::default(),
        }
    }
}

impl RenderOptions {
    pub fn validate(&self) -> Result<(), RenderError> {
        if !self.char_aspect.is_finite() || self.char_aspect <= 0.0 {
            return Err(RenderError::InvalidInput(format!(
                "char_aspect must be a positive number, got {}",
                self.char_aspect
            )));
        }
        Ok(())
    }
}

/// One render invocation: the pixels, the output width and the direction of
/// the glyph mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderRequest<'a> {
    buffer: PixelBuffer<'a>,
    columns: u32,
    invert: bool,
    options: RenderOptions,
}

impl<'a> RenderRequest<'a> {
    /// Create a request with default options.
    ///
    /// Fails with [`RenderError::InvalidInput`] when `columns` is 0 or the
    /// output grid would exceed [`MAX_CELLS`].
    pub fn new(buffer: PixelBuffer<'a>, columns: u32, invert: bool) -> Result<Self, RenderError> {
        if columns == 0 {
            return Err(RenderError::InvalidInput(
                "cols must be greater than 0".to_string(),
            ));
        }
        let request = Self {
            buffer,
            columns,
            invert,
            options: RenderOptions::default(),
        };
        request.check_cells()?;
        Ok(request)
    }

    /// Replace the options, validating them.
    ///
    /// The cell limit is checked again since the aspect ratio changes the
    /// row count.
    pub fn with_options(mut self, options: RenderOptions) -> Result<Self, RenderError> {
        options.validate()?;
        self.options = options;
        self.check_cells()?;
        Ok(self)
    }

    fn check_cells(&self) -> Result<(), RenderError> {
        let rows = self.output_rows();
        let cells = self.columns as u64 * rows as u64;
        if self.columns as u64 > MAX_CELLS || cells > MAX_CELLS {
            return Err(RenderError::InvalidInput(format!(
                "cols {} gives a {}x{} grid, more than the {} cell limit",
                self.columns, self.columns, rows, MAX_CELLS
            )));
        }
        Ok(())
    }

    pub fn buffer(&self) -> PixelBuffer<'a> {
        self.buffer
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn invert(&self) -> bool {
        self.invert
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Number of rows this request renders to.
    pub fn output_rows(&self) -> u32 {
        ascii::output_rows(
            self.buffer.width,
            self.buffer.height,
            self.columns,
            self.options.char_aspect,
        )
    }
}

/// The complete, ordered rows of a render.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RenderResult {
    rows: Vec<String>,
}

impl RenderResult {
    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<String> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl From<Vec<String>> for RenderResult {
    fn from(rows: Vec<String>) -> Self {
        Self { rows }
    }
}

impl fmt::Display for RenderResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rows.join("\n"))
    }
}

/// Converts pixel buffers into glyph rows.
///
/// Holds luminance-to-level tables for every charset, with and without gamma
/// correction. The tables never change after construction, so one renderer
/// can serve any number of concurrent requests.
#[derive(Debug, Clone)]
pub struct Renderer {
    level_tables: Vec<[u8; 256]>,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    /// Build an independent renderer.
    pub fn new() -> Self {
        let mut level_tables = Vec::with_capacity(CharSet::ALL.len() * 2);
        for charset in CharSet::ALL {
            for gamma in [false, true] {
                let levels = charset.levels();
                let mut table = [0u8; 256];
                for (luma, slot) in table.iter_mut().enumerate() {
                    let luma = luma as u8;
                    let luma = if gamma { ascii::gamma_correct(luma) } else { luma };
                    *slot = ascii::luma_to_level(luma, levels) as u8;
                }
                level_tables.push(table);
            }
        }
        Self { level_tables }
    }

    /// Initialize the process-wide renderer, or return it if it already
    /// exists. Safe to call any number of times from any thread.
    pub fn init() -> &'static Renderer {
        RENDERER.get_or_init(|| {
            log::debug!("Initializing renderer lookup tables");
            Renderer::new()
        })
    }

    /// The process-wide renderer, if [`Renderer::init`] has run.
    pub fn get() -> Option<&'static Renderer> {
        RENDERER.get()
    }

    #[inline]
    fn level(&self, charset: CharSet, gamma: bool, luma: u8) -> usize {
        self.level_tables[charset.index() * 2 + gamma as usize][luma as usize] as usize
    }

    /// Start rendering `request`, returning a lazy iterator over its rows.
    ///
    /// Nothing is computed until the first row is pulled. Dropping the
    /// iterator abandons the render.
    pub fn rows<'a>(&'a self, request: &RenderRequest<'a>) -> Rows<'a> {
        let request = *request;
        let total = request.output_rows();

        log::debug!(
            "Rendering {}x{} image to {}x{} cells (charset: {}, invert: {}, dither: {})",
            request.buffer.width,
            request.buffer.height,
            request.columns,
            total,
            request.options.charset,
            request.invert,
            request.options.dither
        );

        Rows {
            renderer: self,
            request,
            total,
            next: 0,
            gray: Vec::new(),
            cells: Vec::new(),
            levels: Vec::new(),
            diffuser: None,
        }
    }

    /// Render every row of `request`, handing each to `on_row` as soon as it
    /// is complete, and return the full result.
    pub fn render<F>(&self, request: &RenderRequest<'_>, mut on_row: F) -> RenderResult
    where
        F: FnMut(&str),
    {
        let mut result = Vec::new();
        for row in self.rows(request) {
            on_row(&row);
            result.push(row);
        }
        RenderResult::from(result)
    }
}

/// Render `buffer` at `columns` wide with default options.
///
/// Initializes the process-wide renderer on first use. `on_row` receives
/// every row as it is produced; the complete result is returned at the end.
pub fn render<F>(
    buffer: PixelBuffer<'_>,
    columns: u32,
    invert: bool,
    on_row: F,
) -> Result<RenderResult, RenderError>
where
    F: FnMut(&str),
{
    let request = RenderRequest::new(buffer, columns, invert)?;
    Ok(Renderer::init().render(&request, on_row))
}

/// Lazy, finite sequence of rendered rows.
///
/// Produced by [`Renderer::rows`]. Each call to `next` computes exactly one
/// row; once exhausted it stays exhausted.
pub struct Rows<'a> {
    renderer: &'a Renderer,
    request: RenderRequest<'a>,
    total: u32,
    next: u32,
    gray: Vec<u8>,
    cells: Vec<u8>,
    levels: Vec<usize>,
    /// Created on the first Floyd-Steinberg row
    diffuser: Option<ErrorDiffuser>,
}

impl Rows<'_> {
    /// Total number of rows this render produces.
    pub fn total(&self) -> u32 {
        self.total
    }

    fn quantize(&mut self, row: u32) {
        let options = self.request.options;
        let charset = options.charset;
        let levels = charset.levels();

        match options.dither {
            Dither::None => {
                self.levels.clear();
                let renderer = self.renderer;
                self.levels.extend(
                    self.cells
                        .iter()
                        .map(|&b| renderer.level(charset, options.gamma, b)),
                );
            }
            Dither::Ordered => {
                self.levels.clear();
                for (x, &b) in self.cells.iter().enumerate() {
                    let b = if options.gamma { ascii::gamma_correct(b) } else { b };
                    self.levels
                        .push(ascii::ordered_dither_level(b, x, row as usize, levels));
                }
            }
            Dither::FloydSteinberg => {
                if options.gamma {
                    self.cells
                        .iter_mut()
                        .for_each(|b| *b = ascii::gamma_correct(*b));
                }
                let width = self.cells.len();
                let diffuser = self
                    .diffuser
                    .get_or_insert_with(|| ErrorDiffuser::new(width));
                diffuser.quantize_row(&self.cells, levels, &mut self.levels);
            }
        }
    }
}

impl Iterator for Rows<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.next >= self.total {
            return None;
        }
        let row = self.next;
        self.next += 1;

        let buffer = self.request.buffer;
        let (start_y, end_y) = ascii::cell_span(row, self.total, buffer.height);
        ascii::to_luminance_into(buffer.rows_slice(start_y, end_y), &mut self.gray);
        ascii::downsample_band_into(&self.gray, buffer.width, self.request.columns, &mut self.cells);
        self.quantize(row);

        let chars = self.request.options.charset.chars();
        let invert = self.request.invert;
        let line: String = self
            .levels
            .iter()
            .map(|&level| ascii::glyph(chars, level, invert))
            .collect();

        if row % PROGRESS_INTERVAL == 0 {
            log::debug!("Processed {} of {} rows", row + 1, self.total);
        }

        Some(line)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.total - self.next) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Rows<'_> {}

impl FusedIterator for Rows<'_> {}

impl fmt::Debug for Rows<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rows")
            .field("total", &self.total)
            .field("next", &self.next)
            .finish()
    }
}
