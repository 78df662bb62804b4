//! Message boundary between a host and the renderer.
//!
//! The host transport (a worker port, a socket, stdin) delivers
//! [`InputMessage`]s and forwards every [`OutputMessage`] the relay posts.
//! A successful render posts one `stream` message per row followed by a
//! single `done`; any failure posts a single `error` and nothing after it.
//!
//! On the wire the messages look like:
//!
//! ```text
//! {"data": [...], "cols": 80, "invert": false, "width": 640, "height": 480}
//! {"type": "stream", "data": "  .:-=+*#"}
//! {"type": "done", "result": ["  .:-=+*#", ...]}
//! {"type": "error", "error": "Invalid input: cols must be greater than 0"}
//! ```

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use serde::{Deserialize, Serialize};

use crate::config::{Config, ConfigError};
use crate::error::RenderError;
use crate::renderer::{PixelBuffer, RenderOptions, RenderRequest, RenderResult, Renderer};

/// A render request as sent by the host.
///
/// With `width` and `height`, `data` is raw RGBA. Without them, `data` is an
/// encoded image (PNG, JPEG, GIF or BMP) when the `decode` feature is on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputMessage {
    pub data: Vec<u8>,
    pub cols: i64,
    /// Falls back to the relay's configured default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invert: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl InputMessage {
    /// Message carrying raw RGBA pixels.
    pub fn raw(data: Vec<u8>, width: u32, height: u32, cols: i64, invert: bool) -> Self {
        Self {
            data,
            cols,
            invert: Some(invert),
            width: Some(width),
            height: Some(height),
        }
    }

    /// Message carrying an encoded image.
    pub fn encoded(data: Vec<u8>, cols: i64, invert: bool) -> Self {
        Self {
            data,
            cols,
            invert: Some(invert),
            width: None,
            height: None,
        }
    }
}

/// Messages posted back to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutputMessage {
    /// One finished row
    Stream { data: String },
    /// Every row, in order
    Done { result: RenderResult },
    /// Human-readable failure description
    Error { error: String },
}

impl OutputMessage {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, OutputMessage::Stream { .. })
    }
}

/// Turns input messages into output messages.
///
/// Constructing a relay initializes the process-wide [`Renderer`], so the
/// first message never races initialization. Relays are cheap to copy
/// around and may handle messages from several threads at once.
#[derive(Debug, Clone, Copy)]
pub struct Relay {
    renderer: &'static Renderer,
    options: RenderOptions,
    default_invert: bool,
}

impl Relay {
    pub fn new(options: RenderOptions) -> Self {
        Self {
            renderer: Renderer::init(),
            options,
            default_invert: false,
        }
    }

    /// Build a relay from the `[render]` section of a config file.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let options = config.render.options()?;
        Ok(Self::new(options).with_default_invert(config.render.invert))
    }

    /// Invert setting used for messages that do not carry one.
    pub fn with_default_invert(mut self, invert: bool) -> Self {
        self.default_invert = invert;
        self
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Render one message, posting its output through `post`.
    ///
    /// Panics raised while rendering are trapped and reported as
    /// [`RenderError::InternalFailure`].
    pub fn handle<F>(&self, message: &InputMessage, mut post: F)
    where
        F: FnMut(OutputMessage),
    {
        log::debug!(
            "Processing image, data length: {}, cols: {}",
            message.data.len(),
            message.cols
        );

        let post: &mut dyn FnMut(OutputMessage) = &mut post;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.process(message, &mut *post)));

        let last = match outcome {
            Ok(Ok(result)) => {
                log::debug!("Image processing completed: {} rows", result.len());
                OutputMessage::Done { result }
            }
            Ok(Err(err)) => {
                log::warn!("Render rejected: {}", err);
                OutputMessage::Error {
                    error: err.to_string(),
                }
            }
            Err(payload) => {
                let err = RenderError::InternalFailure(panic_message(payload.as_ref()));
                log::error!("Render aborted: {}", err);
                OutputMessage::Error {
                    error: err.to_string(),
                }
            }
        };
        post(last);
    }

    /// Parse a JSON input message and handle it.
    ///
    /// Malformed JSON is reported as an `error` message.
    pub fn handle_json<F>(&self, json: &str, mut post: F)
    where
        F: FnMut(OutputMessage),
    {
        match serde_json::from_str::<InputMessage>(json) {
            Ok(message) => self.handle(&message, post),
            Err(e) => {
                let err = RenderError::InvalidInput(format!("malformed message: {}", e));
                log::warn!("Render rejected: {}", err);
                post(OutputMessage::Error {
                    error: err.to_string(),
                });
            }
        }
    }

    fn process(
        &self,
        message: &InputMessage,
        post: &mut dyn FnMut(OutputMessage),
    ) -> Result<RenderResult, RenderError> {
        let columns = parse_columns(message.cols)?;
        let invert = message.invert.unwrap_or(self.default_invert);

        match (message.width, message.height) {
            (Some(width), Some(height)) => {
                let buffer = PixelBuffer::new(&message.data, width, height)?;
                self.render_buffer(buffer, columns, invert, post)
            }
            (None, None) => self.render_encoded(&message.data, columns, invert, post),
            _ => Err(RenderError::InvalidInput(
                "width and height must be given together".to_string(),
            )),
        }
    }

    #[cfg(feature = "decode")]
    fn render_encoded(
        &self,
        data: &[u8],
        columns: u32,
        invert: bool,
        post: &mut dyn FnMut(OutputMessage),
    ) -> Result<RenderResult, RenderError> {
        let image = crate::ascii::decode_image(data)?;
        self.render_buffer(image.as_buffer()?, columns, invert, post)
    }

    #[cfg(not(feature = "decode"))]
    fn render_encoded(
        &self,
        _data: &[u8],
        _columns: u32,
        _invert: bool,
        _post: &mut dyn FnMut(OutputMessage),
    ) -> Result<RenderResult, RenderError> {
        Err(RenderError::InvalidInput(
            "width and height are required for raw RGBA data".to_string(),
        ))
    }

    fn render_buffer(
        &self,
        buffer: PixelBuffer<'_>,
        columns: u32,
        invert: bool,
        post: &mut dyn FnMut(OutputMessage),
    ) -> Result<RenderResult, RenderError> {
        let request = RenderRequest::new(buffer, columns, invert)?.with_options(self.options)?;
        Ok(self.renderer.render(&request, |row| {
            post(OutputMessage::Stream {
                data: row.to_string(),
            })
        }))
    }
}

impl Default for Relay {
    fn default() -> Self {
        Self::new(RenderOptions::default())
    }
}

fn parse_columns(cols: i64) -> Result<u32, RenderError> {
    if cols < 1 {
        return Err(RenderError::InvalidInput(
            "cols must be greater than 0".to_string(),
        ));
    }
    u32::try_from(cols)
        .map_err(|_| RenderError::InvalidInput(format!("cols {} is out of range", cols)))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "render panicked".to_string()
    }
}
