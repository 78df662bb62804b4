//! Error types for rendering.

/// Errors surfaced by the renderer and the relay boundary.
///
/// Neither kind is retried; the caller decides what to do with it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// The request is malformed (bad dimensions, zero columns, undecodable data)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Unexpected fault while computing a render
    #[error("Internal failure: {0}")]
    InternalFailure(String),
}

impl RenderError {
    /// Check if this error was caused by the request rather than the renderer.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, RenderError::InvalidInput(_))
    }
}
