use thiserror::Error;

/// Errors surfaced by the drawing engine.
///
/// None of these are fatal: the engine leaves its buffers in a consistent
/// state and the host decides whether to show anything to the user.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid canvas dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("Invalid data URL: {0}")]
    InvalidDataUrl(String),

    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Invalid font data: {0}")]
    Font(String),

    #[error("Background load was dropped before completing")]
    LoadCanceled,

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Failed to parse config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
