//! Error types shared by the scanning pipeline

/// Errors produced while preparing or scanning an image.
///
/// A search that exhausts every angle without a decode is not an error;
/// it is reported as `Ok(None)`.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// The pixel buffer is empty, mis-sized or uses an unsupported layout
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The encoded bytes could not be decoded as an image
    #[error("invalid input: {0}")]
    Image(#[from] image::ImageError),
    /// Rotation or scan settings are out of range
    #[error("invalid configuration: {0}")]
    Config(String),
    /// Reading an image or config file failed
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// A config file is not valid JSON
    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ScanError {
    /// True for errors caused by the caller's image data.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, ScanError::InvalidInput(_) | ScanError::Image(_))
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, ScanError>;
