//! Unified error types for codec operations.

use std::path::PathBuf;

use crate::format::ImageFormat;

/// Unified error type for decode, encode, and display operations.
///
/// Failures of an individual hardware adapter never surface here: the
/// dispatchers log them and move on to the next candidate. What the caller
/// sees is either an input-contract violation or the terminal failure of the
/// whole fallback chain.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CodecError {
    /// Encoded input is empty.
    #[error("empty input")]
    EmptyInput,
    /// Format not recognized from magic bytes.
    #[error("unrecognized image format")]
    UnrecognizedFormat,
    /// Read mode flag is not one of unchanged/grayscale/color.
    #[error("unsupported read mode flag {0}")]
    InvalidMode(i32),
    /// Destination path has no extension to derive a format from.
    #[error("path has no file extension: {}", .0.display())]
    MissingExtension(PathBuf),
    /// Destination extension is not jpg/jpeg/png/bmp.
    #[error("unrecognized extension {0:?}")]
    UnrecognizedExtension(String),
    /// Pixel buffer or decoded image has a channel count other than 1, 3, or 4.
    #[error("unsupported channel count {0}")]
    UnsupportedChannels(usize),
    /// Format recognized but codec not compiled in.
    #[error("format {0:?} not supported (codec not compiled in)")]
    UnsupportedFormat(ImageFormat),
    /// Codec not enabled in the provided registry.
    #[error("format {0:?} is disabled in the codec registry")]
    DisabledFormat(ImageFormat),
    /// Input validation failed.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Resource limit exceeded.
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),
    /// A hardware adapter lifecycle step failed.
    #[error("{adapter}: {detail}")]
    Adapter {
        adapter: &'static str,
        detail: String,
    },
    /// Underlying software codec error.
    #[error("codec error ({format:?}): {source}")]
    Codec {
        format: ImageFormat,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// File read or write failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    /// Display surface could not be acquired or written.
    #[error("display unavailable: {0}")]
    Display(String),
}

// Conversion helpers for codec-specific errors
impl CodecError {
    /// Wrap a codec-specific error.
    pub fn from_codec<E>(format: ImageFormat, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        CodecError::Codec {
            format,
            source: Box::new(error),
        }
    }

    /// Build an adapter failure with a message.
    pub fn adapter(adapter: &'static str, detail: impl Into<String>) -> Self {
        CodecError::Adapter {
            adapter,
            detail: detail.into(),
        }
    }
}
