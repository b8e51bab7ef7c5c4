use std::{io, path::PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid kernel: {0}")]
    InvalidKernel(String),

    #[error("invalid crop region: {0}")]
    InvalidRegion(String),

    #[error("unsupported image format: {0}")]
    UnsupportedImageFormat(String),

    #[error("invalid frame dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("frame buffer size mismatch: got {got}, expected {expected}")]
    BufferSizeMismatch { got: usize, expected: usize },

    #[error("invalid landmark: {0}")]
    InvalidLandmark(String),

    #[error("no hand detected")]
    NoHandDetected,

    #[error("expected exactly one hand, got {0}")]
    MultipleHandsDetected(usize),

    #[error("invalid capture request: {0}")]
    InvalidCaptureRequest(String),

    #[error("decode failed: {0}")]
    Decode(String),

    #[error("resize failed: {0}")]
    Resize(String),

    #[error("failed to encode {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
