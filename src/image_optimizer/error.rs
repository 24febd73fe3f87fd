//! Image transform error types
//!
//! Provides structured error handling with HTTP status mapping.

use std::fmt;

use crate::constants::{MAX_DIMENSION, MAX_PIXELS};

/// Errors that can occur inside a transform pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    // === Decoding Errors ===
    /// Requested or detected format is not supported
    UnsupportedFormat { format: String },
    /// Failed to decode image data
    DecodeFailed { message: String },
    /// Source, target or intermediate geometry exceeds the processing limits
    DimensionsTooLarge {
        width: u32,
        height: u32,
        max_dimension: u32,
        max_pixels: u64,
    },

    // === Processing Errors ===
    /// Resize operation failed
    ResizeFailed { message: String },
    /// Encoding to output format failed
    EncodeFailed { format: String, message: String },
    /// The blocking transform task panicked or was cancelled
    TaskFailed { message: String },
}

impl fmt::Display for ImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageError::UnsupportedFormat { format } => {
                write!(f, "Unsupported image format: {}", format)
            }
            ImageError::DecodeFailed { message } => {
                write!(f, "Failed to decode image: {}", message)
            }
            ImageError::DimensionsTooLarge {
                width,
                height,
                max_dimension,
                max_pixels,
            } => {
                write!(
                    f,
                    "Image dimensions {}x{} exceed limits ({}px per side, {} pixels)",
                    width, height, max_dimension, max_pixels
                )
            }
            ImageError::ResizeFailed { message } => {
                write!(f, "Resize failed: {}", message)
            }
            ImageError::EncodeFailed { format, message } => {
                write!(f, "Failed to encode to {}: {}", format, message)
            }
            ImageError::TaskFailed { message } => {
                write!(f, "Transform task failed: {}", message)
            }
        }
    }
}

impl std::error::Error for ImageError {}

impl ImageError {
    /// Maps image errors to HTTP status codes
    ///
    /// - UnsupportedFormat → 415 (Unsupported Media Type)
    /// - DecodeFailed, DimensionsTooLarge → 400 (Bad Request)
    /// - ResizeFailed, EncodeFailed, TaskFailed → 500 (Internal Server Error)
    pub fn to_http_status(&self) -> u16 {
        match self {
            ImageError::UnsupportedFormat { .. } => 415,
            ImageError::DecodeFailed { .. } | ImageError::DimensionsTooLarge { .. } => 400,
            ImageError::ResizeFailed { .. }
            | ImageError::EncodeFailed { .. }
            | ImageError::TaskFailed { .. } => 500,
        }
    }

    pub fn unsupported_format(format: impl Into<String>) -> Self {
        ImageError::UnsupportedFormat {
            format: format.into(),
        }
    }

    pub fn decode_failed(message: impl Into<String>) -> Self {
        ImageError::DecodeFailed {
            message: message.into(),
        }
    }

    pub fn dimensions_too_large(width: u32, height: u32) -> Self {
        ImageError::DimensionsTooLarge {
            width,
            height,
            max_dimension: MAX_DIMENSION,
            max_pixels: MAX_PIXELS,
        }
    }

    pub fn resize_failed(message: impl Into<String>) -> Self {
        ImageError::ResizeFailed {
            message: message.into(),
        }
    }

    pub fn encode_failed(format: impl Into<String>, message: impl Into<String>) -> Self {
        ImageError::EncodeFailed {
            format: format.into(),
            message: message.into(),
        }
    }
}
