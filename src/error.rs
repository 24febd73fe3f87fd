// Error types module

use thiserror::Error;

use crate::image_optimizer::ImageError;
use crate::router::RouteError;
use crate::store::StoreError;

/// Centralized error type for materialization and bulk generation
///
/// Each variant names the stage that failed, so callers can map it to an
/// HTTP status and logs can carry the offending key.
#[derive(Debug, Error)]
pub enum ResizerError {
    /// The request key matched no grammar
    #[error(transparent)]
    Route(#[from] RouteError),

    /// The original could not be read from the store
    #[error("Failed to fetch origin {origin_key}: {source}")]
    OriginFetch {
        origin_key: String,
        #[source]
        source: StoreError,
    },

    /// Decode, resize or encode failed
    #[error(transparent)]
    Transform(#[from] ImageError),

    /// The variant could not be written back
    #[error("Failed to store variant {key}: {source}")]
    StoreWrite {
        key: String,
        #[source]
        source: StoreError,
    },

    /// An upload event could not be parsed
    #[error("Invalid upload event: {0}")]
    InvalidEvent(String),
}

impl ResizerError {
    /// Maps errors to HTTP status codes
    ///
    /// - Route, missing origin → 404
    /// - InvalidEvent → 400
    /// - Transform → per [`ImageError::to_http_status`]
    /// - Origin backend failure, StoreWrite → 500
    pub fn to_http_status(&self) -> u16 {
        match self {
            ResizerError::Route(_) => 404,
            ResizerError::OriginFetch { source, .. } if source.is_not_found() => 404,
            ResizerError::OriginFetch { .. } => 500,
            ResizerError::Transform(err) => err.to_http_status(),
            ResizerError::StoreWrite { .. } => 500,
            ResizerError::InvalidEvent(_) => 400,
        }
    }
}
