//! Error types for map coordinate and layer handling.

use thiserror::Error;

/// Result type alias using MapError.
pub type MapResult<T> = Result<T, MapError>;

#[derive(Debug, Error, PartialEq)]
pub enum MapError {
    #[error("URL template is missing the {0} placeholder")]
    MissingPlaceholder(&'static str),

    #[error("Invalid tile size {0}: must be a non-zero power of two")]
    InvalidTileSize(u32),

    #[error("Invalid zoom level {0}")]
    InvalidZoom(u32),

    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),
}
