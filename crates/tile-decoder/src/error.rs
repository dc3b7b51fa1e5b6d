//! Error types for tile value queries.
//!
//! The worker protocol reports every failure the same way (`fail: true`);
//! these types exist so the engine can log and count what actually went wrong.

use thiserror::Error;

/// Network collaborator failures.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FetchError {
    #[error("HTTP {status} fetching {url}")]
    Status { url: String, status: u16 },

    #[error("Transport error fetching {url}: {message}")]
    Transport { url: String, message: String },

    #[error("No tile available for {0}")]
    NotFound(String),
}

/// Raster construction failures.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RasterError {
    #[error("Raster has zero size ({width}x{height})")]
    Empty { width: u32, height: u32 },

    #[error("Row stride {stride} is shorter than {width} RGBA pixels")]
    StrideTooShort { stride: usize, width: u32 },

    #[error("Buffer holds {actual} bytes, {expected} needed")]
    BufferTooShort { expected: usize, actual: usize },
}

/// Image decode collaborator failures.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Image decode failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("Decoded image is not a valid raster: {0}")]
    Raster(#[from] RasterError),
}

/// Why a query produced no reading.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Source previously failed to fetch: {0}")]
    KnownBadSource(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Raster(#[from] RasterError),

    #[error("No qualifying pixel within {radius}px of ({x}, {y})")]
    NoQualifyingPixel { x: u32, y: u32, radius: u32 },

    #[error("Color ({r}, {g}, {b}) lies outside the ramp")]
    OutOfRange { r: u8, g: u8, b: u8 },

    #[error("Engine not initialized")]
    NotInitialized,
}

pub type QueryResult<T> = Result<T, QueryError>;
