//! Encoded image bytes to RGBA8888 rasters.

use crate::error::DecodeError;
use crate::raster::Raster;
use map_common::TileCoord;

/// Decode PNG (or any format the `image` crate recognises) into a raster.
pub fn decode_image(bytes: &[u8], tile: TileCoord) -> Result<Raster, DecodeError> {
    let rgba = image::load_from_memory(bytes)?.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(Raster::from_rgba(width, height, rgba.into_raw(), tile)?)
}
