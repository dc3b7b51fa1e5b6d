//! Tile and pixel coordinates in the Web Mercator (EPSG:3857) tile pyramid.

use crate::{MapError, MapResult};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Tile size, in pixels, of the base pyramid that probes are computed in.
pub const BASE_TILE_SIZE: u32 = 256;

/// Latitude limit of the square Web Mercator plane.
pub const MAX_MERCATOR_LAT: f64 = 85.05112878;

/// Deepest zoom level for which global pixel coordinates fit comfortably in u64.
pub const MAX_ZOOM: u32 = 30;

/// A tile coordinate (z/x/y).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TileCoord {
    /// Zoom level
    pub z: u32,
    /// Column (x)
    pub x: u32,
    /// Row (y)
    pub y: u32,
}

impl TileCoord {
    pub fn new(z: u32, x: u32, y: u32) -> Self {
        Self { z, x, y }
    }

    /// Get the parent tile (zoom - 1).
    pub fn parent(&self) -> Option<TileCoord> {
        if self.z == 0 {
            return None;
        }
        Some(TileCoord {
            z: self.z - 1,
            x: self.x / 2,
            y: self.y / 2,
        })
    }
}

impl std::fmt::Display for TileCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}

/// A global pixel coordinate at some zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PixelCoord {
    pub x: u64,
    pub y: u64,
}

impl PixelCoord {
    pub fn new(x: u64, y: u64) -> Self {
        Self { x, y }
    }

    /// Project a WGS84 location to a global pixel in a pyramid of `tile_size` tiles.
    ///
    /// Latitude is clamped to the Mercator plane and longitude wrapped into
    /// [-180, 180) first, so any finite input produces a pixel.
    pub fn from_lat_lon(lat: f64, lon: f64, tile_size: u32, zoom: u32) -> MapResult<Self> {
        if !lat.is_finite() || !lon.is_finite() {
            return Err(MapError::InvalidCoordinate(format!("{}, {}", lat, lon)));
        }
        validate_tile_size(tile_size)?;
        if zoom > MAX_ZOOM {
            return Err(MapError::InvalidZoom(zoom));
        }

        let lat = clamp_lat_to_mercator(lat);
        let lon = wrap_lon(lon);

        let x = (lon + 180.0) / 360.0;
        let s = lat.to_radians().sin();
        let y = 0.5 - ((1.0 + s) / (1.0 - s)).ln() / (4.0 * PI);

        let world = (tile_size as u64) << zoom;
        let to_pixel = |t: f64| -> u64 {
            let p = (t * world as f64 + 0.5).floor();
            if p <= 0.0 {
                0
            } else {
                (p as u64).min(world - 1)
            }
        };

        Ok(Self {
            x: to_pixel(x),
            y: to_pixel(y),
        })
    }

    /// The tile containing this pixel.
    pub fn tile(&self, tile_size: u32, zoom: u32) -> TileCoord {
        TileCoord {
            z: zoom,
            x: (self.x / tile_size as u64) as u32,
            y: (self.y / tile_size as u64) as u32,
        }
    }

    /// Offset of this pixel inside its tile.
    pub fn local(&self, tile_size: u32) -> (u32, u32) {
        (
            (self.x % tile_size as u64) as u32,
            (self.y % tile_size as u64) as u32,
        )
    }
}

/// Everything needed to address one pixel of one tile of a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRequest {
    pub tile: TileCoord,
    /// Global pixel coordinate at `tile.z` for tiles of `tile_size`.
    pub pixel: PixelCoord,
    pub tile_size: u32,
}

impl TileRequest {
    /// Address the pixel under a WGS84 location in a pyramid of `tile_size` tiles.
    pub fn from_lat_lon(lat: f64, lon: f64, tile_size: u32, zoom: u32) -> MapResult<Self> {
        let pixel = PixelCoord::from_lat_lon(lat, lon, tile_size, zoom)?;
        Ok(Self {
            tile: pixel.tile(tile_size, zoom),
            pixel,
            tile_size,
        })
    }

    /// Re-address this request for a layer whose tiles are `layer_tile_size` pixels.
    ///
    /// A 512px pyramid at zoom z-1 covers the world with the same number of
    /// pixels as a 256px pyramid at zoom z, so global pixels carry over and
    /// only the tile index halves. At zoom 0 there is no coarser level, so the
    /// pixel is scaled up into the larger tile instead.
    pub fn for_tile_size(&self, layer_tile_size: u32) -> TileRequest {
        if layer_tile_size <= self.tile_size {
            return *self;
        }

        let mut r = *self;
        match self.tile.parent() {
            Some(parent) => {
                r.tile = parent;
            }
            None => {
                let scale = (layer_tile_size / self.tile_size).max(1) as u64;
                r.pixel = PixelCoord::new(self.pixel.x * scale, self.pixel.y * scale);
            }
        }
        r.tile_size = layer_tile_size;
        r
    }
}

pub fn clamp_lat_to_mercator(lat: f64) -> f64 {
    lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT)
}

pub fn wrap_lon(lon: f64) -> f64 {
    if (-180.0..180.0).contains(&lon) {
        lon
    } else {
        (lon + 180.0).rem_euclid(360.0) - 180.0
    }
}

pub(crate) fn validate_tile_size(tile_size: u32) -> MapResult<()> {
    if tile_size == 0 || !tile_size.is_power_of_two() {
        return Err(MapError::InvalidTileSize(tile_size));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_maps_to_world_center() {
        let p = PixelCoord::from_lat_lon(0.0, 0.0, 256, 1).unwrap();
        assert_eq!(p, PixelCoord::new(256, 256));
        assert_eq!(p.tile(256, 1), TileCoord::new(1, 1, 1));
        assert_eq!(p.local(256), (0, 0));
    }

    #[test]
    fn test_wrap_lon() {
        assert_eq!(wrap_lon(10.0), 10.0);
        assert_eq!(wrap_lon(190.0), -170.0);
        assert_eq!(wrap_lon(-190.0), 170.0);
        assert_eq!(wrap_lon(180.0), -180.0);
    }

    #[test]
    fn test_parent() {
        assert_eq!(TileCoord::new(0, 0, 0).parent(), None);
        assert_eq!(
            TileCoord::new(5, 11, 7).parent(),
            Some(TileCoord::new(4, 5, 3))
        );
    }
}
