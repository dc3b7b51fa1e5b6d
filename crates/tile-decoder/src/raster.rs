//! Decoded RGBA8888 tile rasters.

use crate::error::RasterError;
use map_common::TileCoord;

/// Bytes per RGBA8888 pixel.
pub const BYTES_PER_PIXEL: usize = 4;

/// An immutable RGBA8888 raster for one tile.
///
/// Rows are `stride` bytes apart; `stride` may exceed `4 * width` when the
/// producer pads rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    width: u32,
    height: u32,
    stride: usize,
    data: Vec<u8>,
    tile: TileCoord,
}

impl Raster {
    pub fn new(
        width: u32,
        height: u32,
        stride: usize,
        data: Vec<u8>,
        tile: TileCoord,
    ) -> Result<Self, RasterError> {
        if width == 0 || height == 0 {
            return Err(RasterError::Empty { width, height });
        }
        let row_bytes = width as usize * BYTES_PER_PIXEL;
        if stride < row_bytes {
            return Err(RasterError::StrideTooShort { stride, width });
        }
        // The last row only needs its pixels, not its padding.
        let expected = stride * (height as usize - 1) + row_bytes;
        if data.len() < expected {
            return Err(RasterError::BufferTooShort {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            stride,
            data,
            tile,
        })
    }

    /// Tightly packed rows (`stride == 4 * width`).
    pub fn from_rgba(
        width: u32,
        height: u32,
        data: Vec<u8>,
        tile: TileCoord,
    ) -> Result<Self, RasterError> {
        Self::new(width, height, width as usize * BYTES_PER_PIXEL, data, tile)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn tile(&self) -> TileCoord {
        self.tile
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Byte offset of pixel (x, y). Callers keep x < width and y < height.
    #[inline(always)]
    pub fn index_of(&self, x: u32, y: u32) -> usize {
        y as usize * self.stride + x as usize * BYTES_PER_PIXEL
    }

    /// RGBA at a byte offset returned by [`Raster::index_of`].
    #[inline(always)]
    pub fn rgba_at(&self, idx: usize) -> [u8; 4] {
        [
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ]
    }

    /// Wrap arbitrary (possibly global) pixel coordinates into this tile.
    pub fn wrap(&self, px: u64, py: u64) -> (u32, u32) {
        (
            (px % self.width as u64) as u32,
            (py % self.height as u64) as u32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_short_stride() {
        let err = Raster::new(4, 4, 12, vec![0; 64], TileCoord::default()).unwrap_err();
        assert_eq!(err, RasterError::StrideTooShort { stride: 12, width: 4 });
    }

    #[test]
    fn test_padded_last_row_may_be_truncated() {
        // 2x2 pixels, 12-byte stride: 12 + 8 bytes is enough.
        let raster = Raster::new(2, 2, 12, vec![0; 20], TileCoord::default()).unwrap();
        assert_eq!(raster.index_of(1, 1), 16);
    }

    #[test]
    fn test_rejects_short_buffer() {
        let err = Raster::from_rgba(4, 4, vec![0; 60], TileCoord::default()).unwrap_err();
        assert_eq!(
            err,
            RasterError::BufferTooShort {
                expected: 64,
                actual: 60
            }
        );
    }

    #[test]
    fn test_wrap_global_coordinates() {
        let raster = Raster::from_rgba(256, 256, vec![0; 256 * 256 * 4], TileCoord::default()).unwrap();
        assert_eq!(raster.wrap(232847, 103227), (143, 59));
    }
}
