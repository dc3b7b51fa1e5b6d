//! Common map types shared by the tile decoder and its hosts.

pub mod error;
pub mod layer;
pub mod tile;

pub use error::{MapError, MapResult};
pub use layer::{TileLayer, UrlTemplate};
pub use tile::{PixelCoord, TileCoord, TileRequest, BASE_TILE_SIZE};
