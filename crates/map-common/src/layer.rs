//! Tile layer definitions: where a layer's tiles live and how big they are.

use crate::tile::{validate_tile_size, TileCoord, TileRequest, BASE_TILE_SIZE, MAX_ZOOM};
use crate::{MapError, MapResult};
use serde::{Deserialize, Serialize};

/// A tile URL template such as `https://example.org/tiles/{z}/{x}/{y}.png`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UrlTemplate(String);

impl UrlTemplate {
    pub fn parse(template: impl Into<String>) -> MapResult<Self> {
        let template = template.into();
        for placeholder in ["{x}", "{y}", "{z}"] {
            if !template.contains(placeholder) {
                return Err(MapError::MissingPlaceholder(placeholder));
            }
        }
        Ok(Self(template))
    }

    /// Substitute every placeholder occurrence with the tile's coordinates.
    pub fn expand(&self, tile: TileCoord) -> String {
        self.0
            .replace("{x}", &tile.x.to_string())
            .replace("{y}", &tile.y.to_string())
            .replace("{z}", &tile.z.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UrlTemplate {
    type Error = MapError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<UrlTemplate> for String {
    fn from(value: UrlTemplate) -> Self {
        value.0
    }
}

impl std::fmt::Display for UrlTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn default_tile_size() -> u32 {
    BASE_TILE_SIZE
}

fn default_max_zoom() -> u32 {
    23
}

/// A raster tile layer that can be probed for values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileLayer {
    /// Layer identifier used in logs and probe output
    pub id: String,

    /// Where to fetch tiles from
    pub url_template: UrlTemplate,

    /// Tile edge length in pixels (256 or 512)
    #[serde(default = "default_tile_size")]
    pub tile_size: u32,

    /// Deepest zoom level the layer has tiles for
    #[serde(default = "default_max_zoom")]
    pub max_zoom: u32,
}

impl TileLayer {
    pub fn new(id: impl Into<String>, url_template: UrlTemplate, tile_size: u32) -> MapResult<Self> {
        validate_tile_size(tile_size)?;
        Ok(Self {
            id: id.into(),
            url_template,
            tile_size,
            max_zoom: default_max_zoom(),
        })
    }

    pub fn with_max_zoom(mut self, max_zoom: u32) -> Self {
        self.max_zoom = max_zoom;
        self
    }

    /// Check fields that deserialization cannot.
    pub fn validate(&self) -> MapResult<()> {
        validate_tile_size(self.tile_size)?;
        if self.max_zoom > MAX_ZOOM {
            return Err(MapError::InvalidZoom(self.max_zoom));
        }
        Ok(())
    }

    /// Translate a base-pyramid request into this layer's pyramid.
    ///
    /// Returns `None` when the layer has no tiles at the translated zoom.
    pub fn locate(&self, request: &TileRequest) -> Option<TileRequest> {
        let translated = request.for_tile_size(self.tile_size);
        if translated.tile.z > self.max_zoom {
            return None;
        }
        Some(translated)
    }

    pub fn url_for(&self, tile: TileCoord) -> String {
        self.url_template.expand(tile)
    }
}
