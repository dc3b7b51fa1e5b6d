//! Engine configuration.

use crate::buffer_cache;
use crate::locator::DEFAULT_SEARCH_RADIUS;
use serde::{Deserialize, Serialize};

/// Settings for one query engine instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Largest ring radius, in pixels, searched around a query point
    #[serde(default = "default_search_radius")]
    pub search_radius: u32,

    /// Decoded rasters kept in memory
    #[serde(default = "default_buffer_cache_capacity")]
    pub buffer_cache_capacity: usize,

    /// Failed sources remembered; once full, further failures are not recorded
    #[serde(default = "default_bad_source_capacity")]
    pub bad_source_capacity: usize,

    /// Tile edge lengths that do not trigger a size warning
    #[serde(default = "default_expected_tile_sizes")]
    pub expected_tile_sizes: Vec<u32>,
}

pub fn default_search_radius() -> u32 {
    DEFAULT_SEARCH_RADIUS
}

fn default_buffer_cache_capacity() -> usize {
    buffer_cache::DEFAULT_CAPACITY
}

fn default_bad_source_capacity() -> usize {
    1024
}

fn default_expected_tile_sizes() -> Vec<u32> {
    vec![256, 512]
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            search_radius: default_search_radius(),
            buffer_cache_capacity: default_buffer_cache_capacity(),
            bad_source_capacity: default_bad_source_capacity(),
            expected_tile_sizes: default_expected_tile_sizes(),
        }
    }
}

impl EngineConfig {
    pub fn with_search_radius(mut self, search_radius: u32) -> Self {
        self.search_radius = search_radius;
        self
    }

    /// True for square tiles of one of the expected sizes.
    pub fn is_expected_size(&self, width: u32, height: u32) -> bool {
        width == height && self.expected_tile_sizes.contains(&width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_json() {
        let config: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.search_radius, 15);
        assert_eq!(config.buffer_cache_capacity, 2);
        assert_eq!(config.bad_source_capacity, 1024);
    }

    #[test]
    fn test_expected_size() {
        let config = EngineConfig::default();
        assert!(config.is_expected_size(256, 256));
        assert!(config.is_expected_size(512, 512));
        assert!(!config.is_expected_size(256, 512));
        assert!(!config.is_expected_size(128, 128));
    }
}
