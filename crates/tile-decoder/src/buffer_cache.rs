//! Small ring cache of decoded tile rasters.
//!
//! Probes usually hit the same one or two tiles over and over while the map
//! is panned a few pixels at a time, so a couple of decoded rasters is enough
//! to skip the fetch and decode for nearly every repeat query.
//!
//! ## Eviction
//!
//! Slots are written in insertion order. Once the cache is full the write
//! cursor wraps and the oldest slot is overwritten; the raster it held is
//! dropped. Lookup is a linear scan by source identifier.

use crate::raster::Raster;
use tracing::debug;

/// Default number of rasters kept.
pub const DEFAULT_CAPACITY: usize = 2;

/// A decoded raster and the source it came from.
#[derive(Debug)]
pub struct CachedTile {
    pub source_id: String,
    pub raster: Raster,
}

/// Hit/miss counters for the buffer cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BufferCacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Rasters dropped when the cursor wrapped onto an occupied slot
    pub overwrites: u64,
    /// Inserts skipped because the source was already cached
    pub duplicate_inserts: u64,
}

impl BufferCacheStats {
    /// Cache hit rate as a percentage (0-100).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

/// Fixed-capacity, insertion-ordered raster cache keyed by source identifier.
#[derive(Debug)]
pub struct BufferCache {
    slots: Vec<Option<CachedTile>>,
    cursor: usize,
    len: usize,
    stats: BufferCacheStats,
}

impl Default for BufferCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl BufferCache {
    /// Create a cache holding at most `capacity` rasters (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: (0..capacity).map(|_| None).collect(),
            cursor: 0,
            len: 0,
            stats: BufferCacheStats::default(),
        }
    }

    /// Look up the raster for `source_id`.
    pub fn get(&mut self, source_id: &str) -> Option<&Raster> {
        let found = self.position(source_id);
        match found {
            Some(i) => {
                self.stats.hits += 1;
                self.slots[i].as_ref().map(|t| &t.raster)
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// True if a raster for `source_id` is cached. Does not touch the stats.
    pub fn contains(&self, source_id: &str) -> bool {
        self.position(source_id).is_some()
    }

    /// Store `raster` unless `source_id` is already cached.
    ///
    /// Returns true if the raster was stored.
    pub fn insert_distinct(&mut self, source_id: &str, raster: Raster) -> bool {
        if self.contains(source_id) {
            self.stats.duplicate_inserts += 1;
            return false;
        }

        let evicted = self.slots[self.cursor].replace(CachedTile {
            source_id: source_id.to_string(),
            raster,
        });
        if let Some(old) = evicted {
            self.stats.overwrites += 1;
            debug!(evicted = %old.source_id, stored = %source_id, "Raster cache slot overwritten");
        }

        self.cursor = (self.cursor + 1) % self.slots.len();
        if self.len < self.slots.len() {
            self.len += 1;
        }
        true
    }

    /// Drop every cached raster. Stats are kept.
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
        self.cursor = 0;
        self.len = 0;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn stats(&self) -> BufferCacheStats {
        self.stats
    }

    fn position(&self, source_id: &str) -> Option<usize> {
        self.slots[..self.len]
            .iter()
            .position(|s| matches!(s, Some(t) if t.source_id == source_id))
    }
}
