//! Query engine: from (tile URL, pixel) to a decoded measurement value.
//!
//! A query is served from the raster cache when possible and otherwise
//! needs exactly one fetch. The engine never awaits on its own state: the
//! fetch is the only suspension point, which lets a worker keep many
//! fetches in flight while a single task owns the engine (see
//! [`QueryEngine::begin`] and [`QueryEngine::complete_fetch`]).

use std::sync::Arc;

use bytes::Bytes;
use map_common::TileCoord;
use serde_json::Value;
use tracing::{debug, warn};

use crate::buffer_cache::BufferCache;
use crate::config::EngineConfig;
use crate::decode::decode_image;
use crate::error::{FetchError, QueryError, QueryResult};
use crate::fetch::TileFetcher;
use crate::locator::locate;
use crate::policy::{DecodePolicy, PolicyOverride};
use crate::ramp::{ColorRamp, RampKind, RampValue};
use crate::raster::Raster;

/// One value request against one tile.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// Tile URL; also the cache key
    pub source_id: String,
    pub tile: TileCoord,
    /// Pixel to read, tile-local or global (wrapped into the tile)
    pub px: u64,
    pub py: u64,
    /// Caller's correlation token, echoed in the reply
    pub batch_id: u64,
    /// Opaque caller data
    pub user_data: Value,
    pub policy: PolicyOverride,
}

impl Query {
    pub fn new(source_id: impl Into<String>, tile: TileCoord, px: u64, py: u64, batch_id: u64) -> Self {
        Self {
            source_id: source_id.into(),
            tile,
            px,
            py,
            batch_id,
            user_data: Value::Null,
            policy: PolicyOverride::default(),
        }
    }

    pub fn with_policy(mut self, policy: PolicyOverride) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_user_data(mut self, user_data: Value) -> Self {
        self.user_data = user_data;
        self
    }

    pub fn decode_policy(&self) -> DecodePolicy {
        DecodePolicy::resolve(&self.source_id, self.policy)
    }
}

/// Outcome of one query.
#[derive(Debug)]
pub struct QueryReply {
    pub batch_id: u64,
    pub user_data: Value,
    pub result: QueryResult<RampValue>,
}

impl QueryReply {
    /// A failed reply for `query` that never reached an engine.
    pub fn failure(query: Query, error: QueryError) -> Self {
        Self {
            batch_id: query.batch_id,
            user_data: query.user_data,
            result: Err(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// What [`QueryEngine::begin`] decided.
#[derive(Debug)]
pub enum Dispatch {
    /// Answered without any I/O.
    Ready(QueryReply),
    /// Fetch `query.source_id`, then hand the bytes to [`QueryEngine::complete_fetch`].
    Fetch(Query),
}

/// Per-engine counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub fetches: u64,
    pub fetch_failures: u64,
    /// Queries refused because their source failed before
    pub known_bad_rejections: u64,
    pub decode_failures: u64,
    pub no_pixel_failures: u64,
    pub lookup_failures: u64,
    pub successes: u64,
}

/// Sources whose fetch failed. Capped; once full, further failures are not recorded.
#[derive(Debug)]
pub struct BadSourceList {
    sources: Vec<String>,
    capacity: usize,
}

impl BadSourceList {
    pub fn new(capacity: usize) -> Self {
        Self {
            sources: Vec::new(),
            capacity,
        }
    }

    pub fn contains(&self, source_id: &str) -> bool {
        self.sources.iter().any(|s| s == source_id)
    }

    /// Remember `source_id`. Returns false if it is not in the list and
    /// the list is full.
    pub fn record(&mut self, source_id: &str) -> bool {
        if self.contains(source_id) {
            return true;
        }
        if self.sources.len() >= self.capacity {
            return false;
        }
        self.sources.push(source_id.to_string());
        true
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

/// Decodes values from heatmap tiles, caching rasters between queries.
///
/// Not thread-safe by design: own it from a single task. Several engines
/// can run side by side without sharing anything.
pub struct QueryEngine {
    config: EngineConfig,
    fetcher: Arc<dyn TileFetcher>,
    cache: BufferCache,
    bad_sources: BadSourceList,
    dense: ColorRamp,
    coarse: ColorRamp,
    stats: EngineStats,
}

impl QueryEngine {
    pub fn new(config: EngineConfig, fetcher: Arc<dyn TileFetcher>) -> Self {
        Self {
            cache: BufferCache::new(config.buffer_cache_capacity),
            bad_sources: BadSourceList::new(config.bad_source_capacity),
            dense: ColorRamp::new(RampKind::Dense),
            coarse: ColorRamp::new(RampKind::Coarse),
            stats: EngineStats::default(),
            config,
            fetcher,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn fetcher(&self) -> Arc<dyn TileFetcher> {
        Arc::clone(&self.fetcher)
    }

    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    pub fn cache(&self) -> &BufferCache {
        &self.cache
    }

    pub fn bad_sources(&self) -> &BadSourceList {
        &self.bad_sources
    }

    pub fn ramp(&self, kind: RampKind) -> &ColorRamp {
        match kind {
            RampKind::Dense => &self.dense,
            RampKind::Coarse => &self.coarse,
        }
    }

    /// Run a query to completion, fetching through the engine's fetcher if needed.
    pub async fn query(&mut self, query: Query) -> QueryReply {
        match self.begin(query) {
            Dispatch::Ready(reply) => reply,
            Dispatch::Fetch(query) => {
                let fetcher = self.fetcher();
                let fetched = fetcher.fetch(&query.source_id).await;
                self.complete_fetch(query, fetched)
            }
        }
    }

    /// Answer from the raster cache, refuse known-bad sources, or ask for a fetch.
    pub fn begin(&mut self, query: Query) -> Dispatch {
        let policy = query.decode_policy();
        let radius = self.config.search_radius;

        let cached = self
            .cache
            .get(&query.source_id)
            .map(|raster| find_pixel(raster, &query, policy, radius));

        if let Some(pixel) = cached {
            self.stats.cache_hits += 1;
            let result = pixel.and_then(|rgb| self.resolve_color(rgb, policy.ramp));
            return Dispatch::Ready(self.finish(query, result));
        }
        self.stats.cache_misses += 1;

        if self.bad_sources.contains(&query.source_id) {
            self.stats.known_bad_rejections += 1;
            let err = QueryError::KnownBadSource(query.source_id.clone());
            return Dispatch::Ready(self.finish(query, Err(err)));
        }

        self.stats.fetches += 1;
        Dispatch::Fetch(query)
    }

    /// Finish a query that [`QueryEngine::begin`] sent to the network.
    pub fn complete_fetch(&mut self, query: Query, fetched: Result<Bytes, FetchError>) -> QueryReply {
        let bytes = match fetched {
            Ok(bytes) => bytes,
            Err(e) => {
                self.stats.fetch_failures += 1;
                let recorded = self.bad_sources.record(&query.source_id);
                warn!(
                    source = %query.source_id,
                    error = %e,
                    recorded = recorded,
                    "Tile fetch failed"
                );
                return self.finish(query, Err(e.into()));
            }
        };

        let raster = match decode_image(&bytes, query.tile) {
            Ok(raster) => raster,
            Err(e) => {
                self.stats.decode_failures += 1;
                warn!(source = %query.source_id, error = %e, "Tile decode failed");
                return self.finish(query, Err(e.into()));
            }
        };

        if !self.config.is_expected_size(raster.width(), raster.height()) {
            warn!(
                source = %query.source_id,
                width = raster.width(),
                height = raster.height(),
                expected = ?self.config.expected_tile_sizes,
                "Unexpected tile dimensions"
            );
        }

        let policy = query.decode_policy();
        let pixel = find_pixel(&raster, &query, policy, self.config.search_radius);
        if pixel.is_ok() {
            self.cache.insert_distinct(&query.source_id, raster);
        }

        let result = pixel.and_then(|rgb| self.resolve_color(rgb, policy.ramp));
        self.finish(query, result)
    }

    /// Query a raster the caller already decoded. The raster is cached
    /// unless one is already held for the same source.
    pub fn process(&mut self, query: Query, raster: Raster) -> QueryReply {
        let policy = query.decode_policy();
        let radius = self.config.search_radius;

        let pixel = match self.cache.get(&query.source_id) {
            Some(cached) => find_pixel(cached, &query, policy, radius),
            None => {
                let pixel = find_pixel(&raster, &query, policy, radius);
                self.cache.insert_distinct(&query.source_id, raster);
                pixel
            }
        };

        let result = pixel.and_then(|rgb| self.resolve_color(rgb, policy.ramp));
        self.finish(query, result)
    }

    /// Start over with a new search radius: cached rasters and failed
    /// sources are dropped, ramp memos and stats are kept.
    pub fn reinitialize(&mut self, search_radius: u32) {
        self.config.search_radius = search_radius;
        self.cache.clear();
        self.bad_sources = BadSourceList::new(self.config.bad_source_capacity);
    }

    fn resolve_color(&mut self, [r, g, b]: [u8; 3], kind: RampKind) -> QueryResult<RampValue> {
        let ramp = match kind {
            RampKind::Dense => &mut self.dense,
            RampKind::Coarse => &mut self.coarse,
        };

        let value = ramp.resolve(r, g, b);
        if value.is_failure() {
            self.stats.lookup_failures += 1;
            debug!(r, g, b, ramp = ?kind, "Color lookup failed");
            return Err(QueryError::OutOfRange { r, g, b });
        }
        Ok(value)
    }

    fn finish(&mut self, query: Query, result: QueryResult<RampValue>) -> QueryReply {
        match &result {
            Ok(_) => self.stats.successes += 1,
            Err(QueryError::NoQualifyingPixel { .. }) => self.stats.no_pixel_failures += 1,
            Err(_) => {}
        }
        QueryReply {
            batch_id: query.batch_id,
            user_data: query.user_data,
            result,
        }
    }
}

/// Locate the nearest qualifying pixel and read its color.
fn find_pixel(
    raster: &Raster,
    query: &Query,
    policy: DecodePolicy,
    radius: u32,
) -> QueryResult<[u8; 3]> {
    let (x, y) = raster.wrap(query.px, query.py);
    match locate(raster, x, y, radius, policy.alpha_threshold) {
        Some(idx) => {
            let [r, g, b, _] = raster.rgba_at(idx);
            Ok([r, g, b])
        }
        None => Err(QueryError::NoQualifyingPixel { x, y, radius }),
    }
}
