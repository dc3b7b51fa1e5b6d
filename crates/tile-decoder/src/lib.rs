//! Recovers measurement values from color-ramp heatmap tiles.
//!
//! Given a rendered tile and a pixel inside it, the engine finds the nearest
//! opaque data pixel, maps its color back through the ramp that drew it and
//! reports the value range that color stands for.
//!
//! - [`ramp`]: color ramp tables and color-to-value lookup
//! - [`buffer_cache`]: small ring cache of decoded rasters
//! - [`locator`]: nearest qualifying pixel search
//! - [`engine`]: the query pipeline
//! - [`worker`]: channel-based front end for hosts

pub mod buffer_cache;
pub mod config;
pub mod decode;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod locator;
pub mod policy;
pub mod ramp;
pub mod raster;
pub mod worker;

pub use buffer_cache::{BufferCache, BufferCacheStats};
pub use config::EngineConfig;
pub use decode::decode_image;
pub use engine::{Dispatch, EngineStats, Query, QueryEngine, QueryReply};
pub use error::{DecodeError, FetchError, QueryError, QueryResult, RasterError};
pub use fetch::{HttpFetcher, HttpFetcherConfig, MemoryFetcher, TileFetcher};
pub use locator::locate;
pub use policy::{DecodePolicy, PolicyOverride};
pub use ramp::{ColorRamp, RampKind, RampStats, RampValue};
pub use raster::Raster;
pub use worker::{
    spawn, InitRequest, ProcessRequest, QueryRequest, QueryResponse, Worker, WorkerHandle,
    WorkerRequest, WorkerResponse,
};
