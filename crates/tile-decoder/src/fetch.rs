//! Tile byte sources.
//!
//! The engine only ever needs "GET these bytes"; timeouts, TLS and
//! connection reuse belong to the fetcher.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::FetchError;

/// Fetches the raw encoded bytes of a tile.
#[async_trait]
pub trait TileFetcher: Send + Sync {
    async fn fetch(&self, source_id: &str) -> Result<Bytes, FetchError>;
}

/// Configuration for the HTTP fetcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpFetcherConfig {
    /// Whole-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Connection establishment timeout in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    concat!("tile-decoder/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for HttpFetcherConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

/// Plain HTTP GET fetcher. Any non-2xx status is a failure.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &HttpFetcherConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(config.user_agent.clone())
            .pool_max_idle_per_host(4)
            .tcp_nodelay(true)
            .build()
            .map_err(|e| FetchError::Transport {
                url: String::new(),
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl TileFetcher for HttpFetcher {
    #[instrument(skip(self))]
    async fn fetch(&self, source_id: &str) -> Result<Bytes, FetchError> {
        let transport = |e: reqwest::Error| FetchError::Transport {
            url: source_id.to_string(),
            message: e.to_string(),
        };

        let response = self.client.get(source_id).send().await.map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: source_id.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(transport)?;
        debug!(bytes = body.len(), "Tile fetched");
        Ok(body)
    }
}

/// Serves tiles from memory. Unknown sources fail with [`FetchError::NotFound`].
#[derive(Default)]
pub struct MemoryFetcher {
    tiles: Mutex<HashMap<String, Result<Bytes, FetchError>>>,
    calls: AtomicUsize,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `bytes` for `source_id`.
    pub fn insert(&self, source_id: impl Into<String>, bytes: impl Into<Bytes>) {
        self.lock().insert(source_id.into(), Ok(bytes.into()));
    }

    /// Fail every fetch of `source_id` with `error`.
    pub fn insert_error(&self, source_id: impl Into<String>, error: FetchError) {
        self.lock().insert(source_id.into(), Err(error));
    }

    /// Number of fetches attempted so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Result<Bytes, FetchError>>> {
        // A poisoned map still holds valid entries.
        self.tiles.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl TileFetcher for MemoryFetcher {
    async fn fetch(&self, source_id: &str) -> Result<Bytes, FetchError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.lock()
            .get(source_id)
            .cloned()
            .unwrap_or_else(|| Err(FetchError::NotFound(source_id.to_string())))
    }
}
