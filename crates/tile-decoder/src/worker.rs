//! Message-passing front end for the query engine.
//!
//! A worker task owns one [`QueryEngine`] and talks to its host through two
//! unbounded channels. Requests are handled in arrival order; replies come
//! back in completion order, so callers match them up by `batchId`.

use std::sync::Arc;

use bytes::Bytes;
use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use map_common::TileCoord;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::{default_search_radius, EngineConfig};
use crate::engine::{Dispatch, Query, QueryEngine, QueryReply};
use crate::error::{FetchError, QueryError};
use crate::fetch::TileFetcher;
use crate::policy::PolicyOverride;
use crate::raster::Raster;

/// Host to worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "UPPERCASE")]
pub enum WorkerRequest {
    Init(InitRequest),
    Query(QueryRequest),
    Process(ProcessRequest),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitRequest {
    #[serde(default = "default_search_radius")]
    pub search_radius: u32,
}

impl Default for InitRequest {
    fn default() -> Self {
        Self {
            search_radius: default_search_radius(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub source_id: String,
    pub tile_x: u32,
    pub tile_y: u32,
    pub tile_z: u32,
    pub px: u64,
    pub py: u64,
    pub batch_id: u64,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub user_data: Value,
    #[serde(flatten)]
    pub policy: PolicyOverride,
}

impl QueryRequest {
    pub fn into_query(self) -> Query {
        Query {
            source_id: self.source_id,
            tile: TileCoord::new(self.tile_z, self.tile_x, self.tile_y),
            px: self.px,
            py: self.py,
            batch_id: self.batch_id,
            user_data: self.user_data,
            policy: self.policy,
        }
    }
}

impl From<Query> for QueryRequest {
    fn from(query: Query) -> Self {
        Self {
            source_id: query.source_id,
            tile_x: query.tile.x,
            tile_y: query.tile.y,
            tile_z: query.tile.z,
            px: query.px,
            py: query.py,
            batch_id: query.batch_id,
            user_data: query.user_data,
            policy: query.policy,
        }
    }
}

/// A query against a raster the host decoded itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRequest {
    #[serde(flatten)]
    pub query: QueryRequest,
    /// Tightly packed RGBA8888 rows
    pub rgba: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Worker to host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "UPPERCASE")]
pub enum WorkerResponse {
    Query(QueryResponse),
}

/// Result of one query. Every failure kind collapses into `fail: true`
/// with zeroed values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    pub fail: bool,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub batch_id: u64,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub user_data: Value,
}

impl WorkerResponse {
    pub fn batch_id(&self) -> u64 {
        match self {
            WorkerResponse::Query(r) => r.batch_id,
        }
    }

    pub fn is_failure(&self) -> bool {
        match self {
            WorkerResponse::Query(r) => r.fail,
        }
    }
}

impl From<QueryReply> for WorkerResponse {
    fn from(reply: QueryReply) -> Self {
        let response = match reply.result {
            Ok(value) => QueryResponse {
                fail: false,
                median: value.median,
                min: value.min,
                max: value.max,
                batch_id: reply.batch_id,
                user_data: reply.user_data,
            },
            Err(_) => QueryResponse {
                fail: true,
                median: 0.0,
                min: 0.0,
                max: 0.0,
                batch_id: reply.batch_id,
                user_data: reply.user_data,
            },
        };
        WorkerResponse::Query(response)
    }
}

/// The worker task has stopped.
#[derive(Debug, Error)]
#[error("Worker is no longer running")]
pub struct WorkerClosed;

type InFlight = BoxFuture<'static, (Query, Result<Bytes, FetchError>)>;

/// Owns an engine and the fetches it is waiting on.
pub struct Worker {
    config: EngineConfig,
    fetcher: Arc<dyn TileFetcher>,
    engine: Option<QueryEngine>,
    in_flight: FuturesUnordered<InFlight>,
}

impl Worker {
    /// `config` is the template for every engine INIT creates.
    pub fn new(config: EngineConfig, fetcher: Arc<dyn TileFetcher>) -> Self {
        Self {
            config,
            fetcher,
            engine: None,
            in_flight: FuturesUnordered::new(),
        }
    }

    pub fn engine(&self) -> Option<&QueryEngine> {
        self.engine.as_ref()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Handle one request. Returns the response when it is available
    /// without waiting on the network.
    pub fn handle(&mut self, request: WorkerRequest) -> Option<WorkerResponse> {
        match request {
            WorkerRequest::Init(init) => {
                self.init(init);
                None
            }
            WorkerRequest::Query(request) => {
                let query = request.into_query();
                let Some(engine) = self.engine.as_mut() else {
                    return Some(not_initialized(query));
                };

                match engine.begin(query) {
                    Dispatch::Ready(reply) => Some(reply.into()),
                    Dispatch::Fetch(query) => {
                        self.dispatch(query);
                        None
                    }
                }
            }
            WorkerRequest::Process(request) => {
                let query = request.query.into_query();
                let Some(engine) = self.engine.as_mut() else {
                    return Some(not_initialized(query));
                };

                match Raster::from_rgba(request.width, request.height, request.rgba, query.tile) {
                    Ok(raster) => Some(engine.process(query, raster).into()),
                    Err(e) => {
                        warn!(
                            source = %query.source_id,
                            batch_id = query.batch_id,
                            error = %e,
                            "Rejected supplied raster"
                        );
                        Some(QueryReply::failure(query, e.into()).into())
                    }
                }
            }
        }
    }

    /// Feed a finished fetch back into the current engine.
    pub fn complete(&mut self, query: Query, fetched: Result<Bytes, FetchError>) -> WorkerResponse {
        match self.engine.as_mut() {
            Some(engine) => engine.complete_fetch(query, fetched).into(),
            None => not_initialized(query),
        }
    }

    /// Serve requests until the request channel closes and every
    /// outstanding fetch has been answered, or the host stops listening.
    pub async fn run(
        mut self,
        mut requests: mpsc::UnboundedReceiver<WorkerRequest>,
        responses: mpsc::UnboundedSender<WorkerResponse>,
    ) {
        info!(search_radius = self.config.search_radius, "Worker started");
        let mut accepting = true;

        loop {
            let response = tokio::select! {
                request = requests.recv(), if accepting => match request {
                    Some(request) => self.handle(request),
                    None => {
                        accepting = false;
                        debug!(in_flight = self.in_flight.len(), "Request channel closed, draining");
                        None
                    }
                },
                Some((query, fetched)) = self.in_flight.next(), if !self.in_flight.is_empty() => {
                    Some(self.complete(query, fetched))
                }
                else => break,
            };

            if let Some(response) = response {
                if responses.send(response).is_err() {
                    warn!(in_flight = self.in_flight.len(), "Response channel closed");
                    break;
                }
            }
        }

        match &self.engine {
            Some(engine) => info!(stats = ?engine.stats(), "Worker stopped"),
            None => info!("Worker stopped before INIT"),
        }
    }

    fn init(&mut self, init: InitRequest) {
        match self.engine.as_mut() {
            Some(engine) => {
                engine.reinitialize(init.search_radius);
                info!(
                    search_radius = init.search_radius,
                    stats = ?engine.stats(),
                    in_flight = self.in_flight.len(),
                    "Engine re-initialized"
                );
            }
            None => {
                let config = self.config.clone().with_search_radius(init.search_radius);
                self.engine = Some(QueryEngine::new(config, Arc::clone(&self.fetcher)));
                info!(search_radius = init.search_radius, "Engine initialized");
            }
        }
    }

    fn dispatch(&mut self, query: Query) {
        let fetcher = Arc::clone(&self.fetcher);
        debug!(source = %query.source_id, batch_id = query.batch_id, "Fetching tile");
        self.in_flight.push(
            async move {
                let fetched = fetcher.fetch(&query.source_id).await;
                (query, fetched)
            }
            .boxed(),
        );
    }
}

fn not_initialized(query: Query) -> WorkerResponse {
    warn!(
        source = %query.source_id,
        batch_id = query.batch_id,
        "Query received before INIT"
    );
    QueryReply::failure(query, QueryError::NotInitialized).into()
}

/// Host side of a spawned worker.
pub struct WorkerHandle {
    requests: mpsc::UnboundedSender<WorkerRequest>,
    responses: mpsc::UnboundedReceiver<WorkerResponse>,
    task: JoinHandle<()>,
}

impl WorkerHandle {
    pub fn send(&self, request: WorkerRequest) -> Result<(), WorkerClosed> {
        self.requests.send(request).map_err(|_| WorkerClosed)
    }

    /// Next response, or `None` once the worker has stopped.
    pub async fn recv(&mut self) -> Option<WorkerResponse> {
        self.responses.recv().await
    }

    /// Separate the request and response ends, e.g. to read and write on
    /// different tasks. The worker stops once the sender is dropped and its
    /// fetches have drained.
    pub fn split(
        self,
    ) -> (
        mpsc::UnboundedSender<WorkerRequest>,
        mpsc::UnboundedReceiver<WorkerResponse>,
    ) {
        (self.requests, self.responses)
    }

    /// Stop accepting requests and collect every outstanding response.
    pub async fn close(self) -> Vec<WorkerResponse> {
        let WorkerHandle {
            requests,
            mut responses,
            task,
        } = self;
        drop(requests);

        let mut remaining = Vec::new();
        while let Some(response) = responses.recv().await {
            remaining.push(response);
        }
        if let Err(e) = task.await {
            warn!(error = %e, "Worker task ended abnormally");
        }
        remaining
    }
}

/// Spawn a worker on the current tokio runtime.
pub fn spawn(config: EngineConfig, fetcher: Arc<dyn TileFetcher>) -> WorkerHandle {
    let (request_tx, request_rx) = mpsc::unbounded_channel();
    let (response_tx, response_rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(Worker::new(config, fetcher).run(request_rx, response_tx));

    WorkerHandle {
        requests: request_tx,
        responses: response_rx,
        task,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ramp::RampKind;
    use serde_json::json;

    #[test]
    fn test_parse_init_defaults_radius() {
        let req: WorkerRequest = serde_json::from_str(r#"{"op":"INIT"}"#).unwrap();
        assert_eq!(req, WorkerRequest::Init(InitRequest { search_radius: 15 }));

        let req: WorkerRequest = serde_json::from_str(r#"{"op":"INIT","searchRadius":3}"#).unwrap();
        assert_eq!(req, WorkerRequest::Init(InitRequest { search_radius: 3 }));
    }

    #[test]
    fn test_parse_query_with_policy() {
        let req: WorkerRequest = serde_json::from_value(json!({
            "op": "QUERY",
            "sourceId": "https://t/1/2/3.png",
            "tileX": 2,
            "tileY": 3,
            "tileZ": 1,
            "px": 10,
            "py": 20,
            "batchId": 7,
            "userData": {"layer": "air"},
            "alphaThreshold": 200,
            "ramp": "dense"
        }))
        .unwrap();

        let WorkerRequest::Query(q) = req else {
            panic!("expected QUERY");
        };
        assert_eq!(q.batch_id, 7);
        assert_eq!(q.policy.alpha_threshold, Some(200));
        assert_eq!(q.policy.ramp, Some(RampKind::Dense));

        let query = q.into_query();
        assert_eq!(query.tile, TileCoord::new(1, 2, 3));
        assert_eq!(query.user_data, json!({"layer": "air"}));
    }

    #[test]
    fn test_parse_process() {
        let req: WorkerRequest = serde_json::from_value(json!({
            "op": "PROCESS",
            "sourceId": "local",
            "tileX": 0, "tileY": 0, "tileZ": 0,
            "px": 0, "py": 0,
            "batchId": 1,
            "rgba": [1, 2, 3, 255],
            "width": 1,
            "height": 1
        }))
        .unwrap();

        let WorkerRequest::Process(p) = req else {
            panic!("expected PROCESS");
        };
        assert_eq!(p.rgba, vec![1, 2, 3, 255]);
        assert_eq!(p.query.source_id, "local");
        assert_eq!(p.query.policy, PolicyOverride::default());
    }

    #[test]
    fn test_failure_response_is_zeroed() {
        let query = Query::new("s", TileCoord::default(), 0, 0, 42);
        let response: WorkerResponse = QueryReply::failure(query, QueryError::NotInitialized).into();

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            json!({"op": "QUERY", "fail": true, "median": 0.0, "min": 0.0, "max": 0.0, "batchId": 42})
        );
    }

    #[test]
    fn test_query_before_init_fails() {
        let mut worker = Worker::new(EngineConfig::default(), Arc::new(crate::fetch::MemoryFetcher::new()));
        let request = QueryRequest::from(Query::new("s", TileCoord::default(), 0, 0, 9));

        let response = worker.handle(WorkerRequest::Query(request)).unwrap();
        assert!(response.is_failure());
        assert_eq!(response.batch_id(), 9);
        assert_eq!(worker.in_flight(), 0);
    }
}
