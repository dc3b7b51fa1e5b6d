//! JSON-lines bridge between a byte stream and a query worker.
//!
//! Each input line is one `WorkerRequest`; each worker response is written
//! as one line. End of input stops new requests, but responses for fetches
//! already in flight are still written before returning.

use anyhow::{Context, Result};
use tile_decoder::{WorkerHandle, WorkerRequest, WorkerResponse};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

/// Line counts for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServeSummary {
    pub requests: u64,
    pub malformed: u64,
    pub responses: u64,
}

pub async fn serve<R, W>(input: R, mut output: W, handle: WorkerHandle) -> Result<ServeSummary>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let (requests, mut responses) = handle.split();
    let mut requests = Some(requests);
    let mut lines = input.lines();
    let mut summary = ServeSummary::default();

    loop {
        tokio::select! {
            line = lines.next_line(), if requests.is_some() => {
                match line.context("Failed to read request line")? {
                    Some(line) => {
                        if let Some(request) = parse_request(&line, &mut summary) {
                            let sent = requests.as_ref().map(|tx| tx.send(request).is_ok());
                            if sent != Some(true) {
                                warn!("Worker stopped accepting requests");
                                requests = None;
                            }
                        }
                    }
                    None => {
                        debug!(requests = summary.requests, "Input closed");
                        requests = None;
                    }
                }
            }
            response = responses.recv() => match response {
                Some(response) => {
                    write_response(&mut output, &response).await?;
                    summary.responses += 1;
                }
                None => break,
            },
        }
    }

    output.flush().await.context("Failed to flush output")?;
    Ok(summary)
}

fn parse_request(line: &str, summary: &mut ServeSummary) -> Option<WorkerRequest> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    match serde_json::from_str(line) {
        Ok(request) => {
            summary.requests += 1;
            Some(request)
        }
        Err(e) => {
            summary.malformed += 1;
            warn!(error = %e, "Skipping malformed request");
            None
        }
    }
}

async fn write_response<W>(output: &mut W, response: &WorkerResponse) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut line = serde_json::to_vec(response)?;
    line.push(b'\n');
    output
        .write_all(&line)
        .await
        .context("Failed to write response")?;
    output.flush().await.context("Failed to flush output")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use test_utils::{dense, sources, RgbaImage};
    use std::task::Poll;
    use tile_decoder::{worker, EngineConfig, MemoryFetcher};
    use tokio_test::{assert_pending, task};

    fn query_line(source: &str, batch_id: u64) -> String {
        format!(
            r#"{{"op":"QUERY","sourceId":"{}","tileX":909,"tileY":403,"tileZ":10,"px":2,"py":2,"batchId":{}}}"#,
            source, batch_id
        )
    }

    #[tokio::test]
    async fn test_serve_round_trip() {
        let fetcher = Arc::new(MemoryFetcher::new());
        fetcher.insert(
            sources::GRIDDATA,
            RgbaImage::transparent(4, 4)
                .with_pixel(2, 2, dense::STOP_0.rgb, 255)
                .to_png(),
        );
        let handle = worker::spawn(EngineConfig::default(), fetcher);

        let input = format!(
            "{}\nnot json\n\n{}\n",
            r#"{"op":"INIT","searchRadius":15}"#,
            query_line(sources::GRIDDATA, 5)
        );
        let mut output = Vec::new();

        let summary = serve(input.as_bytes(), &mut output, handle).await.unwrap();
        assert_eq!(
            summary,
            ServeSummary {
                requests: 2,
                malformed: 1,
                responses: 1,
            }
        );

        let text = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 1);

        let response: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(response["op"], "QUERY");
        assert_eq!(response["fail"], false);
        assert_eq!(response["batchId"], 5);
    }

    #[tokio::test]
    async fn test_serve_reports_failures_per_batch() {
        let handle = worker::spawn(EngineConfig::default(), Arc::new(MemoryFetcher::new()));

        // No INIT: both queries fail immediately
        let input = format!("{}\n{}\n", query_line("a", 1), query_line("b", 2));
        let mut output = Vec::new();

        let summary = serve(input.as_bytes(), &mut output, handle).await.unwrap();
        assert_eq!(summary.responses, 2);

        let text = String::from_utf8(output).unwrap();
        for line in text.lines() {
            let response: serde_json::Value = serde_json::from_str(line).unwrap();
            assert_eq!(response["fail"], true);
        }
    }

    #[tokio::test]
    async fn test_serve_waits_for_worker_to_stop() {
        let handle = worker::spawn(EngineConfig::default(), Arc::new(MemoryFetcher::new()));
        let mut session = task::spawn(serve(&b""[..], Vec::new(), handle));

        // Input is exhausted on the first poll, but the worker has not
        // yet seen its request channel close
        assert_pending!(session.poll());

        let mut summary = None;
        for _ in 0..100 {
            tokio::task::yield_now().await;
            if let Poll::Ready(result) = session.poll() {
                summary = Some(result.unwrap());
                break;
            }
        }
        assert_eq!(summary, Some(ServeSummary::default()));
    }
}
