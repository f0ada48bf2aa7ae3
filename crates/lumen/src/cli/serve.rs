//! The `lumen serve` command: line-delimited JSON requests on stdin.
//!
//! Each input line is one request; each output line is one response carrying
//! the request's `id`. Requests run concurrently up to `--workers` and share
//! one result cache, so responses arrive in completion order.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use lumen_core::{AnalysisOptions, AnalysisResult, Config, ErrorBody, Lumen};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;

use super::{build_lumen, media_type_for_path};

/// Longest accepted request line, excluding its terminator.
pub const MAX_REQUEST_LINE_BYTES: usize = 64 * 1024;

/// Arguments for the `serve` command.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Number of requests analyzed concurrently
    #[arg(short, long, default_value = "4")]
    pub workers: usize,
}

/// Metric selection as either `"median,histogram"` or `["median", "histogram"]`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MetricList {
    Csv(String),
    List(Vec<String>),
}

impl MetricList {
    fn joined(&self) -> String {
        match self {
            Self::Csv(s) => s.clone(),
            Self::List(items) => items.join(","),
        }
    }
}

/// One request line.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServeRequest {
    /// Echoed back unchanged
    #[serde(default)]
    pub id: serde_json::Value,
    pub path: Option<PathBuf>,
    pub url: Option<String>,
    pub media_type: Option<String>,
    pub metrics: Option<MetricList>,
    pub edge_mode: Option<String>,
}

/// One response line.
#[derive(Debug, Clone, Serialize)]
pub struct ServeResponse {
    pub id: serde_json::Value,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<AnalysisResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl ServeResponse {
    fn success(id: serde_json::Value, result: AnalysisResult) -> Self {
        Self {
            id,
            ok: true,
            result: Some(result),
            error: None,
        }
    }

    fn failure(id: serde_json::Value, error: ErrorBody) -> Self {
        Self {
            id,
            ok: false,
            result: None,
            error: Some(error),
        }
    }
}

fn invalid_request(message: impl Into<String>) -> ErrorBody {
    ErrorBody {
        error: "invalid_request",
        message: message.into(),
        details: serde_json::Value::Null,
    }
}

/// Execute the serve command on stdin/stdout.
pub async fn execute(args: ServeArgs, config: Config) -> anyhow::Result<()> {
    let redact = config.output.redact_internal_errors;
    let lumen = Arc::new(build_lumen(config)?);
    tracing::info!("Serving requests on stdin with {} workers", args.workers.max(1));

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    let (handled, _) = run(lumen.clone(), args.workers, redact, stdin, stdout).await?;

    if let Some(cache) = lumen.cache() {
        let stats = cache.stats();
        tracing::info!(
            "Handled {} requests (cache: {} hits, {} misses, {:.1}% hit rate, {} entries)",
            handled,
            stats.hits,
            stats.misses,
            stats.hit_rate() * 100.0,
            stats.entries
        );
    } else {
        tracing::info!("Handled {} requests", handled);
    }
    Ok(())
}

/// Read requests from `reader` until EOF and write responses to `writer`.
///
/// Returns the number of requests handled and the writer.
pub async fn run<R, W>(
    lumen: Arc<Lumen>,
    workers: usize,
    redact: bool,
    mut reader: R,
    writer: W,
) -> anyhow::Result<(usize, W)>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let workers = workers.max(1);
    let semaphore = Arc::new(Semaphore::new(workers));
    let (tx, mut rx) = mpsc::channel::<ServeResponse>(workers * 2);

    let writer_task = tokio::spawn(async move {
        let mut writer = writer;
        while let Some(response) = rx.recv().await {
            let mut line = serde_json::to_string(&response)?;
            line.push('\n');
            writer.write_all(line.as_bytes()).await?;
            writer.flush().await?;
        }
        Ok::<_, anyhow::Error>(writer)
    });

    let mut tasks = JoinSet::new();
    let mut handled = 0usize;
    let mut buf = Vec::new();

    let read_result = loop {
        let line = match read_request_line(&mut reader, &mut buf).await {
            Ok(Some(line)) => line,
            Ok(None) => break Ok(()),
            Err(e) => break Err(e),
        };
        let line = match line {
            RequestLine::Text(text) if text.trim().is_empty() => continue,
            RequestLine::Text(text) => text,
            RequestLine::Rejected(message) => {
                handled += 1;
                tracing::warn!("Rejected request line: {}", message);
                let response =
                    ServeResponse::failure(serde_json::Value::Null, invalid_request(message));
                if tx.send(response).await.is_err() {
                    tracing::warn!("Response writer closed; dropping response");
                }
                continue;
            }
        };
        handled += 1;

        let permit = semaphore.clone().acquire_owned().await?;
        let lumen = lumen.clone();
        let tx = tx.clone();
        tasks.spawn(async move {
            let response = handle_line(&lumen, &line, redact).await;
            drop(permit);
            if tx.send(response).await.is_err() {
                tracing::warn!("Response writer closed; dropping response");
            }
        });

        // Reap finished tasks so the set does not grow unbounded.
        while let Some(done) = tasks.try_join_next() {
            if let Err(e) = done {
                tracing::error!("Request task panicked: {e}");
            }
        }
    };

    // In-flight requests are still answered when reading stops on an I/O error.
    while let Some(done) = tasks.join_next().await {
        if let Err(e) = done {
            tracing::error!("Request task panicked: {e}");
        }
    }
    drop(tx);

    let writer = writer_task.await??;
    read_result?;
    Ok((handled, writer))
}

/// One line read from the request stream.
enum RequestLine {
    Text(String),
    /// The line cannot be parsed at all; carries the reason.
    Rejected(String),
}

/// Read the next line, without its terminator, from `reader`.
///
/// Lines longer than `MAX_REQUEST_LINE_BYTES` are consumed up to their newline
/// and rejected without being buffered. Returns `None` at EOF.
async fn read_request_line<R: AsyncBufRead + Unpin>(
    reader: &mut R,
    buf: &mut Vec<u8>,
) -> std::io::Result<Option<RequestLine>> {
    buf.clear();
    let limit = MAX_REQUEST_LINE_BYTES as u64 + 1;
    if (&mut *reader).take(limit).read_until(b'\n', buf).await? == 0 {
        return Ok(None);
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    } else if buf.len() > MAX_REQUEST_LINE_BYTES {
        loop {
            buf.clear();
            let n = (&mut *reader).take(limit).read_until(b'\n', buf).await?;
            if n == 0 || buf.last() == Some(&b'\n') {
                break;
            }
        }
        return Ok(Some(RequestLine::Rejected(format!(
            "Request line exceeds {MAX_REQUEST_LINE_BYTES} bytes"
        ))));
    }

    match String::from_utf8(std::mem::take(buf)) {
        Ok(text) => Ok(Some(RequestLine::Text(text))),
        Err(_) => Ok(Some(RequestLine::Rejected(
            "Request line is not valid UTF-8".to_string(),
        ))),
    }
}

/// Parse and answer one request line.
pub async fn handle_line(lumen: &Lumen, line: &str, redact: bool) -> ServeResponse {
    let request: ServeRequest = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(e) => {
            return ServeResponse::failure(
                serde_json::Value::Null,
                invalid_request(format!("Malformed request: {e}")),
            )
        }
    };
    let id = request.id.clone();

    match handle_request(lumen, request).await {
        Ok(Ok(result)) => ServeResponse::success(id, result),
        Ok(Err(err)) => {
            if err.is_client_error() {
                tracing::debug!("Request {} failed: {}", id, err);
            } else {
                tracing::warn!("Request {} failed: {}", id, err);
            }
            ServeResponse::failure(id, err.to_body(redact))
        }
        Err(body) => ServeResponse::failure(id, body),
    }
}

async fn handle_request(
    lumen: &Lumen,
    request: ServeRequest,
) -> Result<lumen_core::PipelineResult<AnalysisResult>, ErrorBody> {
    let metrics = request.metrics.as_ref().map(MetricList::joined);
    let options = match AnalysisOptions::parse(metrics.as_deref(), request.edge_mode.as_deref()) {
        Ok(options) => options,
        Err(err) => return Ok(Err(err)),
    };

    match (request.path, request.url) {
        (Some(path), None) => {
            let bytes = tokio::fs::read(&path).await.map_err(|e| ErrorBody {
                error: "read_failed",
                message: format!("Failed to read {}: {e}", path.display()),
                details: serde_json::Value::Null,
            })?;
            let media_type = request
                .media_type
                .unwrap_or_else(|| media_type_for_path(&path).to_string());
            Ok(lumen
                .analyze_upload(bytes, Some(&media_type), &options)
                .await)
        }
        (None, Some(url)) => Ok(lumen.analyze_url(&url, &options).await),
        (Some(_), Some(_)) => Err(invalid_request("Request must not set both path and url")),
        (None, None) => Err(invalid_request("Request must set path or url")),
    }
}
