pub mod csv;
pub mod ndjson;

pub use self::csv::CsvSink;
pub use self::ndjson::NdjsonSink;

use std::{path::PathBuf, pin::Pin, time::SystemTime};

use tokio::io::AsyncWrite;

use crate::pipeline::{Envelope, PipelineError};

pub type OutputWriter = Pin<Box<dyn AsyncWrite + Send>>;

/// Where a sink writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

impl OutputTarget {
    pub fn from_path(path: Option<PathBuf>) -> Self {
        match path {
            Some(p) => OutputTarget::File(p),
            None => OutputTarget::Stdout,
        }
    }

    pub async fn open(&self) -> Result<OutputWriter, PipelineError> {
        match self {
            OutputTarget::Stdout => Ok(Box::pin(tokio::io::stdout())),
            OutputTarget::File(path) => {
                let file = tokio::fs::File::create(path).await.map_err(|e| {
                    PipelineError::Sink(format!("failed to create output file {}: {e}", path.display()))
                })?;
                Ok(Box::pin(file))
            }
        }
    }
}

/// Logs and counts a description the sink could not encode. The sink
/// carries on with the rest of the stream.
fn record_encode_failure(sink: &'static str, error: &PipelineError) {
    tracing::error!(sink, error = %error, "skipping description that cannot be encoded");
    metrics::counter!("descriptions_encode_failed_total").increment(1);
}

/// Records write metrics for a flushed batch. `written` excludes envelopes
/// that were skipped because they could not be encoded.
fn record_flush<T>(batch: &[Envelope<T>], written: usize, bytes: usize) {
    metrics::counter!("descriptions_written_total").increment(written as u64);
    metrics::counter!("output_bytes_total").increment(bytes as u64);

    // Approximate end-to-end latency from earliest received_at to now.
    if let Some(min_received) = batch.iter().map(|e| e.received_at).min() {
        if let Ok(dur) = SystemTime::now().duration_since(min_received) {
            metrics::histogram!("interpret_end_to_end_latency_seconds").record(dur.as_secs_f64());
        }
    }
}
