use futures::StreamExt;
use greenbutton_model::DataDescription;
use tokio::io::AsyncWriteExt;

use super::{record_encode_failure, record_flush, OutputTarget, OutputWriter};
use crate::pipeline::{Envelope, PipelineError, Sink};

/// Writes each data description as one JSON line.
pub struct NdjsonSink {
    target: OutputTarget,
    batch_size: usize,
}

impl NdjsonSink {
    pub fn new(target: OutputTarget, batch_size: usize) -> Self {
        Self {
            target,
            batch_size: batch_size.max(1),
        }
    }

    /// Encodes the batch into JSON lines. A description that fails to
    /// serialize is logged and left out. Returns the bytes and the number of
    /// descriptions encoded.
    fn encode_batch(&self, batch: &[Envelope<DataDescription>]) -> (Vec<u8>, usize) {
        let mut out = Vec::with_capacity(batch.len().saturating_mul(512));
        let mut written = 0;
        for env in batch {
            match serde_json::to_vec(&env.payload) {
                Ok(line) => {
                    out.extend_from_slice(&line);
                    out.push(b'\n');
                    written += 1;
                }
                Err(e) => record_encode_failure(
                    "ndjson",
                    &PipelineError::Sink(format!("failed to encode description: {e}")),
                ),
            }
        }
        (out, written)
    }

    async fn flush_batch(
        &self,
        writer: &mut OutputWriter,
        batch: &[Envelope<DataDescription>],
    ) -> Result<(), PipelineError> {
        if batch.is_empty() {
            return Ok(());
        }

        let (payload, written) = self.encode_batch(batch);
        if !payload.is_empty() {
            writer
                .write_all(&payload)
                .await
                .map_err(|e| PipelineError::Sink(format!("ndjson write failed: {e}")))?;
            writer
                .flush()
                .await
                .map_err(|e| PipelineError::Sink(format!("ndjson flush failed: {e}")))?;
        }

        record_flush(batch, written, payload.len());
        Ok(())
    }
}

#[async_trait::async_trait]
impl Sink<DataDescription> for NdjsonSink {
    async fn run<S>(&self, mut input: S) -> Result<(), PipelineError>
    where
        S: futures::Stream<Item = Result<Envelope<DataDescription>, PipelineError>> + Send + Unpin + 'static,
    {
        let mut writer = self.target.open().await?;
        let mut buffer: Vec<Envelope<DataDescription>> = Vec::with_capacity(self.batch_size);

        while let Some(item) = input.next().await {
            let env = match item {
                Ok(env) => env,
                Err(e) => {
                    tracing::error!(error = %e, "error in upstream pipeline for NdjsonSink");
                    continue;
                }
            };

            buffer.push(env);
            if buffer.len() >= self.batch_size {
                self.flush_batch(&mut writer, &buffer).await?;
                buffer.clear();
            }
        }

        if !buffer.is_empty() {
            self.flush_batch(&mut writer, &buffer).await?;
        }

        // Best-effort close.
        let _ = writer.shutdown().await;

        Ok(())
    }
}
