use std::path::PathBuf;

use async_stream::try_stream;
use tokio::{
    fs::File,
    io::{AsyncBufReadExt, BufReader},
};

use crate::{
    feed::FeedDocument,
    pipeline::{Envelope, EnvelopeStream, PipelineError, Source},
};

/// Backfill source: one decoded feed document per line.
///
/// Blank lines are skipped. A line that fails to parse ends the stream
/// with a source error.
pub struct FeedNdjsonSource {
    path: PathBuf,
}

impl FeedNdjsonSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl Source<FeedDocument> for FeedNdjsonSource {
    async fn stream(&self) -> EnvelopeStream<FeedDocument> {
        let path = self.path.clone();
        let s = try_stream! {
            let file = File::open(&path).await.map_err(|e| {
                PipelineError::Source(format!("failed to open feed backfill file: {e}"))
            })?;
            let reader = BufReader::new(file);
            let mut lines = reader.lines();

            while let Some(line) = lines.next_line().await.map_err(|e| {
                PipelineError::Source(format!("failed to read feed backfill line: {e}"))
            })? {
                if line.trim().is_empty() {
                    continue;
                }
                let feed: FeedDocument = match serde_json::from_str(&line) {
                    Ok(v) => v,
                    Err(e) => {
                        metrics::counter!("feed_parse_errors_total").increment(1);
                        Err(PipelineError::Source(format!(
                            "failed to parse feed json line: {e}"
                        )))?
                    }
                };
                yield Envelope::now(feed);
            }
        };

        Box::pin(s)
    }
}
