use std::path::PathBuf;

use async_stream::try_stream;

use crate::{
    feed::FeedDocument,
    pipeline::{Envelope, EnvelopeStream, PipelineError, Source},
};

/// A single decoded feed stored as one JSON document.
pub struct FeedFileSource {
    path: PathBuf,
    user_id: Option<String>,
}

impl FeedFileSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            user_id: None,
        }
    }

    /// Owner stamped on the feed when the document does not name one.
    pub fn with_user_id(mut self, user_id: Option<String>) -> Self {
        self.user_id = user_id;
        self
    }
}

#[async_trait::async_trait]
impl Source<FeedDocument> for FeedFileSource {
    async fn stream(&self) -> EnvelopeStream<FeedDocument> {
        let path = self.path.clone();
        let user_id = self.user_id.clone();
        let s = try_stream! {
            let contents = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| PipelineError::Source(format!("failed to open feed file: {e}")))?;

            let mut feed: FeedDocument = match serde_json::from_str(&contents) {
                Ok(v) => v,
                Err(e) => {
                    metrics::counter!("feed_parse_errors_total").increment(1);
                    Err(PipelineError::Source(format!("failed to parse feed json: {e}")))?
                }
            };
            if feed.user_id.is_none() {
                feed.user_id = user_id;
            }

            tracing::info!(path = %path.display(), entries = feed.entries.len(), "feed loaded");
            yield Envelope::now(feed);
        };

        Box::pin(s)
    }
}
